pub mod entry_models;
pub mod entry_registry;
