pub mod flags_storage;
