pub mod api;
pub mod command_line;
pub mod encoding;
pub mod entries;
pub mod feature_list;
pub mod flags_state;
pub mod metadata;
pub mod platform;
pub mod stats;
pub mod storage;
pub mod switches;
pub mod visibility;

// Compiled into the library so integration tests and downstream hosts can
// share the fixtures.
pub mod test_utils;
