// Switch names owned by the flags system.

/// Global escape hatch: when already present on the target command line,
/// stored flags are ignored entirely.
pub const NO_EXPERIMENTS: &str = "no-experiments";

/// Sentinels bracketing generated switches, so a relaunch can tell
/// flags-generated switches apart from user-supplied ones.
pub const FLAG_SWITCHES_BEGIN: &str = "flag-switches-begin";
pub const FLAG_SWITCHES_END: &str = "flag-switches-end";

pub const ENABLE_FEATURES: &str = "enable-features";
pub const DISABLE_FEATURES: &str = "disable-features";
