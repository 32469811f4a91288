use serde::{Deserialize, Serialize};

// Flag usage counters
pub const FLAGS_ACTIVE_SWITCHES_COUNTER: &str = "flags_active_switches_total";
pub const FLAGS_ENABLED_FEATURES_COUNTER: &str = "flags_enabled_features_total";
pub const FLAGS_DISABLED_FEATURES_COUNTER: &str = "flags_disabled_features_total";

/// What the flags system currently contributes to the process: loose switch
/// names plus bare feature names. Variation ids are deliberately absent;
/// they are reported through a separate channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FlagsStatistics {
    pub switches: Vec<String>,
    pub enabled_features: Vec<String>,
    pub disabled_features: Vec<String>,
}

pub fn record_flags_statistics(stats: &FlagsStatistics) {
    metrics::counter!(FLAGS_ACTIVE_SWITCHES_COUNTER).increment(stats.switches.len() as u64);
    metrics::counter!(FLAGS_ENABLED_FEATURES_COUNTER).increment(stats.enabled_features.len() as u64);
    metrics::counter!(FLAGS_DISABLED_FEATURES_COUNTER)
        .increment(stats.disabled_features.len() as u64);
    tracing::info!(
        switches = stats.switches.len(),
        enabled_features = stats.enabled_features.len(),
        disabled_features = stats.disabled_features.len(),
        "recorded flags statistics"
    );
}
