use crate::entries::entry_models::FeatureEntry;
use crate::platform::Platforms;
use crate::storage::flags_storage::{AccessLevel, FlagsStorage};

/// Conditional gating hook for entries whose availability depends on the
/// host: release channel, a companion feature, device administration.
pub trait FlagsDelegate {
    fn should_exclude_entry(&self, _storage: &dyn FlagsStorage, _internal_name: &str) -> bool {
        false
    }
}

/// Default delegate: nothing is conditionally gated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExclusions;

impl FlagsDelegate for NoExclusions {}

/// Opaque expiry oracle. Expired entries are always skipped, regardless of
/// what storage holds for them.
pub trait FlagExpiry {
    fn is_flag_expired(&self, storage: &dyn FlagsStorage, internal_name: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverExpires;

impl FlagExpiry for NeverExpires {
    fn is_flag_expired(&self, _storage: &dyn FlagsStorage, _internal_name: &str) -> bool {
        false
    }
}

/// Whether an entry is hidden from listings and from switch generation.
/// Rules apply in order, first match wins: platform mismatch, then delegate
/// exclusion, then expiry. Pure function of its inputs.
pub fn should_skip_entry(
    entry: &FeatureEntry,
    platform: Platforms,
    access: AccessLevel,
    storage: &dyn FlagsStorage,
    delegate: &dyn FlagsDelegate,
    expiry: &dyn FlagExpiry,
) -> bool {
    let mut effective = platform;
    // Owner-only entries are reachable only for the device owner, and only
    // where the owner concept exists.
    if platform.contains(Platforms::CHROMEOS) && access == AccessLevel::Owner {
        effective |= Platforms::CHROMEOS_OWNER_ONLY;
    }
    if (effective & entry.supported_platforms).is_empty() {
        return true;
    }
    if delegate.should_exclude_entry(storage, &entry.internal_name) {
        return true;
    }
    if expiry.is_flag_expired(storage, &entry.internal_name) {
        return true;
    }
    false
}
