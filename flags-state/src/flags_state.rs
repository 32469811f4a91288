use std::collections::BTreeSet;

use indexmap::IndexMap;
use strum::{Display, EnumString};
use tracing::{debug, instrument, warn};

use crate::api::errors::FlagsError;
use crate::api::types::{EntryState, FeatureEntriesResponse};
use crate::command_line::CommandLine;
use crate::encoding;
use crate::entries::entry_models::{FeatureEntry, FeatureKind, FeaturePolarity, ToggleBackend};
use crate::entries::entry_registry::FlagRegistry;
use crate::feature_list::FeatureList;
use crate::platform::Platforms;
use crate::stats::FlagsStatistics;
use crate::storage::flags_storage::{AccessLevel, FlagsStorage, StoredValue};
use crate::switches::{
    DISABLE_FEATURES, ENABLE_FEATURES, FLAG_SWITCHES_BEGIN, FLAG_SWITCHES_END, NO_EXPERIMENTS,
};
use crate::visibility::{should_skip_entry, FlagExpiry, FlagsDelegate, NeverExpires, NoExclusions};

/// Whether generated switches get bracketed by the begin/end markers, so a
/// relaunch can tell them apart from user-supplied switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SentinelsMode {
    Add,
    Omit,
}

/// A stored value read back through the lens of its entry's kind. Shape
/// mismatches and out-of-range indices collapse to `Unset`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    Unset,
    Toggled(bool),
    Index(usize),
    Text(String),
    Origins(Vec<String>),
}

/// The resolution engine: one registry, one platform, swappable gating and
/// expiry collaborators. Plain value, no global state; tests build their
/// own from alternate registries.
pub struct FlagsState {
    registry: FlagRegistry,
    platform: Platforms,
    delegate: Box<dyn FlagsDelegate>,
    expiry: Box<dyn FlagExpiry>,
}

impl FlagsState {
    pub fn new(registry: FlagRegistry) -> Self {
        Self {
            registry,
            platform: Platforms::current(),
            delegate: Box::new(NoExclusions),
            expiry: Box::new(NeverExpires),
        }
    }

    pub fn with_platform(mut self, platform: Platforms) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_delegate(mut self, delegate: Box<dyn FlagsDelegate>) -> Self {
        self.delegate = delegate;
        self
    }

    pub fn with_expiry(mut self, expiry: Box<dyn FlagExpiry>) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn registry(&self) -> &FlagRegistry {
        &self.registry
    }

    /// Partitions every registry entry into supported (visible, annotated
    /// with its stored selection) and unsupported. Read-only; each entry
    /// lands in exactly one list.
    pub fn get_feature_entries(
        &self,
        storage: &dyn FlagsStorage,
        access: AccessLevel,
    ) -> FeatureEntriesResponse {
        let mut supported = Vec::new();
        let mut unsupported = Vec::new();
        for entry in self.registry.entries() {
            let state = self.entry_state(entry, storage);
            if self.skips(entry, access, storage) {
                unsupported.push(state);
            } else {
                supported.push(state);
            }
        }
        FeatureEntriesResponse {
            supported,
            unsupported,
        }
    }

    /// Enables or disables an entry on behalf of the UI. Unknown names are
    /// a no-op: storage may hold names from a registry version that no
    /// longer declares them.
    pub fn set_feature_entry_enabled(&self, storage: &dyn FlagsStorage, name: &str, enable: bool) {
        let Some(entry) = self.registry.get(name) else {
            debug!(name, "ignoring toggle of unknown entry");
            return;
        };
        match &entry.kind {
            FeatureKind::Toggle(_) => storage.set(name, StoredValue::Enabled(enable)),
            FeatureKind::MultiChoice { .. }
            | FeatureKind::Feature { .. }
            | FeatureKind::FeatureWithParams { .. } => {
                if !enable {
                    storage.remove(name);
                } else if entry.num_states() > 1 {
                    // Minimal "on" state; a specific choice needs a
                    // follow-up through the state setters.
                    storage.set(name, StoredValue::Selection(1));
                }
            }
            FeatureKind::StringValue { .. } | FeatureKind::OriginList { .. } => {
                // Values only enter through the dedicated setters;
                // disabling clears back to the default.
                if !enable {
                    storage.remove(name);
                }
            }
        }
    }

    /// Overwrites a string flag's stored text. No content validation at
    /// this layer; the value's consumer owns syntax checks.
    pub fn set_string_flag(&self, storage: &dyn FlagsStorage, name: &str, value: &str) {
        match self.registry.get(name).map(|entry| &entry.kind) {
            Some(FeatureKind::StringValue { .. }) => {
                storage.set(name, StoredValue::Text(value.to_string()));
            }
            Some(_) => debug!(name, "ignoring string value for non-string entry"),
            None => debug!(name, "ignoring string value for unknown entry"),
        }
    }

    /// Overwrites an origin-list flag from comma-separated text. Origins
    /// are trimmed and empties dropped; no origin syntax validation here.
    pub fn set_origin_list_flag(&self, storage: &dyn FlagsStorage, name: &str, value: &str) {
        match self.registry.get(name).map(|entry| &entry.kind) {
            Some(FeatureKind::OriginList { .. }) => {
                let origins: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect();
                storage.set(name, StoredValue::Origins(origins));
            }
            Some(_) => debug!(name, "ignoring origin list for non-origin-list entry"),
            None => debug!(name, "ignoring origin list for unknown entry"),
        }
    }

    /// Removes every registry-recognized key from storage. Keys owned by
    /// other subsystems stay untouched.
    pub fn reset_all_flags(&self, storage: &dyn FlagsStorage) {
        for entry in self.registry.entries() {
            storage.remove(&entry.internal_name);
        }
        tracing::info!(entries = self.registry.len(), "reset all flags");
    }

    /// Removes stored keys no registry entry recognizes, returning the
    /// removed names. Never invoked implicitly by resolution.
    pub fn sanitize_stored_flags(&self, storage: &dyn FlagsStorage) -> Vec<String> {
        let mut removed = Vec::new();
        for key in storage.keys() {
            if !self.registry.contains(&key) {
                storage.remove(&key);
                removed.push(key);
            }
        }
        if !removed.is_empty() {
            warn!(count = removed.len(), "removed unrecognized stored flags");
        }
        removed
    }

    /// Materializes stored flag selections onto a command line: bracketed
    /// `--enable-features`/`--disable-features` values plus loose switches.
    ///
    /// Malformed stored values never fail the pass; the command line is
    /// always fully populated with every valid contribution. The only
    /// escalated error is a reserved character in a feature or trial name,
    /// and the first such error is returned after the pass completes.
    #[instrument(skip_all)]
    pub fn convert_flags_to_switches(
        &self,
        storage: &dyn FlagsStorage,
        command_line: &mut CommandLine,
        sentinels: SentinelsMode,
    ) -> Result<(), FlagsError> {
        // The escape hatch on the command line wins over stored flags
        // entirely.
        if command_line.has_switch(NO_EXPERIMENTS) {
            debug!("{} present, skipping flag conversion", NO_EXPERIMENTS);
            return Ok(());
        }

        let access = storage.access_level();
        let mut enabled: IndexMap<String, String> = IndexMap::new();
        let mut disabled: IndexMap<String, String> = IndexMap::new();
        let mut loose: IndexMap<String, Option<String>> = IndexMap::new();
        let mut first_error: Option<FlagsError> = None;

        for entry in self.registry.entries() {
            if self.skips(entry, access, storage) {
                continue;
            }
            if let Err(error) = self.accumulate_entry(
                entry,
                storage,
                &mut enabled,
                &mut disabled,
                &mut loose,
            ) {
                warn!(entry = %entry.internal_name, %error, "entry skipped during switch generation");
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }

        if sentinels == SentinelsMode::Add {
            command_line.append_switch(FLAG_SWITCHES_BEGIN);
        }
        if !enabled.is_empty() {
            command_line
                .append_switch_with_value(ENABLE_FEATURES, &encoding::join_features(enabled.values()));
        }
        if !disabled.is_empty() {
            command_line.append_switch_with_value(
                DISABLE_FEATURES,
                &encoding::join_features(disabled.values()),
            );
        }
        for (name, value) in &loose {
            match value {
                Some(value) => command_line.append_switch_with_value(name, value),
                None => command_line.append_switch(name),
            }
        }
        if sentinels == SentinelsMode::Add {
            command_line.append_switch(FLAG_SWITCHES_END);
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Pushes the selected variation of every feature-with-params entry
    /// into the host's feature list, returning the variation ids that were
    /// registered, in registry order.
    #[instrument(skip_all)]
    pub fn register_all_feature_variation_parameters(
        &self,
        storage: &dyn FlagsStorage,
        feature_list: &mut dyn FeatureList,
    ) -> Vec<String> {
        let access = storage.access_level();
        let mut variation_ids = Vec::new();
        for entry in self.registry.entries() {
            if self.skips(entry, access, storage) {
                continue;
            }
            let FeatureKind::FeatureWithParams { feature, trial, .. } = &entry.kind else {
                continue;
            };
            let Selection::Index(state) = self.selection_for(entry, storage) else {
                continue;
            };
            let Some(variation) = entry.selected_variation(state) else {
                continue;
            };
            feature_list.register_feature_with_parameters(
                feature,
                &variation.params,
                trial.as_deref(),
            );
            if let Some(id) = &variation.variation_id {
                variation_ids.push(id.clone());
            }
        }
        variation_ids
    }

    /// Strips a previously generated sentinel-bracketed region, markers
    /// included. No-op when the markers are absent or out of order.
    pub fn remove_flags_switches(&self, command_line: &mut CommandLine) -> bool {
        command_line.remove_marked_region(FLAG_SWITCHES_BEGIN, FLAG_SWITCHES_END)
    }

    /// Compares the flag-generated regions of two command lines, for
    /// relaunch-required detection. Generation order is deterministic, so
    /// the comparison is order-sensitive. When a command line carries no
    /// markers, all of its switches are compared. Returns whether the
    /// regions match, and the differing switches when they do not.
    pub fn are_switches_identical_to_command_line(
        new_command_line: &CommandLine,
        active_command_line: &CommandLine,
    ) -> (bool, Vec<String>) {
        let new_region = flag_region_or_all(new_command_line);
        let active_region = flag_region_or_all(active_command_line);
        if new_region == active_region {
            return (true, Vec::new());
        }
        let new_set: BTreeSet<String> = new_region.iter().map(|s| s.render()).collect();
        let active_set: BTreeSet<String> = active_region.iter().map(|s| s.render()).collect();
        let difference = new_set
            .symmetric_difference(&active_set)
            .cloned()
            .collect();
        (false, difference)
    }

    /// The statistics-extraction pass: active loose switch names plus bare
    /// enabled/disabled feature names, with params and variation ids
    /// stripped. Best-effort; encoding errors already excluded their
    /// entries.
    pub fn get_switches_and_features(&self, storage: &dyn FlagsStorage) -> FlagsStatistics {
        let mut command_line = CommandLine::new();
        if let Err(error) =
            self.convert_flags_to_switches(storage, &mut command_line, SentinelsMode::Omit)
        {
            debug!(%error, "ignoring encoding error while collecting statistics");
        }
        let mut stats = FlagsStatistics::default();
        for switch in command_line.switches() {
            let value = switch.value.as_deref().unwrap_or_default();
            match switch.name.as_str() {
                ENABLE_FEATURES => stats.enabled_features = split_feature_names(value),
                DISABLE_FEATURES => stats.disabled_features = split_feature_names(value),
                _ => stats.switches.push(switch.name.clone()),
            }
        }
        stats
    }

    fn skips(&self, entry: &FeatureEntry, access: AccessLevel, storage: &dyn FlagsStorage) -> bool {
        should_skip_entry(
            entry,
            self.platform,
            access,
            storage,
            self.delegate.as_ref(),
            self.expiry.as_ref(),
        )
    }

    fn entry_state(&self, entry: &FeatureEntry, storage: &dyn FlagsStorage) -> EntryState {
        let (enabled, selected_state, string_value, origin_list_value) =
            match self.selection_for(entry, storage) {
                Selection::Unset => (false, entry.is_choice_like().then_some(0), None, None),
                Selection::Toggled(on) => (on, None, None, None),
                Selection::Index(index) => (index != 0, Some(index), None, None),
                Selection::Text(text) => (!text.is_empty(), None, Some(text), None),
                Selection::Origins(origins) => {
                    (!origins.is_empty(), None, None, Some(origins.join(",")))
                }
            };
        EntryState {
            internal_name: entry.internal_name.clone(),
            visible_name: entry.visible_name.clone(),
            visible_description: entry.visible_description.clone(),
            supported_platforms: entry.supported_platforms,
            enabled,
            selected_state,
            string_value,
            origin_list_value,
        }
    }

    fn selection_for(&self, entry: &FeatureEntry, storage: &dyn FlagsStorage) -> Selection {
        let Some(value) = storage.get(&entry.internal_name) else {
            return Selection::Unset;
        };
        match (&entry.kind, value) {
            (FeatureKind::Toggle(_), StoredValue::Enabled(on)) => Selection::Toggled(on),
            (
                FeatureKind::MultiChoice { .. }
                | FeatureKind::Feature { .. }
                | FeatureKind::FeatureWithParams { .. },
                StoredValue::Selection(index),
            ) if index < entry.num_states() => Selection::Index(index),
            (FeatureKind::StringValue { .. }, StoredValue::Text(text)) => Selection::Text(text),
            (FeatureKind::OriginList { .. }, StoredValue::Origins(origins)) => {
                Selection::Origins(origins)
            }
            (_, value) => {
                warn!(
                    entry = %entry.internal_name,
                    ?value,
                    "stored value does not match entry kind, treating as unset"
                );
                Selection::Unset
            }
        }
    }

    fn accumulate_entry(
        &self,
        entry: &FeatureEntry,
        storage: &dyn FlagsStorage,
        enabled: &mut IndexMap<String, String>,
        disabled: &mut IndexMap<String, String>,
        loose: &mut IndexMap<String, Option<String>>,
    ) -> Result<(), FlagsError> {
        let name = entry.internal_name.as_str();
        match (&entry.kind, self.selection_for(entry, storage)) {
            (FeatureKind::Toggle(backend), Selection::Toggled(true)) => match backend {
                ToggleBackend::Switch {
                    switch_name,
                    switch_value,
                } => insert_switch(loose, switch_name, switch_value),
                ToggleBackend::Feature { feature, polarity } => {
                    encoding::validate_feature_name(name, feature)?;
                    match polarity {
                        FeaturePolarity::EnablesFeature => {
                            insert_feature(enabled, disabled, feature, feature.clone());
                        }
                        FeaturePolarity::DisablesFeature => {
                            insert_feature(disabled, enabled, feature, feature.clone());
                        }
                    }
                }
            },
            (FeatureKind::MultiChoice { choices }, Selection::Index(index)) if index != 0 => {
                let choice = &choices[index];
                if !choice.switch_name.is_empty() {
                    insert_switch(loose, &choice.switch_name, &choice.switch_value);
                }
            }
            (FeatureKind::Feature { feature }, Selection::Index(index)) if index != 0 => {
                encoding::validate_feature_name(name, feature)?;
                if index == 1 {
                    insert_feature(enabled, disabled, feature, feature.clone());
                } else {
                    insert_feature(disabled, enabled, feature, feature.clone());
                }
            }
            (
                FeatureKind::FeatureWithParams {
                    feature,
                    trial,
                    variations,
                },
                Selection::Index(index),
            ) if index != 0 => {
                if index == 2 + variations.len() {
                    encoding::validate_feature_name(name, feature)?;
                    insert_feature(disabled, enabled, feature, feature.clone());
                } else if let Some(variation) = entry.selected_variation(index) {
                    let encoded =
                        encoding::encode_feature(name, feature, trial.as_deref(), &variation.params)?;
                    insert_feature(enabled, disabled, feature, encoded);
                } else {
                    encoding::validate_feature_name(name, feature)?;
                    insert_feature(enabled, disabled, feature, feature.clone());
                }
            }
            (FeatureKind::StringValue { switch_name }, Selection::Text(text)) => {
                if !text.is_empty() {
                    insert_switch(loose, switch_name, &text);
                }
            }
            (FeatureKind::OriginList { switch_name }, Selection::Origins(origins)) => {
                if !origins.is_empty() {
                    insert_switch(loose, switch_name, &origins.join(","));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Last write wins across both feature sets: a later entry targeting the
/// same feature displaces an earlier contribution, whichever set it was in.
fn insert_feature(
    into: &mut IndexMap<String, String>,
    from: &mut IndexMap<String, String>,
    feature: &str,
    encoded: String,
) {
    from.shift_remove(feature);
    into.shift_remove(feature);
    into.insert(feature.to_string(), encoded);
}

fn insert_switch(loose: &mut IndexMap<String, Option<String>>, name: &str, value: &str) {
    let value = if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    };
    loose.shift_remove(name);
    loose.insert(name.to_string(), value);
}

fn flag_region_or_all(command_line: &CommandLine) -> &[crate::command_line::Switch] {
    command_line
        .region_switches(FLAG_SWITCHES_BEGIN, FLAG_SWITCHES_END)
        .unwrap_or_else(|| command_line.switches())
}

fn split_feature_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|feature| {
            feature
                .split(|c| c == '<' || c == ':')
                .next()
                .unwrap_or(feature)
                .to_string()
        })
        .filter(|feature| !feature.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::flags_storage::InMemoryFlagsStorage;
    use crate::test_utils::{flags_state, toggle_switch_entry};

    #[test]
    fn test_unknown_name_mutations_are_no_ops() {
        let state = flags_state(vec![toggle_switch_entry("known", "known-switch")]);
        let storage = InMemoryFlagsStorage::new();
        state.set_feature_entry_enabled(&storage, "retired", true);
        state.set_string_flag(&storage, "retired", "value");
        state.set_origin_list_flag(&storage, "retired", "https://a.test");
        assert!(storage.keys().is_empty());
    }

    #[test]
    fn test_malformed_stored_value_reads_as_unset() {
        let state = flags_state(vec![toggle_switch_entry("toggle", "toggle-switch")]);
        let storage = InMemoryFlagsStorage::new();
        // A selection index where a boolean belongs.
        storage.set("toggle", StoredValue::Selection(7));
        let mut command_line = CommandLine::new();
        state
            .convert_flags_to_switches(&storage, &mut command_line, SentinelsMode::Omit)
            .unwrap();
        assert!(command_line.switches().is_empty());
    }

    #[test]
    fn test_split_feature_names_strips_trials_and_params() {
        assert_eq!(
            split_feature_names("A,B<Study,C:k/v,D<S:k/v"),
            vec!["A", "B", "C", "D"]
        );
        assert!(split_feature_names("").is_empty());
    }
}
