//! Fixtures shared by unit and integration tests.

use rand::{distributions::Alphanumeric, Rng};

use crate::entries::entry_models::{
    Choice, FeatureEntry, FeatureKind, FeatureParam, FeaturePolarity, FeatureVariation,
    ToggleBackend,
};
use crate::entries::entry_registry::FlagRegistry;
use crate::flags_state::FlagsState;
use crate::platform::Platforms;

pub fn random_string(prefix: &str, length: usize) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();
    format!("{}{}", prefix, suffix)
}

fn base_entry(name: &str, kind: FeatureKind) -> FeatureEntry {
    FeatureEntry {
        internal_name: name.to_string(),
        visible_name: name.to_string(),
        visible_description: format!("Description of {name}"),
        supported_platforms: Platforms::all(),
        kind,
    }
}

pub fn toggle_switch_entry(name: &str, switch_name: &str) -> FeatureEntry {
    base_entry(
        name,
        FeatureKind::Toggle(ToggleBackend::Switch {
            switch_name: switch_name.to_string(),
            switch_value: String::new(),
        }),
    )
}

pub fn toggle_feature_entry(name: &str, feature: &str, polarity: FeaturePolarity) -> FeatureEntry {
    base_entry(
        name,
        FeatureKind::Toggle(ToggleBackend::Feature {
            feature: feature.to_string(),
            polarity,
        }),
    )
}

pub fn choice(label: &str, switch_name: &str, switch_value: &str) -> Choice {
    Choice {
        label: label.to_string(),
        switch_name: switch_name.to_string(),
        switch_value: switch_value.to_string(),
    }
}

pub fn multi_choice_entry(name: &str, choices: Vec<Choice>) -> FeatureEntry {
    base_entry(name, FeatureKind::MultiChoice { choices })
}

pub fn feature_entry(name: &str, feature: &str) -> FeatureEntry {
    base_entry(
        name,
        FeatureKind::Feature {
            feature: feature.to_string(),
        },
    )
}

pub fn feature_with_params_entry(
    name: &str,
    feature: &str,
    trial: Option<&str>,
    variations: Vec<FeatureVariation>,
) -> FeatureEntry {
    base_entry(
        name,
        FeatureKind::FeatureWithParams {
            feature: feature.to_string(),
            trial: trial.map(str::to_string),
            variations,
        },
    )
}

pub fn variation(name: &str, params: &[(&str, &str)], variation_id: Option<&str>) -> FeatureVariation {
    FeatureVariation {
        name: name.to_string(),
        params: params
            .iter()
            .map(|(name, value)| FeatureParam {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
        variation_id: variation_id.map(str::to_string),
    }
}

pub fn string_entry(name: &str, switch_name: &str) -> FeatureEntry {
    base_entry(
        name,
        FeatureKind::StringValue {
            switch_name: switch_name.to_string(),
        },
    )
}

pub fn origin_list_entry(name: &str, switch_name: &str) -> FeatureEntry {
    base_entry(
        name,
        FeatureKind::OriginList {
            switch_name: switch_name.to_string(),
        },
    )
}

pub fn registry(entries: Vec<FeatureEntry>) -> FlagRegistry {
    FlagRegistry::new(entries).expect("valid test registry")
}

/// An engine over the given entries, pinned to a fixed platform so tests
/// behave the same on every build host.
pub fn flags_state(entries: Vec<FeatureEntry>) -> FlagsState {
    FlagsState::new(registry(entries)).with_platform(Platforms::LINUX)
}
