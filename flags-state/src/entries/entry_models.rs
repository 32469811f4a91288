use serde::{Deserialize, Serialize};

use crate::platform::Platforms;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeatureParam {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeatureVariation {
    pub name: String,
    #[serde(default)]
    pub params: Vec<FeatureParam>,
    #[serde(default)]
    pub variation_id: Option<String>,
}

/// One option of a multi-choice entry. Index 0 in the choice list is the
/// default/"off" choice; a choice with an empty switch contributes nothing
/// even when selected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Choice {
    pub label: String,
    #[serde(default)]
    pub switch_name: String,
    #[serde(default)]
    pub switch_value: String,
}

/// Whether "enabled in the UI" maps the backing feature into the enabled or
/// the disabled feature set. Polarity is data on the definition, preserved
/// verbatim by resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeaturePolarity {
    EnablesFeature,
    DisablesFeature,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleBackend {
    Switch {
        switch_name: String,
        #[serde(default)]
        switch_value: String,
    },
    Feature {
        feature: String,
        polarity: FeaturePolarity,
    },
}

/// The tagged union of entry shapes. Stored selections are interpreted
/// against the kind; a stored value of the wrong shape reads as "unset".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// On/off via a plain switch or a feature with declared polarity.
    Toggle(ToggleBackend),
    /// Ordered choices; the stored selection is an index into them.
    MultiChoice { choices: Vec<Choice> },
    /// A named feature with three states: 0 default, 1 enabled, 2 disabled.
    Feature { feature: String },
    /// A feature plus named parameter sets. States: 0 default, 1 enabled
    /// bare, 2..2+n enabled with variation i, 2+n disabled.
    FeatureWithParams {
        feature: String,
        #[serde(default)]
        trial: Option<String>,
        #[serde(default)]
        variations: Vec<FeatureVariation>,
    },
    /// Free-form text emitted as the switch value; empty is the default.
    StringValue { switch_name: String },
    /// A comma-joined origin list emitted as the switch value.
    OriginList { switch_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeatureEntry {
    pub internal_name: String,
    #[serde(default)]
    pub visible_name: String,
    #[serde(default)]
    pub visible_description: String,
    pub supported_platforms: Platforms,
    pub kind: FeatureKind,
}

impl FeatureEntry {
    /// Number of distinct states a stored selection may address. For toggle
    /// and string-like kinds this is nominally two (default and set); for
    /// choice-like kinds it bounds the stored selection index.
    pub fn num_states(&self) -> usize {
        match &self.kind {
            FeatureKind::Toggle(_) | FeatureKind::StringValue { .. } | FeatureKind::OriginList { .. } => 2,
            FeatureKind::MultiChoice { choices } => choices.len(),
            FeatureKind::Feature { .. } => 3,
            FeatureKind::FeatureWithParams { variations, .. } => 3 + variations.len(),
        }
    }

    pub fn is_choice_like(&self) -> bool {
        matches!(
            self.kind,
            FeatureKind::MultiChoice { .. }
                | FeatureKind::Feature { .. }
                | FeatureKind::FeatureWithParams { .. }
        )
    }

    /// The feature this entry drives, if it is feature-backed.
    pub fn feature_name(&self) -> Option<&str> {
        match &self.kind {
            FeatureKind::Toggle(ToggleBackend::Feature { feature, .. })
            | FeatureKind::Feature { feature }
            | FeatureKind::FeatureWithParams { feature, .. } => Some(feature),
            _ => None,
        }
    }

    /// The variation addressed by a stored selection state, for
    /// feature-with-params entries. States 0 (default), 1 (enabled bare)
    /// and the final state (disabled) carry no variation.
    pub fn selected_variation(&self, state: usize) -> Option<&FeatureVariation> {
        match &self.kind {
            FeatureKind::FeatureWithParams { variations, .. } if state >= 2 => {
                variations.get(state - 2)
            }
            _ => None,
        }
    }
}
