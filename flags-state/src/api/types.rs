use serde::{Deserialize, Serialize};

use crate::platform::Platforms;

/// One registry entry annotated with its storage-derived selection state,
/// shaped for a settings UI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryState {
    pub internal_name: String,
    pub visible_name: String,
    pub visible_description: String,
    pub supported_platforms: Platforms,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_state: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_list_value: Option<String>,
}

/// Every registry entry lands in exactly one of the two lists. Unsupported
/// entries are still enumerable for diagnostics but never convert to
/// switches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureEntriesResponse {
    pub supported: Vec<EntryState>,
    pub unsupported: Vec<EntryState>,
}
