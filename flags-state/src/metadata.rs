use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::errors::FlagsError;
use crate::storage::flags_storage::FlagsStorage;
use crate::visibility::FlagExpiry;

fn unset_milestone() -> i32 {
    -1
}

/// Per-flag bookkeeping record: the milestone at which the flag expires
/// (-1 for never) and who is on the hook for it. Kept as a JSON list next
/// to the registry data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FlagMetadata {
    pub name: String,
    #[serde(default = "unset_milestone")]
    pub expiry_milestone: i32,
    #[serde(default)]
    pub owners: Vec<String>,
}

/// Expiry oracle driven by flag metadata: a flag is expired once the
/// running milestone reaches its expiry milestone. Flags without a record
/// never expire.
#[derive(Debug, Clone)]
pub struct MilestoneExpiry {
    current_milestone: i32,
    expiry_by_name: HashMap<String, i32>,
}

impl MilestoneExpiry {
    pub fn new(current_milestone: i32, metadata: Vec<FlagMetadata>) -> Self {
        let expiry_by_name = metadata
            .into_iter()
            .map(|record| (record.name, record.expiry_milestone))
            .collect();
        Self {
            current_milestone,
            expiry_by_name,
        }
    }

    pub fn from_json(current_milestone: i32, json: &str) -> Result<Self, FlagsError> {
        let metadata: Vec<FlagMetadata> = serde_json::from_str(json).map_err(|e| {
            tracing::error!("failed to parse flag metadata: {}", e);
            FlagsError::MetadataParsing(e.to_string())
        })?;
        Ok(Self::new(current_milestone, metadata))
    }
}

impl FlagExpiry for MilestoneExpiry {
    fn is_flag_expired(&self, _storage: &dyn FlagsStorage, internal_name: &str) -> bool {
        match self.expiry_by_name.get(internal_name) {
            Some(&milestone) => milestone != -1 && milestone <= self.current_milestone,
            None => false,
        }
    }
}
