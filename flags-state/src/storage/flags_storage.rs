use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What a storage entry holds, per entry kind: a boolean for toggles, a
/// selection index for choice-like kinds, text for string flags and an
/// origin list for origin-list flags. Untagged so persisted values stay
/// plain JSON scalars/arrays.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StoredValue {
    Enabled(bool),
    Selection(usize),
    Text(String),
    Origins(Vec<String>),
}

/// Whether the caller may change system-wide flags. Only meaningful on
/// multi-user platforms; owner-status determination is asynchronous in the
/// host and resolved before this crate is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, Deserialize, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Owner,
    General,
}

/// The persistence collaborator. Implementations own their own thread
/// compatibility; mutation through `&self` lets hosts back this with
/// whatever interior mutability their threading model needs. Resolution
/// only ever reads.
pub trait FlagsStorage {
    fn get(&self, internal_name: &str) -> Option<StoredValue>;
    fn set(&self, internal_name: &str, value: StoredValue);
    fn remove(&self, internal_name: &str);
    /// Every key currently present, recognized by the registry or not.
    /// Needed so stale keys left behind by older registries can be swept.
    fn keys(&self) -> Vec<String>;
    fn access_level(&self) -> AccessLevel;
}

/// Map-backed storage for tests and simple hosts.
#[derive(Debug)]
pub struct InMemoryFlagsStorage {
    values: RwLock<BTreeMap<String, StoredValue>>,
    access: AccessLevel,
}

impl InMemoryFlagsStorage {
    pub fn new() -> Self {
        Self::with_access_level(AccessLevel::Owner)
    }

    pub fn with_access_level(access: AccessLevel) -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
            access,
        }
    }
}

impl Default for InMemoryFlagsStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FlagsStorage for InMemoryFlagsStorage {
    fn get(&self, internal_name: &str) -> Option<StoredValue> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.get(internal_name).cloned()
    }

    fn set(&self, internal_name: &str, value: StoredValue) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(internal_name.to_string(), value);
    }

    fn remove(&self, internal_name: &str) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(internal_name);
    }

    fn keys(&self) -> Vec<String> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.keys().cloned().collect()
    }

    fn access_level(&self) -> AccessLevel {
        self.access
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove_round_trip() {
        let storage = InMemoryFlagsStorage::new();
        storage.set("toggle", StoredValue::Enabled(true));
        assert_eq!(storage.get("toggle"), Some(StoredValue::Enabled(true)));
        storage.remove("toggle");
        assert_eq!(storage.get("toggle"), None);
    }

    #[test]
    fn test_keys_lists_everything_stored() {
        let storage = InMemoryFlagsStorage::new();
        storage.set("a", StoredValue::Selection(1));
        storage.set("b", StoredValue::Text("value".to_string()));
        assert_eq!(storage.keys(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_stored_value_serializes_untagged() {
        assert_eq!(
            serde_json::to_string(&StoredValue::Enabled(true)).unwrap(),
            "true"
        );
        assert_eq!(
            serde_json::to_string(&StoredValue::Selection(2)).unwrap(),
            "2"
        );
        let origins: StoredValue =
            serde_json::from_str(r#"["https://a.test","https://b.test"]"#).unwrap();
        assert_eq!(
            origins,
            StoredValue::Origins(vec![
                "https://a.test".to_string(),
                "https://b.test".to_string()
            ])
        );
    }

    #[test]
    fn test_access_level_round_trips_through_strum() {
        use std::str::FromStr;
        assert_eq!(AccessLevel::Owner.to_string(), "owner");
        assert_eq!(AccessLevel::from_str("general").unwrap(), AccessLevel::General);
    }
}
