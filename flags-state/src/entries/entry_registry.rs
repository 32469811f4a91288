use std::collections::HashMap;

use crate::api::errors::FlagsError;
use crate::entries::entry_models::FeatureEntry;

/// The immutable, ordered set of known entries. Iteration order is
/// declaration order; resolution's last-write-wins semantics depend on it,
/// so the backing store is a vector plus a name index, never a hash map
/// iterated directly.
#[derive(Debug, Clone)]
pub struct FlagRegistry {
    entries: Vec<FeatureEntry>,
    by_name: HashMap<String, usize>,
}

impl FlagRegistry {
    pub fn new(entries: Vec<FeatureEntry>) -> Result<Self, FlagsError> {
        let mut by_name = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.internal_name.is_empty() {
                return Err(FlagsError::EmptyEntryName);
            }
            if by_name.insert(entry.internal_name.clone(), index).is_some() {
                return Err(FlagsError::DuplicateEntryName(entry.internal_name.clone()));
            }
        }
        Ok(Self { entries, by_name })
    }

    pub fn entries(&self) -> &[FeatureEntry] {
        &self.entries
    }

    pub fn get(&self, internal_name: &str) -> Option<&FeatureEntry> {
        self.by_name.get(internal_name).map(|&index| &self.entries[index])
    }

    pub fn contains(&self, internal_name: &str) -> bool {
        self.by_name.contains_key(internal_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
