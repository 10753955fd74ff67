//! Keyed store of mapping profiles
//!
//! Plain owned data with no locking of its own; the engine serializes access.
//! Profiles are kept ordered by id so scans and conflict lists are
//! deterministic regardless of insertion order.

use crate::mapping::MidiMapping;
use std::collections::BTreeMap;

/// Owns every known mapping profile, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MappingStore {
    profiles: BTreeMap<String, MidiMapping>,
}

impl MappingStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with profiles. Later duplicates replace earlier ones.
    pub fn with_profiles(profiles: impl IntoIterator<Item = MidiMapping>) -> Self {
        let mut store = Self::new();
        for profile in profiles {
            store.insert(profile);
        }
        store
    }

    /// Insert or replace a profile. Returns the previous profile with that id.
    pub fn insert(&mut self, profile: MidiMapping) -> Option<MidiMapping> {
        self.profiles.insert(profile.id.clone(), profile)
    }

    pub fn get(&self, id: &str) -> Option<&MidiMapping> {
        self.profiles.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut MidiMapping> {
        self.profiles.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<MidiMapping> {
        self.profiles.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.profiles.contains_key(id)
    }

    /// Set the active flag of a profile. Returns false if the id is unknown.
    pub fn set_active(&mut self, id: &str, is_active: bool) -> bool {
        match self.profiles.get_mut(id) {
            Some(profile) => {
                profile.is_active = is_active;
                true
            }
            None => false,
        }
    }

    /// Deactivate every profile except `keep`.
    pub fn deactivate_all_except(&mut self, keep: &str) {
        for profile in self.profiles.values_mut() {
            if profile.id != keep {
                profile.is_active = false;
            }
        }
    }

    /// Clones of all active profiles, ordered by id.
    pub fn active_profiles(&self) -> Vec<MidiMapping> {
        self.profiles
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect()
    }

    /// Mutable access to every active profile.
    pub fn active_profiles_mut(&mut self) -> impl Iterator<Item = &mut MidiMapping> {
        self.profiles.values_mut().filter(|p| p.is_active)
    }

    /// All profiles, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &MidiMapping> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
