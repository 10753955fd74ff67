//! Conflict detection and resolution between active mappings
//!
//! Two parameter mappings conflict when they listen to the same
//! (message type, channel, controller). Detection runs over the active
//! profiles only; resolution edits the named profiles in the store.

use crate::error::{MappingError, Result, ValidationError};
use crate::mapping::{MidiMapping, MidiParameterMapping, MidiSource};
use crate::store::MappingStore;
use serde::{Deserialize, Serialize};

/// Kind of conflict between two mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// Both mappings listen to the same MIDI source
    DuplicateMidiController,
}

/// Two parameter mappings competing for the same MIDI source.
///
/// `mapping1` and `mapping2` are the profiles as they were when the conflict
/// was detected. They are the same profile for conflicts within one profile.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiMappingConflict {
    pub mapping1: MidiMapping,
    pub mapping2: MidiMapping,
    pub conflicting_parameter1: MidiParameterMapping,
    pub conflicting_parameter2: MidiParameterMapping,
    pub conflict_type: ConflictType,
}

impl MidiMappingConflict {
    /// The contested MIDI source.
    pub fn source(&self) -> MidiSource {
        self.conflicting_parameter1.source()
    }

    /// Whether both entries live in the same profile.
    pub fn is_within_profile(&self) -> bool {
        self.mapping1.id == self.mapping2.id
    }
}

/// How to settle a conflict. Each variant carries exactly what it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum MidiConflictResolution {
    /// Keep the first entry, remove the second
    KeepFirst,
    /// Keep the second entry, remove the first
    KeepSecond,
    /// Remove both colliding entries
    DisableBoth,
    /// Move the second entry to another controller number
    Reassign { new_controller: u8 },
    /// Keep only the selected mapping on the contested source
    ReplaceAll { selected_mapping: MidiParameterMapping },
    /// Remove every entry on the contested source
    RemoveAll,
}

/// Pairwise scan for shared sources across `profiles`.
///
/// Every pair of distinct profiles is compared once, so each colliding pair is
/// reported once. Entries inside one profile are compared only when
/// `scan_within_profiles` is set.
pub fn detect_conflicts(profiles: &[MidiMapping], scan_within_profiles: bool) -> Vec<MidiMappingConflict> {
    let mut conflicts = Vec::new();

    for (i, first) in profiles.iter().enumerate() {
        if scan_within_profiles {
            for (a, p1) in first.mappings.iter().enumerate() {
                for p2 in &first.mappings[a + 1..] {
                    if p1.shares_source(p2) {
                        conflicts.push(conflict(first, first, p1, p2));
                    }
                }
            }
        }

        for second in &profiles[i + 1..] {
            for p1 in &first.mappings {
                for p2 in &second.mappings {
                    if p1.shares_source(p2) {
                        conflicts.push(conflict(first, second, p1, p2));
                    }
                }
            }
        }
    }

    conflicts
}

fn conflict(
    mapping1: &MidiMapping,
    mapping2: &MidiMapping,
    parameter1: &MidiParameterMapping,
    parameter2: &MidiParameterMapping,
) -> MidiMappingConflict {
    MidiMappingConflict {
        mapping1: mapping1.clone(),
        mapping2: mapping2.clone(),
        conflicting_parameter1: parameter1.clone(),
        conflicting_parameter2: parameter2.clone(),
        conflict_type: ConflictType::DuplicateMidiController,
    }
}

/// Apply a resolution to the store.
///
/// The store is only changed when the whole resolution succeeds. A conflict
/// whose profiles or entries no longer exist fails with a not-found error.
pub fn apply_resolution(
    store: &mut MappingStore,
    conflict: &MidiMappingConflict,
    resolution: &MidiConflictResolution,
) -> Result<()> {
    let mut staged = store.clone();
    let first = conflict.mapping1.id.as_str();
    let second = conflict.mapping2.id.as_str();
    let p1 = &conflict.conflicting_parameter1;
    let p2 = &conflict.conflicting_parameter2;

    match resolution {
        MidiConflictResolution::KeepFirst => remove_entry(&mut staged, second, p2)?,
        MidiConflictResolution::KeepSecond => remove_entry(&mut staged, first, p1)?,
        MidiConflictResolution::DisableBoth => {
            remove_entry(&mut staged, first, p1)?;
            remove_entry(&mut staged, second, p2)?;
        }
        MidiConflictResolution::Reassign { new_controller } => {
            let midi_type = p2.midi_type;
            if !midi_type.uses_controller() {
                return Err(ValidationError::NoControllerToReassign(midi_type).into());
            }
            if *new_controller > 127 {
                return Err(ValidationError::ControllerOutOfRange(*new_controller).into());
            }
            let index = entry_index(&staged, second, p2)?;
            if let Some(profile) = staged.get_mut(second) {
                profile.mappings[index].midi_controller = *new_controller;
            }
        }
        MidiConflictResolution::ReplaceAll { selected_mapping } => {
            selected_mapping.validate()?;
            let survivor = if selected_mapping == p2 && selected_mapping != p1 {
                (second, entry_index(&staged, second, p2)?)
            } else {
                let index = entry_index(&staged, first, p1)?;
                if let Some(profile) = staged.get_mut(first) {
                    profile.mappings[index] = selected_mapping.clone();
                }
                (first, index)
            };
            strip_source(&mut staged, conflict, Some(survivor))?;
        }
        MidiConflictResolution::RemoveAll => strip_source(&mut staged, conflict, None)?,
    }

    *store = staged;
    Ok(())
}

fn entry_index(store: &MappingStore, profile_id: &str, entry: &MidiParameterMapping) -> Result<usize> {
    let profile = store
        .get(profile_id)
        .ok_or_else(|| MappingError::ProfileNotFound(profile_id.to_string()))?;
    profile
        .mappings
        .iter()
        .position(|m| m == entry)
        .ok_or_else(|| MappingError::ParameterMappingNotFound {
            profile_id: profile_id.to_string(),
        })
}

fn remove_entry(store: &mut MappingStore, profile_id: &str, entry: &MidiParameterMapping) -> Result<()> {
    let profile = store
        .get_mut(profile_id)
        .ok_or_else(|| MappingError::ProfileNotFound(profile_id.to_string()))?;
    if profile.remove_parameter(entry) {
        Ok(())
    } else {
        Err(MappingError::ParameterMappingNotFound {
            profile_id: profile_id.to_string(),
        })
    }
}

/// Remove every entry on the conflict's source from the two named profiles,
/// except the `keep` (profile id, index) slot.
fn strip_source(
    store: &mut MappingStore,
    conflict: &MidiMappingConflict,
    keep: Option<(&str, usize)>,
) -> Result<()> {
    let source = conflict.source();
    for id in [&conflict.mapping1.id, &conflict.mapping2.id] {
        if !store.contains(id) {
            return Err(MappingError::ProfileNotFound(id.clone()));
        }
    }

    for id in [&conflict.mapping1.id, &conflict.mapping2.id] {
        let Some(profile) = store.get_mut(id) else {
            continue;
        };
        let kept_index = keep.and_then(|(keep_id, index)| (keep_id == id.as_str()).then_some(index));
        profile.mappings = std::mem::take(&mut profile.mappings)
            .into_iter()
            .enumerate()
            .filter(|(index, m)| m.source() != source || Some(*index) == kept_index)
            .map(|(_, m)| m)
            .collect();
    }
    Ok(())
}
