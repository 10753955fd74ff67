//! Mapping engine for padmap
//!
//! Turns incoming MIDI messages into parameter changes and manages the
//! profile library.
//!
//! Structural edits (add, update, remove, activate, resolve) run one at a
//! time under a mutex. After each edit that can change the active set, the
//! engine rebuilds an immutable [`ActiveSnapshot`] (active profiles plus
//! their conflicts) and publishes it with an atomic pointer swap. The MIDI
//! hot path only loads the current snapshot and never takes the mutex.

mod conflict;
mod input;
mod sink;

pub use conflict::{
    apply_resolution, detect_conflicts, ConflictType, MidiConflictResolution, MidiMappingConflict,
};
pub use input::MidiInputWorker;
pub use sink::{dispatch_changes, ParameterSink, RecordingSink, SinkEvent};

use crate::config::{ActivationPolicy, EngineConfig, PadmapConfig};
use crate::error::{MappingError, Result, ValidationError};
use crate::mapping::{
    create_bidirectional_mapping, transform, MidiMapping, MidiParameterMapping, TargetType,
};
use crate::midi::MidiMessage;
use crate::store::MappingStore;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

/// A parameter value produced by one mapping for one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidiParameterChange {
    pub target_type: TargetType,
    pub target_id: String,
    pub value: f64,
    /// The message that produced this change
    pub message: MidiMessage,
}

/// Immutable view of the active profiles and their conflicts.
#[derive(Debug, Clone, Default)]
pub struct ActiveSnapshot {
    /// Increases by one with every publication
    pub generation: u64,
    /// Active profiles, ordered by id
    pub profiles: Vec<MidiMapping>,
    pub conflicts: Vec<MidiMappingConflict>,
}

/// Notifications sent to subscribers.
#[derive(Debug, Clone)]
pub enum MappingEvent {
    /// A new active snapshot was published
    SnapshotPublished(Arc<ActiveSnapshot>),
}

struct EngineState {
    store: MappingStore,
    current: Option<String>,
    generation: u64,
}

/// The mapping engine
pub struct MappingEngine {
    config: EngineConfig,
    state: Mutex<EngineState>,
    snapshot: ArcSwap<ActiveSnapshot>,
    events: broadcast::Sender<MappingEvent>,
}

impl MappingEngine {
    /// Create an engine around an existing store.
    ///
    /// Profiles that fail validation are dropped with a warning. Under
    /// exclusive activation only the first active profile (by id) stays active.
    pub fn new(mut store: MappingStore, config: EngineConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        let invalid: Vec<(String, ValidationError)> = store
            .iter()
            .filter_map(|p| p.validate().err().map(|e| (p.id.clone(), e)))
            .collect();
        for (id, error) in invalid {
            warn!(profile = %id, %error, "Dropping invalid mapping profile");
            store.remove(&id);
        }

        let mut state = EngineState {
            store,
            current: None,
            generation: 0,
        };

        if config.activation == ActivationPolicy::Exclusive {
            let first_active = state.store.iter().find(|p| p.is_active).map(|p| p.id.clone());
            if let Some(id) = first_active {
                let active = state.store.active_profiles().len();
                if active > 1 {
                    warn!(kept = %id, dropped = active - 1, "Exclusive activation: deactivating extra profiles");
                }
                state.store.deactivate_all_except(&id);
                state.current = Some(id);
            }
        }

        let engine = Self {
            config,
            state: Mutex::new(state),
            snapshot: ArcSwap::from_pointee(ActiveSnapshot::default()),
            events,
        };
        {
            let mut state = engine.state.lock();
            engine.publish(&mut state);
        }
        engine
    }

    /// Create an engine from configuration, adding every configured profile.
    pub fn from_config(config: &PadmapConfig) -> Result<Self> {
        let engine = Self::new(MappingStore::new(), config.engine.clone());
        for profile in &config.profiles {
            engine.add_mapping_profile(profile.clone())?;
        }
        Ok(engine)
    }

    /// Engine settings
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- Hot path ----

    /// Evaluate a message against every active mapping.
    ///
    /// Never fails; a message nothing listens to yields no changes.
    pub fn process_midi_message(&self, message: MidiMessage) -> Vec<MidiParameterChange> {
        let mut changes = Vec::new();
        self.process_midi_message_into(message, &mut changes);
        changes
    }

    /// Like [`process_midi_message`](Self::process_midi_message), appending to
    /// a caller-owned buffer. Returns the number of changes appended.
    pub fn process_midi_message_into(
        &self,
        message: MidiMessage,
        out: &mut Vec<MidiParameterChange>,
    ) -> usize {
        let Some(raw) = message.source_value() else {
            return 0;
        };

        let snapshot = self.snapshot.load();
        let before = out.len();
        for profile in &snapshot.profiles {
            for mapping in &profile.mappings {
                if !matches_message(mapping, &message) {
                    continue;
                }
                let value = transform::midi_to_parameter(raw, mapping, message.message_type);
                trace!(
                    profile = %profile.id,
                    target = %mapping.target_id,
                    value,
                    "MIDI mapping matched"
                );
                out.push(MidiParameterChange {
                    target_type: mapping.target_type,
                    target_id: mapping.target_id.clone(),
                    value,
                    message,
                });
            }
        }
        out.len() - before
    }

    // ---- Profile management ----

    /// Validate and store a new profile.
    pub fn add_mapping_profile(&self, mapping: MidiMapping) -> Result<()> {
        mapping.validate()?;
        self.warn_inconsistent(&mapping);

        let mut state = self.state.lock();
        if state.store.contains(&mapping.id) {
            return Err(ValidationError::DuplicateProfileId(mapping.id).into());
        }

        let id = mapping.id.clone();
        let is_active = mapping.is_active;
        info!(profile = %id, mappings = mapping.mappings.len(), active = is_active, "Added mapping profile");
        state.store.insert(mapping);

        if is_active {
            self.claim_exclusive(&mut state, &id);
            self.publish(&mut state);
        }
        Ok(())
    }

    /// Remove a profile by id.
    pub fn remove_mapping_profile(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock();
        let removed = state
            .store
            .remove(id)
            .ok_or_else(|| MappingError::ProfileNotFound(id.to_string()))?;

        if state.current.as_deref() == Some(id) {
            state.current = None;
        }
        info!(profile = %id, "Removed mapping profile");
        if removed.is_active {
            self.publish(&mut state);
        }
        Ok(())
    }

    /// Make a profile the current one.
    ///
    /// The previously current profile is deactivated. Under exclusive
    /// activation every other profile is deactivated too.
    pub fn set_active_mapping_profile(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock();
        if !state.store.contains(id) {
            return Err(MappingError::ProfileNotFound(id.to_string()));
        }

        if let Some(previous) = state.current.take() {
            if previous != id {
                state.store.set_active(&previous, false);
                debug!(profile = %previous, "Deactivated previous profile");
            }
        }
        state.store.set_active(id, true);
        self.claim_exclusive(&mut state, id);
        state.current = Some(id.to_string());

        info!(profile = %id, "Activated mapping profile");
        self.publish(&mut state);
        Ok(())
    }

    /// Validate and overwrite an existing profile.
    pub fn update_mapping_profile(&self, mapping: MidiMapping) -> Result<()> {
        mapping.validate()?;
        self.warn_inconsistent(&mapping);

        let mut state = self.state.lock();
        let was_active = state
            .store
            .get(&mapping.id)
            .map(|p| p.is_active)
            .ok_or_else(|| MappingError::ProfileNotFound(mapping.id.clone()))?;

        let id = mapping.id.clone();
        let is_active = mapping.is_active;
        state.store.insert(mapping);

        if is_active {
            self.claim_exclusive(&mut state, &id);
        } else if state.current.as_deref() == Some(id.as_str()) {
            state.current = None;
        }

        info!(profile = %id, active = is_active, "Updated mapping profile");
        if was_active || is_active {
            self.publish(&mut state);
        }
        Ok(())
    }

    // ---- Conflicts ----

    /// Conflicts between the active profiles.
    ///
    /// Every change to the active set republishes the snapshot with a fresh
    /// scan, so this reads the published list without rescanning.
    pub fn detect_mapping_conflicts(&self) -> Vec<MidiMappingConflict> {
        self.snapshot.load().conflicts.clone()
    }

    /// Settle a conflict and republish.
    pub fn resolve_mapping_conflict(
        &self,
        conflict: &MidiMappingConflict,
        resolution: MidiConflictResolution,
    ) -> Result<()> {
        let mut state = self.state.lock();
        apply_resolution(&mut state.store, conflict, &resolution)?;
        info!(
            first = %conflict.mapping1.id,
            second = %conflict.mapping2.id,
            ?resolution,
            "Resolved mapping conflict"
        );
        self.publish(&mut state);
        Ok(())
    }

    // ---- Accessors ----

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<ActiveSnapshot> {
        self.snapshot.load_full()
    }

    /// Active profiles from the current snapshot.
    pub fn active_mappings(&self) -> Vec<MidiMapping> {
        self.snapshot.load().profiles.clone()
    }

    /// Conflicts from the current snapshot.
    pub fn conflicts(&self) -> Vec<MidiMappingConflict> {
        self.snapshot.load().conflicts.clone()
    }

    /// Id of the current profile, if any.
    pub fn current_profile_id(&self) -> Option<String> {
        self.state.lock().current.clone()
    }

    /// A stored profile by id.
    pub fn mapping_profile(&self, id: &str) -> Option<MidiMapping> {
        self.state.lock().store.get(id).cloned()
    }

    /// Every stored profile, ordered by id.
    pub fn mapping_profiles(&self) -> Vec<MidiMapping> {
        self.state.lock().store.iter().cloned().collect()
    }

    /// Subscribe to snapshot publications.
    pub fn subscribe(&self) -> broadcast::Receiver<MappingEvent> {
        self.events.subscribe()
    }

    // ---- Internals (called with the state lock held) ----

    fn claim_exclusive(&self, state: &mut EngineState, id: &str) {
        if self.config.activation == ActivationPolicy::Exclusive {
            state.store.deactivate_all_except(id);
            state.current = Some(id.to_string());
        }
    }

    fn publish(&self, state: &mut EngineState) {
        let profiles = state.store.active_profiles();
        let conflicts = detect_conflicts(&profiles, self.config.scan_within_profiles);
        state.generation += 1;

        if !conflicts.is_empty() {
            warn!(count = conflicts.len(), "Conflicting MIDI assignments in active profiles");
        }
        debug!(
            generation = state.generation,
            active = profiles.len(),
            "Published active mapping snapshot"
        );

        let snapshot = Arc::new(ActiveSnapshot {
            generation: state.generation,
            profiles,
            conflicts,
        });
        self.snapshot.store(Arc::clone(&snapshot));
        // No subscribers is fine
        let _ = self.events.send(MappingEvent::SnapshotPublished(snapshot));
    }

    fn warn_inconsistent(&self, profile: &MidiMapping) {
        for mapping in &profile.mappings {
            let pair = create_bidirectional_mapping(mapping);
            if !pair.validate_consistency(self.config.consistency_tolerance) {
                warn!(
                    profile = %profile.id,
                    target = %mapping.target_id,
                    error = pair.max_round_trip_error(),
                    "Mapping does not round-trip; feedback to the controller will be lossy"
                );
            }
        }
    }
}

/// Type and channel must match; the controller only matters for control change.
#[inline]
fn matches_message(mapping: &MidiParameterMapping, message: &MidiMessage) -> bool {
    message.message_type == mapping.midi_type
        && message.channel == mapping.midi_channel
        && (!mapping.midi_type.uses_controller() || message.data1 == mapping.midi_controller)
}
