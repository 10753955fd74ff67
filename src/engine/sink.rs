//! Delivery of parameter changes to the sound engine

use super::MidiParameterChange;
use crate::mapping::TargetType;
use parking_lot::Mutex;
use std::sync::Arc;

/// Receiver of parameter changes.
///
/// Implemented by whatever owns the pads and the sequencer.
pub trait ParameterSink: Send {
    /// Set a continuous parameter
    fn apply_parameter_change(&mut self, target_type: TargetType, target_id: &str, value: f64);

    /// Fire a pad
    fn trigger(&mut self, target_id: &str, value: f64);
}

/// Route changes to a sink: pad triggers fire, everything else is applied.
pub fn dispatch_changes(sink: &mut dyn ParameterSink, changes: &[MidiParameterChange]) {
    for change in changes {
        if change.target_type.is_trigger() {
            sink.trigger(&change.target_id, change.value);
        } else {
            sink.apply_parameter_change(change.target_type, &change.target_id, change.value);
        }
    }
}

/// What a [`RecordingSink`] saw.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Change {
        target_type: TargetType,
        target_id: String,
        value: f64,
    },
    Trigger {
        target_id: String,
        value: f64,
    },
}

/// Sink that records every call. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl ParameterSink for RecordingSink {
    fn apply_parameter_change(&mut self, target_type: TargetType, target_id: &str, value: f64) {
        self.events.lock().push(SinkEvent::Change {
            target_type,
            target_id: target_id.to_string(),
            value,
        });
    }

    fn trigger(&mut self, target_id: &str, value: f64) {
        self.events.lock().push(SinkEvent::Trigger {
            target_id: target_id.to_string(),
            value,
        });
    }
}
