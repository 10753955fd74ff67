//! Background MIDI input processing
//!
//! Messages sent to the worker are evaluated on one dedicated thread in
//! arrival order and the resulting changes are dispatched to a sink.

use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Result};
use tracing::{debug, warn};

use super::{dispatch_changes, MappingEngine, ParameterSink};
use crate::midi::MidiMessage;

enum InputCommand {
    Process(MidiMessage),
    Stop,
}

/// MIDI input worker.
pub struct MidiInputWorker {
    sender: Sender<InputCommand>,
    handle: Option<JoinHandle<()>>,
}

impl MidiInputWorker {
    /// Start a worker feeding `sink` from `engine`.
    pub fn spawn(engine: Arc<MappingEngine>, mut sink: Box<dyn ParameterSink>) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<InputCommand>();

        let handle = thread::Builder::new()
            .name("padmap-input".to_string())
            .spawn(move || {
                let mut changes = Vec::new();
                while let Ok(cmd) = receiver.recv() {
                    match cmd {
                        InputCommand::Process(message) => {
                            changes.clear();
                            engine.process_midi_message_into(message, &mut changes);
                            dispatch_changes(sink.as_mut(), &changes);
                        }
                        InputCommand::Stop => break,
                    }
                }
                debug!("MIDI input worker stopped");
            })?;

        Ok(Self {
            sender,
            handle: Some(handle),
        })
    }

    /// Queue a message for processing.
    pub fn send(&self, message: MidiMessage) -> Result<()> {
        self.sender
            .send(InputCommand::Process(message))
            .map_err(|_| anyhow!("MIDI input worker has stopped"))
    }

    /// Process everything already queued, then stop the thread.
    pub fn stop(&mut self) {
        let _ = self.sender.send(InputCommand::Stop);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("MIDI input worker panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for MidiInputWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::{RecordingSink, SinkEvent};
    use crate::mapping::{MidiMapping, MidiParameterMapping, TargetType};
    use crate::midi::MidiMessageType;
    use crate::store::MappingStore;

    fn engine() -> Arc<MappingEngine> {
        let engine = MappingEngine::new(MappingStore::new(), EngineConfig::default());
        engine
            .add_mapping_profile(
                MidiMapping::new("live", "Live")
                    .with(MidiParameterMapping::control_change(0, 7, TargetType::PadVolume, "pad0"))
                    .with(MidiParameterMapping::new(
                        MidiMessageType::NoteOn,
                        9,
                        36,
                        TargetType::PadTrigger,
                        "pad1",
                    ))
                    .active(true),
            )
            .unwrap();
        Arc::new(engine)
    }

    #[test]
    fn test_worker_processes_in_order() {
        let sink = RecordingSink::new();
        let mut worker = MidiInputWorker::spawn(engine(), Box::new(sink.clone())).unwrap();

        worker.send(MidiMessage::control_change(0, 7, 0)).unwrap();
        worker.send(MidiMessage::note_on(9, 36, 127)).unwrap();
        worker.send(MidiMessage::control_change(0, 7, 127)).unwrap();
        worker.stop();

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], SinkEvent::Change { value, .. } if *value == 0.0));
        assert!(matches!(&events[1], SinkEvent::Trigger { target_id, .. } if target_id == "pad1"));
        assert!(matches!(&events[2], SinkEvent::Change { value, .. } if *value == 1.0));
    }

    #[test]
    fn test_send_after_stop_fails() {
        let mut worker = MidiInputWorker::spawn(engine(), Box::new(RecordingSink::new())).unwrap();
        worker.stop();
        assert!(!worker.is_running());
        assert!(worker.send(MidiMessage::control_change(0, 7, 64)).is_err());
    }
}
