//! Note sinks and the live input queue.
//!
//! Sources (device callbacks, scripted producers) only ever `try_send` into
//! the bounded input queue; the session drains it once per tick. Sinks are
//! shared behind a mutex so the preview thread and the session can both
//! reach them. A failing sink is logged and otherwise ignored.

use crate::error::Result;
use crate::types::*;
use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, info};
use midly::live::LiveEvent;
use midly::MidiMessage;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

pub const INPUT_QUEUE_CAPACITY: usize = 4096;

/// Anything that can receive note commands: a MIDI output, a logger, an in-memory log.
pub trait NoteSink: Send {
    fn name(&self) -> &str;
    fn send(&mut self, pitch: u8, velocity: u8, on: bool) -> Result<()>;
}

pub type SharedSink = Arc<Mutex<dyn NoteSink>>;

pub fn shared<S: NoteSink + 'static>(sink: S) -> SharedSink {
    Arc::new(Mutex::new(sink))
}

/// Send one command to every sink, ignoring failures.
pub fn send_to_all(sinks: &[SharedSink], pitch: u8, velocity: u8, on: bool) {
    for sink in sinks {
        let mut sink = sink.lock();
        if let Err(e) = sink.send(pitch, velocity, on) {
            debug!("Sink {} rejected note {}: {}", sink.name(), pitch, e);
        }
    }
}

/// NoteOff for all 128 pitches on every sink. Never fails.
pub fn all_notes_off(sinks: &[SharedSink]) {
    for sink in sinks {
        let mut sink = sink.lock();
        let mut failures = 0;
        for pitch in 0..NOTE_COUNT as u8 {
            if sink.send(pitch, 0, false).is_err() {
                failures += 1;
            }
        }
        if failures > 0 {
            debug!("Sink {}: {} note-offs failed", sink.name(), failures);
        }
    }
}

pub fn input_queue() -> (Sender<InputEvent>, Receiver<InputEvent>) {
    bounded(INPUT_QUEUE_CAPACITY)
}

/// Decode one raw channel message. NoteOn with velocity 0 is a release;
/// everything that is not a note is ignored.
pub fn decode_live_message(bytes: &[u8], arrival: Instant) -> Option<LiveNote> {
    match LiveEvent::parse(bytes).ok()? {
        LiveEvent::Midi { message, .. } => match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                Some(LiveNote::press(key.as_int(), vel.as_int(), arrival))
            }
            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                Some(LiveNote::release(key.as_int(), arrival))
            }
            _ => None,
        },
        _ => None,
    }
}

// ─── Built-in sinks ─────────────────────────────────────────────────────────

/// Logs every command at info level. The headless default.
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl NoteSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, pitch: u8, velocity: u8, on: bool) -> Result<()> {
        // all-notes-off sweeps would flood the log
        if on {
            info!("{} ▶ {} vel={}", self.name, pitch_name(pitch), velocity);
        } else {
            debug!("{} ■ {}", self.name, pitch_name(pitch));
        }
        Ok(())
    }
}

/// One command received by a [`MemorySink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkMessage {
    pub pitch: u8,
    pub velocity: u8,
    pub on: bool,
}

/// Keeps every command in memory; clones share the same log.
#[derive(Clone, Default)]
pub struct MemorySink {
    log: Arc<Mutex<Vec<SinkMessage>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<SinkMessage> {
        self.log.lock().clone()
    }

    pub fn note_ons(&self) -> Vec<SinkMessage> {
        self.log.lock().iter().filter(|m| m.on).copied().collect()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }
}

impl NoteSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn send(&mut self, pitch: u8, velocity: u8, on: bool) -> Result<()> {
        self.log.lock().push(SinkMessage { pitch, velocity, on });
        Ok(())
    }
}
