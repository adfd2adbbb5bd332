//! Hardware MIDI ports over `midir`.
//!
//! Port choice is a plain substring match on the port name; the first
//! match wins and an empty filter takes the first port.

use crate::error::{PracticeError, Result};
use crate::ports::{decode_live_message, NoteSink};
use crate::types::InputEvent;
use crossbeam_channel::Sender;
use log::{info, warn};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use std::time::Instant;

const CLIENT_NAME: &str = "piano-practice";

/// Names of the available input and output ports.
pub fn list_ports() -> Result<(Vec<String>, Vec<String>)> {
    let midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| PracticeError::Device(e.to_string()))?;
    let midi_out = MidiOutput::new(CLIENT_NAME).map_err(|e| PracticeError::Device(e.to_string()))?;
    let inputs = midi_in
        .ports()
        .iter()
        .filter_map(|p| midi_in.port_name(p).ok())
        .collect();
    let outputs = midi_out
        .ports()
        .iter()
        .filter_map(|p| midi_out.port_name(p).ok())
        .collect();
    Ok((inputs, outputs))
}

/// Live keyboard input. Incoming note messages are stamped on arrival and
/// pushed into the session's input queue; the connection closes on drop.
pub struct MidiInputSource {
    port_name: String,
    _connection: MidiInputConnection<()>,
}

impl MidiInputSource {
    pub fn connect(name_filter: &str, tx: Sender<InputEvent>) -> Result<Self> {
        let mut midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| PracticeError::Device(e.to_string()))?;
        midi_in.ignore(Ignore::All);

        let port = midi_in
            .ports()
            .into_iter()
            .find(|p| {
                midi_in
                    .port_name(p)
                    .map(|n| n.contains(name_filter))
                    .unwrap_or(false)
            })
            .ok_or_else(|| PracticeError::Device(format!("no MIDI input matching {:?}", name_filter)))?;
        let port_name = midi_in.port_name(&port).unwrap_or_default();

        let connection = midi_in
            .connect(
                &port,
                "piano-practice-in",
                move |_stamp, bytes, _| {
                    let Some(note) = decode_live_message(bytes, Instant::now()) else {
                        return;
                    };
                    if tx.try_send(InputEvent::Note(note)).is_err() {
                        warn!("Input queue full, dropping note {}", note.pitch);
                    }
                },
                (),
            )
            .map_err(|e| PracticeError::Device(format!("connect {}: {}", port_name, e)))?;

        info!("MIDI input connected: {}", port_name);
        Ok(Self {
            port_name,
            _connection: connection,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

/// Note commands to a hardware or virtual synth, on channel 1.
pub struct MidiOutputSink {
    port_name: String,
    connection: MidiOutputConnection,
}

impl MidiOutputSink {
    pub fn connect(name_filter: &str) -> Result<Self> {
        let midi_out = MidiOutput::new(CLIENT_NAME).map_err(|e| PracticeError::Device(e.to_string()))?;
        let port = midi_out
            .ports()
            .into_iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .map(|n| n.contains(name_filter))
                    .unwrap_or(false)
            })
            .ok_or_else(|| PracticeError::Device(format!("no MIDI output matching {:?}", name_filter)))?;
        let port_name = midi_out.port_name(&port).unwrap_or_default();

        let connection = midi_out
            .connect(&port, "piano-practice-out")
            .map_err(|e| PracticeError::Device(format!("connect {}: {}", port_name, e)))?;

        info!("MIDI output connected: {}", port_name);
        Ok(Self { port_name, connection })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl NoteSink for MidiOutputSink {
    fn name(&self) -> &str {
        &self.port_name
    }

    fn send(&mut self, pitch: u8, velocity: u8, on: bool) -> Result<()> {
        let msg = if on {
            [0x90, pitch & 0x7F, velocity & 0x7F]
        } else {
            [0x80, pitch & 0x7F, 0]
        };
        self.connection
            .send(&msg)
            .map_err(|e| PracticeError::Device(e.to_string()))
    }
}
