pub mod ambient;
pub mod audition;
pub mod composer;
pub mod config;
pub mod console_display;
pub mod coordinator;
pub mod error;
pub mod expectancy;
pub mod ingest;
pub mod midi_codec;
pub mod playback_clock;
pub mod ports;
pub mod recorder;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod tasks;
pub mod theory;
pub mod timeline;
pub mod types;

#[cfg(feature = "midi-io")]
pub mod midi_port;
