//! MIDI file ingestion: SMF bytes to a paired, time-ordered [`Timeline`].
//!
//! Each track is normalized on its own before the tracks are merged:
//! a NoteOn for a pitch that is already sounding first closes the earlier
//! note at the same instant, and notes still open at end of track are
//! closed [`ORPHAN_CLOSE_SECS`] after their onset. A NoteOn repeating the
//! open onset's exact time is a duplicate and is dropped, so every
//! synthetic NoteOff lands strictly after its onset. NoteOffs with no open
//! note are kept as they are.

use crate::error::{PracticeError, Result};
use crate::midi_codec;
use crate::timeline::Timeline;
use crate::types::*;
use log::{debug, info};
use std::path::Path;

/// Read and ingest a Standard MIDI File.
pub fn ingest(path: &Path) -> Result<Timeline> {
    let bytes = std::fs::read(path).map_err(|e| PracticeError::io(path, e))?;
    let timeline = ingest_bytes(&bytes)?;
    info!(
        "Ingested {:?}: {} events, {} notes, {:.2}s",
        path.file_name().unwrap_or_default(),
        timeline.len(),
        timeline.max_score(),
        timeline.last_event_time()
    );
    Ok(timeline)
}

pub fn ingest_bytes(bytes: &[u8]) -> Result<Timeline> {
    let decoded = midi_codec::decode_tracks(bytes)?;
    let mut events = Vec::new();
    for (i, track) in decoded.tracks.iter().enumerate() {
        let normalized = normalize_track(track);
        if normalized.len() != track.len() {
            debug!("Track {}: {} events in, {} after pairing", i, track.len(), normalized.len());
        }
        events.extend(normalized);
    }
    Ok(Timeline::from_events(events))
}

/// Pair every NoteOn in one track's events (file order) with a later NoteOff.
pub fn normalize_track(events: &[NoteEvent]) -> Vec<NoteEvent> {
    let mut open: [Option<f64>; NOTE_COUNT] = [None; NOTE_COUNT];
    let mut out = Vec::with_capacity(events.len());

    for e in events {
        let slot = &mut open[e.pitch() as usize];
        match e.kind() {
            NoteKind::On => {
                match *slot {
                    Some(onset) if onset == e.time() => {
                        debug!("Duplicate onset of {} at {:.3}s dropped", pitch_name(e.pitch()), onset);
                        continue;
                    }
                    Some(_) => out.push(NoteEvent::off(e.pitch(), e.time())),
                    None => {}
                }
                *slot = Some(e.time());
            }
            NoteKind::Off => *slot = None,
        }
        out.push(*e);
    }

    for (pitch, onset) in open.iter().enumerate() {
        if let Some(onset) = onset {
            out.push(NoteEvent::off(pitch as u8, onset + ORPHAN_CLOSE_SECS));
        }
    }
    out
}
