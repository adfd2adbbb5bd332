//! Standard MIDI File conversion: delta ticks ⇄ absolute seconds.
//!
//! Reading merges every track's `set_tempo` events into one [`TempoMap`]
//! before converting any note, so tempo changes stored in a conductor
//! track apply to the notes of later tracks. Writing produces a format-0
//! file with a single track: tempo meta at tick 0, the notes on channel 0,
//! then EndOfTrack.
//!
//! Track chunks are walked event by event. A malformed message is skipped
//! on its own and reading carries on with the next event of that track.

use crate::error::{PracticeError, Result};
use crate::types::*;
use log::{debug, info, warn};
use midly::num::{u15, u24, u28, u4, u7};
use midly::{EventIter, Format, Fps, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::path::Path;

/// Largest delta a variable-length quantity can carry.
const MAX_DELTA: u64 = (1 << 28) - 1;
const MAX_TEMPO: u32 = (1 << 24) - 1;
const MAX_TICKS_PER_QUARTER: u16 = (1 << 15) - 1;

// ─── Tick arithmetic ────────────────────────────────────────────────────────

/// Seconds → ticks at a fixed tempo, rounded to the nearest tick.
pub fn seconds_to_ticks(seconds: f64, ticks_per_quarter: u16, tempo: u32) -> u64 {
    if tempo == 0 || !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1_000_000.0 / tempo as f64 * ticks_per_quarter as f64).round() as u64
}

pub fn ticks_to_seconds(ticks: u64, ticks_per_quarter: u16, tempo: u32) -> f64 {
    if ticks_per_quarter == 0 {
        return 0.0;
    }
    ticks as f64 * tempo as f64 / 1_000_000.0 / ticks_per_quarter as f64
}

/// How a file's ticks relate to wall time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timebase {
    /// Ticks per quarter note; duration depends on the tempo.
    Metrical { ticks_per_quarter: u16 },
    /// SMPTE frames × subframes; tempo meta events are ignored.
    Timecode { ticks_per_second: f64 },
}

impl Timebase {
    fn from_timing(timing: Timing) -> Self {
        match timing {
            Timing::Metrical(tpq) => Timebase::Metrical {
                ticks_per_quarter: tpq.as_int(),
            },
            Timing::Timecode(fps, subframes) => {
                let frames = match fps {
                    Fps::Fps24 => 24.0,
                    Fps::Fps25 => 25.0,
                    Fps::Fps29 => 29.97,
                    Fps::Fps30 => 30.0,
                };
                Timebase::Timecode {
                    ticks_per_second: frames * subframes as f64,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TempoSegment {
    tick: u64,
    seconds: f64,
    tempo: u32,
}

/// Piecewise-constant tempo over absolute ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    timebase: Timebase,
    /// Always starts at tick 0; ticks strictly ascending.
    segments: Vec<TempoSegment>,
}

impl TempoMap {
    /// Builds the map from `(tick, µs per quarter)` changes in any order.
    /// Changes sharing a tick resolve to the last one given.
    pub fn new(timebase: Timebase, changes: impl IntoIterator<Item = (u64, u32)>) -> Self {
        let mut changes: Vec<(u64, u32)> = changes.into_iter().filter(|&(_, t)| t > 0).collect();
        changes.sort_by_key(|&(tick, _)| tick);

        let mut map = Self {
            timebase,
            segments: vec![TempoSegment {
                tick: 0,
                seconds: 0.0,
                tempo: DEFAULT_TEMPO,
            }],
        };
        for (tick, tempo) in changes {
            let seconds = map.ticks_to_seconds(tick);
            match map.segments.last_mut() {
                Some(last) if last.tick == tick => last.tempo = tempo,
                _ => map.segments.push(TempoSegment { tick, seconds, tempo }),
            }
        }
        map
    }

    pub fn constant(ticks_per_quarter: u16, tempo: u32) -> Self {
        Self::new(Timebase::Metrical { ticks_per_quarter }, [(0, tempo)])
    }

    pub fn timebase(&self) -> Timebase {
        self.timebase
    }

    /// Number of distinct tempo regions.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn ticks_to_seconds(&self, tick: u64) -> f64 {
        match self.timebase {
            Timebase::Timecode { ticks_per_second } => {
                if ticks_per_second > 0.0 {
                    tick as f64 / ticks_per_second
                } else {
                    0.0
                }
            }
            Timebase::Metrical { ticks_per_quarter } => {
                let seg = self.segment_for_tick(tick);
                seg.seconds + ticks_to_seconds(tick - seg.tick, ticks_per_quarter, seg.tempo)
            }
        }
    }

    pub fn seconds_to_ticks(&self, seconds: f64) -> u64 {
        match self.timebase {
            Timebase::Timecode { ticks_per_second } => {
                if seconds.is_finite() && seconds > 0.0 {
                    (seconds * ticks_per_second).round() as u64
                } else {
                    0
                }
            }
            Timebase::Metrical { ticks_per_quarter } => {
                let idx = self.segments.partition_point(|s| s.seconds <= seconds).saturating_sub(1);
                let seg = self.segments[idx];
                seg.tick + seconds_to_ticks(seconds - seg.seconds, ticks_per_quarter, seg.tempo)
            }
        }
    }

    fn segment_for_tick(&self, tick: u64) -> TempoSegment {
        let idx = self.segments.partition_point(|s| s.tick <= tick).saturating_sub(1);
        self.segments[idx]
    }
}

// ─── Decoding ───────────────────────────────────────────────────────────────

/// A parsed file with note events converted to seconds, still grouped per
/// track in file order. No pairing normalization has been applied.
#[derive(Debug, Clone)]
pub struct DecodedFile {
    pub timebase: Timebase,
    pub tempo_map: TempoMap,
    pub tracks: Vec<Vec<NoteEvent>>,
}

impl DecodedFile {
    /// All tracks merged and stable-sorted by time.
    pub fn into_events(self) -> Vec<NoteEvent> {
        let mut events: Vec<NoteEvent> = self.tracks.into_iter().flatten().collect();
        events.sort_by(|a, b| a.time().total_cmp(&b.time()));
        events
    }
}

/// One track's events at absolute ticks. A message midly cannot read is
/// dropped and the walk resumes right after it.
fn read_track<'a>(raw: &'a [u8], track: usize) -> Vec<(u64, TrackEventKind<'a>)> {
    let mut events = Vec::new();
    let mut tick: u64 = 0;
    let mut iter = EventIter::new(raw);
    loop {
        let before = iter.unread();
        let running_status = iter.running_status();
        match iter.next() {
            Some(Ok(event)) => {
                tick += event.delta.as_int() as u64;
                events.push((tick, event.kind));
            }
            None if before.is_empty() => break,
            _ => {
                let (delta, rest) = read_varlen(before);
                tick += delta;
                let Some(&status) = rest.first() else {
                    break;
                };
                let skip = malformed_len(rest, running_status);
                warn!(
                    "Track {}: skipped malformed event (status 0x{:02X}) at tick {}",
                    track, status, tick
                );
                iter = EventIter::new(&rest[skip..]);
                *iter.running_status_mut() = running_status;
            }
        }
    }
    events
}

/// Variable-length quantity at the head of `raw`, at most four bytes.
fn read_varlen(raw: &[u8]) -> (u64, &[u8]) {
    let mut value: u64 = 0;
    for (i, &byte) in raw.iter().take(4).enumerate() {
        value = (value << 7) | (byte & 0x7F) as u64;
        if byte & 0x80 == 0 {
            return (value, &raw[i + 1..]);
        }
    }
    (value, &raw[raw.len().min(4)..])
}

/// Bytes taken by the unreadable message at the head of `rest`: its status
/// plus the data bytes that status is known to carry. Always at least one.
fn malformed_len(rest: &[u8], running_status: Option<u8>) -> usize {
    let (status, data) = match rest[0] {
        byte if byte >= 0x80 => (byte, &rest[1..]),
        _ => match running_status {
            Some(status) => (status, rest),
            None => return 1,
        },
    };
    let header = rest.len() - data.len();
    let len = match status {
        0xF0 | 0xF7 => {
            let (len, body) = read_varlen(data);
            return (rest.len() - body.len()).saturating_add(len as usize).min(rest.len()).max(1);
        }
        0xFF => {
            let (len, body) = read_varlen(data.get(1..).unwrap_or_default());
            return (rest.len() - body.len()).saturating_add(len as usize).min(rest.len()).max(1);
        }
        0xC0..=0xDF | 0xF1 | 0xF3 => 1,
        0x80..=0xBF | 0xE0..=0xEF | 0xF2 => 2,
        _ => 0,
    };
    (header + len.min(data.len())).max(1)
}

/// Parses SMF bytes. Unknown messages are ignored, malformed ones skipped;
/// NoteOn with velocity 0 is read as NoteOff.
pub fn decode_tracks(bytes: &[u8]) -> Result<DecodedFile> {
    let (header, chunks) = midly::parse(bytes).map_err(|e| PracticeError::FileFormat(e.to_string()))?;
    let timebase = Timebase::from_timing(header.timing);

    let mut raw_tracks = Vec::new();
    for (i, chunk) in chunks.enumerate() {
        match chunk {
            Ok(events) => raw_tracks.push(read_track(events.unread(), i)),
            Err(e) => warn!("Track {}: unreadable chunk skipped: {}", i, e),
        }
    }

    let mut tempo_changes = Vec::new();
    for track in &raw_tracks {
        for &(tick, kind) in track {
            if let TrackEventKind::Meta(MetaMessage::Tempo(t)) = kind {
                tempo_changes.push((tick, t.as_int()));
            }
        }
    }
    let tempo_map = TempoMap::new(timebase, tempo_changes);

    let mut tracks = Vec::with_capacity(raw_tracks.len());
    for track in &raw_tracks {
        let mut notes = Vec::new();
        for &(tick, kind) in track {
            let TrackEventKind::Midi { message, .. } = kind else {
                continue;
            };
            let seconds = tempo_map.ticks_to_seconds(tick);
            match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                    notes.push(NoteEvent::on(key.as_int(), vel.as_int(), seconds));
                }
                MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                    notes.push(NoteEvent::off(key.as_int(), seconds));
                }
                _ => {}
            }
        }
        tracks.push(notes);
    }

    debug!(
        "Decoded {} tracks, {:?}, {} tempo segments",
        tracks.len(),
        timebase,
        tempo_map.segment_count()
    );
    Ok(DecodedFile {
        timebase,
        tempo_map,
        tracks,
    })
}

/// Parses SMF bytes into one time-ordered event list.
pub fn decode(bytes: &[u8]) -> Result<Vec<NoteEvent>> {
    Ok(decode_tracks(bytes)?.into_events())
}

// ─── Encoding ───────────────────────────────────────────────────────────────

/// Writes `events` as a format-0 SMF at a constant tempo.
pub fn encode(events: &[NoteEvent], ticks_per_quarter: u16, tempo: u32) -> Result<Vec<u8>> {
    if ticks_per_quarter == 0 || ticks_per_quarter > MAX_TICKS_PER_QUARTER {
        return Err(PracticeError::FileFormat(format!(
            "ticks per quarter out of range: {}",
            ticks_per_quarter
        )));
    }
    if tempo == 0 || tempo > MAX_TEMPO {
        return Err(PracticeError::FileFormat(format!("tempo out of range: {}", tempo)));
    }

    let mut ordered = events.to_vec();
    ordered.sort_by(|a, b| a.time().total_cmp(&b.time()));

    let channel = u4::new(0);
    let mut track: Vec<TrackEvent> = Vec::with_capacity(ordered.len() + 2);
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo))),
    });

    let mut emitted: u64 = 0;
    for e in &ordered {
        let at = seconds_to_ticks(e.time(), ticks_per_quarter, tempo);
        let delta = at.saturating_sub(emitted).min(MAX_DELTA);
        emitted += delta;
        let key = u7::new(e.pitch());
        let message = match e.kind() {
            // velocity 0 would read back as a release
            NoteKind::On => MidiMessage::NoteOn {
                key,
                vel: u7::new(e.velocity().max(1)),
            },
            NoteKind::Off => MidiMessage::NoteOff { key, vel: u7::new(0) },
        };
        track.push(TrackEvent {
            delta: u28::new(delta as u32),
            kind: TrackEventKind::Midi { channel, message },
        });
    }
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let smf = Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Metrical(u15::new(ticks_per_quarter)),
        },
        tracks: vec![track],
    };
    let mut bytes = Vec::new();
    smf.write_std(&mut bytes)
        .map_err(|e| PracticeError::FileFormat(format!("encode failed: {}", e)))?;
    Ok(bytes)
}

/// Encodes and writes `events` to `path`.
pub fn save(path: &Path, events: &[NoteEvent], ticks_per_quarter: u16, tempo: u32) -> Result<()> {
    let bytes = encode(events, ticks_per_quarter, tempo)?;
    std::fs::write(path, &bytes).map_err(|e| PracticeError::io(path, e))?;
    info!("Saved {} events to {:?} ({} bytes)", events.len(), path, bytes.len());
    Ok(())
}
