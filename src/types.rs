use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

// ─── Timeline events ────────────────────────────────────────────────────────

/// Whether a timeline event starts or ends a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    On,
    Off,
}

/// One note boundary on the practice timeline.
///
/// Immutable once built: fields are private and the constructors clamp
/// pitch and velocity to 7 bits and time to a finite, non-negative value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoteEvent {
    kind: NoteKind,
    pitch: u8,
    /// Always 0 for `NoteKind::Off`.
    velocity: u8,
    /// Seconds from the timeline origin.
    time: f64,
}

impl NoteEvent {
    pub fn new(kind: NoteKind, pitch: u8, velocity: u8, time: f64) -> Self {
        let velocity = match kind {
            NoteKind::On => velocity.min(127),
            NoteKind::Off => 0,
        };
        Self {
            kind,
            pitch: pitch.min(127),
            velocity,
            time: clamp_time(time),
        }
    }

    pub fn on(pitch: u8, velocity: u8, time: f64) -> Self {
        Self::new(NoteKind::On, pitch, velocity, time)
    }

    pub fn off(pitch: u8, time: f64) -> Self {
        Self::new(NoteKind::Off, pitch, 0, time)
    }

    pub fn kind(&self) -> NoteKind {
        self.kind
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn is_on(&self) -> bool {
        self.kind == NoteKind::On
    }

    /// Same event moved by `secs` (used when splicing generated segments).
    pub fn shifted(&self, secs: f64) -> Self {
        Self::new(self.kind, self.pitch, self.velocity, self.time + secs)
    }
}

fn clamp_time(time: f64) -> f64 {
    if time.is_finite() {
        time.max(0.0)
    } else {
        0.0
    }
}

impl fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NoteKind::On => write!(
                f,
                "{:>9.3}s  ON   {:<4} vel={}",
                self.time,
                pitch_name(self.pitch),
                self.velocity
            ),
            NoteKind::Off => write!(f, "{:>9.3}s  OFF  {}", self.time, pitch_name(self.pitch)),
        }
    }
}

// ─── Playback state ─────────────────────────────────────────────────────────

/// `Previewing` runs the clock like `Playing` but forwards timeline notes to
/// the sinks and never scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
    Previewing,
}

/// How a running clock treats the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackMode {
    /// Learner plays, input is scored.
    Practice,
    /// Timeline is played back to the sinks.
    Preview,
}

impl PlaybackMode {
    pub fn running_state(self) -> PlaybackState {
        match self {
            PlaybackMode::Practice => PlaybackState::Playing,
            PlaybackMode::Preview => PlaybackState::Previewing,
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Previewing => "previewing",
        };
        f.write_str(s)
    }
}

// ─── Inter-thread messages ──────────────────────────────────────────────────

/// A key press or release from a live source, stamped on arrival.
#[derive(Debug, Clone, Copy)]
pub struct LiveNote {
    pub pitch: u8,
    pub velocity: u8,
    pub on: bool,
    pub arrival: Instant,
}

impl LiveNote {
    pub fn press(pitch: u8, velocity: u8, arrival: Instant) -> Self {
        Self {
            pitch: pitch.min(127),
            velocity: velocity.min(127),
            on: true,
            arrival,
        }
    }

    pub fn release(pitch: u8, arrival: Instant) -> Self {
        Self {
            pitch: pitch.min(127),
            velocity: 0,
            on: false,
            arrival,
        }
    }
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Note(LiveNote),
}

/// Who caused a highlighted key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NoteOrigin {
    Live,
    Preview,
    Generator,
}

/// Notifications for display collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum PracticeUpdate {
    TimelineLoaded { source: String, notes: u32, duration: f64 },
    PlaybackState { state: PlaybackState },
    Position { elapsed: f64, duration: f64 },
    /// Expected pitches inside the display span, ascending.
    ExpectedChanged { expected: Vec<u8> },
    PitchPressed { pitch: u8, velocity: u8, origin: NoteOrigin },
    PitchReleased { pitch: u8, origin: NoteOrigin },
    Score { score: u32, max_score: u32, percentage: f64 },
    Completed { score: u32, max_score: u32, percentage: f64 },
    RecordingStarted,
    RecordingStopped { notes: usize },
    QuizQuestion { text: String },
    QuizAnswer { text: String },
    QuizNote { pitch: u8, correct: bool },
    Ambient { description: String },
    Error { message: String },
}

// ─── Constants ──────────────────────────────────────────────────────────────

/// Playback completes this long after the last timeline event.
pub const TAIL_GRACE_SECS: f64 = 2.0;
/// Notes still open at end of track are closed this long after onset.
pub const ORPHAN_CLOSE_SECS: f64 = 2.0;
/// Microseconds per quarter note until a file sets its own tempo (120 BPM).
pub const DEFAULT_TEMPO: u32 = 500_000;
pub const NOTE_COUNT: usize = 128;

pub const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Scientific pitch name, MIDI 60 = "C4".
pub fn pitch_name(pitch: u8) -> String {
    let octave = pitch as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[pitch as usize % 12], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_event_clamps_fields() {
        let e = NoteEvent::on(200, 255, -3.0);
        assert_eq!(e.pitch(), 127);
        assert_eq!(e.velocity(), 127);
        assert_eq!(e.time(), 0.0);

        let nan = NoteEvent::off(60, f64::NAN);
        assert_eq!(nan.time(), 0.0);
        assert_eq!(nan.velocity(), 0);
    }

    #[test]
    fn test_off_velocity_is_zero() {
        let e = NoteEvent::new(NoteKind::Off, 64, 90, 1.5);
        assert_eq!(e.velocity(), 0);
        assert!(!e.is_on());
    }

    #[test]
    fn test_pitch_names() {
        assert_eq!(pitch_name(60), "C4");
        assert_eq!(pitch_name(21), "A0");
        assert_eq!(pitch_name(127), "G9");
    }

    #[test]
    fn test_update_serializes_with_type_tag() {
        let u = PracticeUpdate::QuizNote { pitch: 60, correct: true };
        let json = serde_json::to_string(&u).unwrap();
        assert!(json.contains("\"type\":\"QuizNote\""));
        assert!(json.contains("\"pitch\":60"));
    }
}
