//! Timeline generators: a segment-based song sketcher and a
//! lyrics-to-melody mapper. Both hand back plain [`Timeline`]s that load
//! through the same path as a MIDI file.

use crate::rng::Rng;
use crate::theory::Structure;
use crate::timeline::Timeline;
use crate::types::NoteEvent;
use log::{debug, info};
use std::fmt;
use std::str::FromStr;

const SEGMENT_BASE_OCTAVE: u8 = 36;
const SEGMENT_VELOCITY: u8 = 60;
const NOTE_LENGTHS: [f64; 3] = [0.5, 1.0, 2.0];
const MAX_SEGMENT_NOTES: usize = 3;

// ─── Song segments ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Intro,
    Verse,
    Chorus,
    Outro,
}

/// How a segment's notes move between octaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStyle {
    Repetitive,
    Rising,
    Falling,
    Static,
    /// Rising, Falling or Static picked per note.
    Mixed,
}

impl SegmentStyle {
    fn octave_shift(self, index: usize, count: usize, rng: &mut Rng) -> u8 {
        let style = match self {
            SegmentStyle::Mixed => [SegmentStyle::Rising, SegmentStyle::Falling, SegmentStyle::Static][rng.index(3)],
            other => other,
        };
        match style {
            SegmentStyle::Rising => (index * 12) as u8,
            SegmentStyle::Falling => ((count - 1 - index) * 12) as u8,
            _ => 0,
        }
    }
}

impl FromStr for SegmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "intro" => Ok(SegmentKind::Intro),
            "verse" => Ok(SegmentKind::Verse),
            "chorus" => Ok(SegmentKind::Chorus),
            "outro" => Ok(SegmentKind::Outro),
            other => Err(format!("unknown segment kind: {}", other)),
        }
    }
}

impl FromStr for SegmentStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "repetitive" => Ok(SegmentStyle::Repetitive),
            "rising" => Ok(SegmentStyle::Rising),
            "falling" => Ok(SegmentStyle::Falling),
            "static" => Ok(SegmentStyle::Static),
            "mixed" => Ok(SegmentStyle::Mixed),
            other => Err(format!("unknown segment style: {}", other)),
        }
    }
}

/// Parameters of one song segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentParams {
    pub kind: SegmentKind,
    pub style: SegmentStyle,
    /// Segment length in seconds.
    pub duration: f64,
    /// Semitones above the base octave.
    pub position: u8,
}

/// A segment together with the notes generated for it.
#[derive(Debug, Clone)]
pub struct Segment {
    pub params: SegmentParams,
    pub structure: Structure,
    pub timeline: Timeline,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} - {:?} ({}s, Pos: +{}) {}",
            self.params.kind, self.params.style, self.params.duration, self.params.position, self.structure
        )
    }
}

/// Builds a song from segments in one scale.
pub struct SongComposer {
    scale: usize,
    segments: Vec<Segment>,
    rng: Rng,
}

impl SongComposer {
    pub fn new(scale: usize, rng: Rng) -> Self {
        Self {
            scale: scale % crate::theory::SCALE_NAMES.len(),
            segments: Vec::new(),
            rng,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn add_segment(&mut self, params: SegmentParams) -> &Segment {
        let segment = self.generate(params);
        info!("Added segment {}", segment);
        self.segments.push(segment);
        &self.segments[self.segments.len() - 1]
    }

    /// Regenerate segment `index` with new parameters. False if out of range.
    pub fn replace_segment(&mut self, index: usize, params: SegmentParams) -> bool {
        if index >= self.segments.len() {
            return false;
        }
        self.segments[index] = self.generate(params);
        true
    }

    pub fn remove_segment(&mut self, index: usize) -> Option<Segment> {
        (index < self.segments.len()).then(|| self.segments.remove(index))
    }

    /// Every segment back to back, each starting after the previous one's duration.
    pub fn song_timeline(&self) -> Timeline {
        let parts: Vec<(Timeline, f64)> = self
            .segments
            .iter()
            .map(|s| (s.timeline.clone(), s.params.duration))
            .collect();
        Timeline::concat(&parts)
    }

    fn generate(&mut self, params: SegmentParams) -> Segment {
        let structure = if self.rng.chance(0.5) {
            Structure::random_chord_in(self.scale, &mut self.rng)
        } else {
            Structure::random_mode_in(self.scale, &mut self.rng)
        };

        let mut available: Vec<u8> = structure
            .notes
            .iter()
            .map(|n| n.saturating_add(SEGMENT_BASE_OCTAVE).saturating_add(params.position))
            .collect();
        let count = available.len().min(MAX_SEGMENT_NOTES);
        let mut chosen = Vec::with_capacity(count);
        for _ in 0..count {
            let i = self.rng.index(available.len());
            chosen.push(available.swap_remove(i));
        }

        let mut events = Vec::new();
        for (i, pitch) in chosen.iter().enumerate() {
            let start = params.duration / count as f64 * i as f64;
            if start >= params.duration {
                break;
            }
            let length = NOTE_LENGTHS[self.rng.index(NOTE_LENGTHS.len())];
            let pitch = pitch.saturating_add(params.style.octave_shift(i, count, &mut self.rng)).min(127);
            events.push(NoteEvent::on(pitch, SEGMENT_VELOCITY, start));
            events.push(NoteEvent::off(pitch, start + length));
        }

        Segment {
            params,
            structure,
            timeline: Timeline::from_events(events),
        }
    }
}

// ─── Lyrics to melody ───────────────────────────────────────────────────────

const LYRICS_VELOCITY: u8 = 70;
const HARMONY_VELOCITY: u8 = 60;
const VOWELS: &str = "aeiou";
/// Filler words that only advance time.
const FILLERS: [&str; 2] = ["oo", "ooo"];
const FILLER_GAP_SECS: f64 = 0.5;

/// Letter → pitch, a = middle C.
pub fn letter_pitch(c: char) -> Option<u8> {
    let pitch = match c {
        'a' => 60,
        'b' => 62,
        'c' => 64,
        'd' => 65,
        'e' => 67,
        'f' => 69,
        'g' => 71,
        'h' => 72,
        'i' => 74,
        'j' => 76,
        'k' => 77,
        'l' => 79,
        'm' => 81,
        'n' => 83,
        'o' => 84,
        'p' => 86,
        'q' => 88,
        'r' => 89,
        's' => 91,
        't' => 93,
        'u' => 95,
        'v' => 96,
        'w' => 98,
        'x' => 100,
        'y' => 101,
        'z' => 103,
        _ => return None,
    };
    Some(pitch)
}

/// Rough syllables: a new one starts at each vowel that follows other letters.
pub fn syllables(word: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        if VOWELS.contains(c) && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// One note per syllable, pitched by its first letter and lengthened by
/// its size. Vowel syllables sometimes get a major third above.
pub fn lyrics_melody(text: &str, rng: &mut Rng) -> Timeline {
    let lowered = text.to_lowercase();
    let mut events = Vec::new();
    let mut time = 0.0;

    for word in lowered.split_whitespace() {
        if FILLERS.contains(&word) {
            time += FILLER_GAP_SECS;
            continue;
        }
        for syl in syllables(word) {
            let pitch = syl.chars().next().and_then(letter_pitch).unwrap_or(60);
            let length = NOTE_LENGTHS[rng.index(NOTE_LENGTHS.len())] * (1.0 + syl.chars().count() as f64 / 5.0);

            events.push(NoteEvent::on(pitch, LYRICS_VELOCITY, time));
            events.push(NoteEvent::off(pitch, time + length));

            if syl.chars().any(|c| VOWELS.contains(c)) && rng.chance(0.3) {
                let harmony = pitch.saturating_add(4).min(127);
                let start = time + length * 0.25;
                events.push(NoteEvent::on(harmony, HARMONY_VELOCITY, start));
                events.push(NoteEvent::off(harmony, start + length * 0.75));
            }

            time += length + rng.uniform(0.1, 0.3);
        }
    }

    debug!("Lyrics melody: {} events over {:.1}s", events.len(), time);
    Timeline::from_events(events)
}
