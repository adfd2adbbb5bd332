//! Procedural ambient player.
//!
//! The generator only plans: each [`AmbientStep`] lists the notes to sound,
//! how long the layers ring and when the next step is due. The session
//! turns those plans into sink commands through its task queue, so a
//! stopped or superseded ambient run can never reach the sinks.

use crate::rng::Rng;
use crate::theory::{Structure, SCALE_NAMES};
use chrono::{Datelike, Local, Timelike};
use log::{debug, info};
use std::fmt;
use std::str::FromStr;

const BASE_OCTAVE: i32 = 36;
const BASE_VELOCITY: u8 = 80;
const CHORD_VELOCITY: u8 = BASE_VELOCITY - 40;
const IMPROV_VELOCITY: u8 = BASE_VELOCITY - 10;
const ACCOMP_VELOCITY: u8 = BASE_VELOCITY - 50;
/// Improvised notes ring this long regardless of the layer hold.
pub const IMPROV_HOLD_SECS: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbientStyle {
    /// Chords, improvisation and accompaniment.
    Mixed,
    OnlyImpro,
    OnlyChords,
}

impl AmbientStyle {
    fn has_chords(self) -> bool {
        matches!(self, AmbientStyle::Mixed | AmbientStyle::OnlyChords)
    }

    fn has_improv(self) -> bool {
        matches!(self, AmbientStyle::Mixed | AmbientStyle::OnlyImpro)
    }

    /// Milliseconds between steps before mood and drift.
    fn base_interval_ms(self) -> f64 {
        match self {
            AmbientStyle::OnlyImpro => 1000.0,
            _ => 2000.0,
        }
    }
}

impl FromStr for AmbientStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "mixed" | "" => Ok(AmbientStyle::Mixed),
            "impro" | "onlyimpro" => Ok(AmbientStyle::OnlyImpro),
            "chords" | "onlychords" => Ok(AmbientStyle::OnlyChords),
            other => Err(format!("unknown ambient style: {}", other)),
        }
    }
}

impl fmt::Display for AmbientStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AmbientStyle::Mixed => "Mixed",
            AmbientStyle::OnlyImpro => "Only Impro",
            AmbientStyle::OnlyChords => "Only Chords",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    /// Slower in the colder months.
    pub fn tempo_modifier(self) -> f64 {
        match self {
            Season::Spring => 0.9,
            Season::Summer => 1.0,
            Season::Autumn => 1.2,
            Season::Winter => 1.5,
        }
    }
}

/// Time-of-year and time-of-day context that sets the pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbientMood {
    pub season: Season,
    pub hour: u32,
}

impl AmbientMood {
    pub fn new(month: u32, hour: u32) -> Self {
        Self {
            season: Season::from_month(month),
            hour: hour % 24,
        }
    }

    pub fn now() -> Self {
        let now = Local::now();
        Self::new(now.month(), now.hour())
    }

    pub fn hour_modifier(&self) -> f64 {
        match self.hour {
            6..=11 => 0.8,
            12..=17 => 1.0,
            18..=21 => 1.2,
            _ => 1.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TempoDirection {
    Increasing,
    Decreasing,
}

/// A note to sound `offset` seconds into a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedNote {
    pub offset: f64,
    pub pitch: u8,
    pub velocity: u8,
    /// Seconds the note rings before its release.
    pub hold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientStep {
    /// Structure name, e.g. "F# Dorian".
    pub description: String,
    pub notes: Vec<PlannedNote>,
    /// Seconds until the next step is due.
    pub next_in: f64,
    /// This step opened a new partiture (new scale).
    pub new_partiture: bool,
}

pub struct AmbientGenerator {
    style: AmbientStyle,
    mood: AmbientMood,
    rng: Rng,
    scale: usize,
    /// Seconds of planned steps since the partiture began.
    partiture_clock: f64,
    partiture_length: f64,
    sequence_count: u32,
    max_repeats: u32,
    direction: TempoDirection,
    structure: Option<Structure>,
}

impl AmbientGenerator {
    pub fn new(style: AmbientStyle, mood: AmbientMood, mut rng: Rng) -> Self {
        let scale = rng.index(SCALE_NAMES.len());
        let partiture_length = rng.uniform(60.0, 300.0);
        let max_repeats = rng.rand_range(2..5) as u32;
        let direction = random_direction(&mut rng);
        info!(
            "Ambient {} mode: {:?}, hour {}, scale {}",
            style, mood.season, mood.hour, SCALE_NAMES[scale]
        );
        Self {
            style,
            mood,
            rng,
            scale,
            partiture_clock: 0.0,
            partiture_length,
            sequence_count: 0,
            max_repeats,
            direction,
            structure: None,
        }
    }

    pub fn style(&self) -> AmbientStyle {
        self.style
    }

    pub fn scale_name(&self) -> &'static str {
        SCALE_NAMES[self.scale]
    }

    /// Plan the next step and advance the generator.
    pub fn next_step(&mut self) -> AmbientStep {
        let mut new_partiture = false;
        if self.partiture_clock >= self.partiture_length {
            self.scale = self.rng.index(SCALE_NAMES.len());
            self.partiture_clock = 0.0;
            self.partiture_length = self.rng.uniform(60.0, 300.0);
            self.sequence_count = 0;
            self.max_repeats = self.rng.rand_range(2..5) as u32;
            self.direction = random_direction(&mut self.rng);
            new_partiture = true;
            info!("New partiture in {}", self.scale_name());
        }

        let structure = match self.structure.take() {
            Some(s) if self.sequence_count > 0 && self.sequence_count < self.max_repeats => s,
            _ => {
                self.sequence_count = 0;
                self.max_repeats = self.rng.rand_range(2..5) as u32;
                self.direction = random_direction(&mut self.rng);
                self.random_structure()
            }
        };

        let layer_hold = if self.style.has_chords() {
            self.rng.uniform(3.0, 6.0)
        } else {
            self.rng.uniform(1.5, 3.0)
        };

        let mut notes = Vec::new();
        let base: Vec<i32> = structure.notes.iter().map(|&n| n as i32).collect();

        if self.style.has_chords() {
            let shift = if self.rng.chance(0.5) { 12 } else { 0 };
            for n in &base {
                push_unique(&mut notes, 0.0, n + BASE_OCTAVE + shift, CHORD_VELOCITY, layer_hold);
            }
        }

        if self.style.has_improv() {
            let spacing = self.rng.uniform(0.3, 0.8);
            let mut improv: Vec<i32> = Vec::new();
            for _ in 0..self.rng.rand_range(3..7) {
                let root = base[self.rng.index(base.len())];
                let shift = [-12, 0, 12, 24][self.rng.index(4)];
                let pitch = root + shift + BASE_OCTAVE + 24;
                if !improv.contains(&pitch) {
                    improv.push(pitch);
                }
            }
            for (i, pitch) in improv.into_iter().enumerate() {
                notes.push(planned(i as f64 * spacing, pitch, IMPROV_VELOCITY, IMPROV_HOLD_SECS));
            }
        }

        if self.style == AmbientStyle::Mixed {
            push_unique(&mut notes, 0.0, base[0] - 12 + BASE_OCTAVE, ACCOMP_VELOCITY, layer_hold);
            if base.len() > 1 && self.rng.chance(0.5) {
                push_unique(&mut notes, 0.0, base[1] - 12 + BASE_OCTAVE, ACCOMP_VELOCITY, layer_hold);
            }
        }

        self.sequence_count += 1;
        let next_in = self.next_interval_ms() / 1000.0;
        self.partiture_clock += next_in;

        let description = structure.answer();
        debug!(
            "Ambient step {}/{}: {} ({} notes, next in {:.2}s)",
            self.sequence_count,
            self.max_repeats,
            description,
            notes.len(),
            next_in
        );
        self.structure = Some(structure);

        AmbientStep {
            description,
            notes,
            next_in,
            new_partiture,
        }
    }

    fn random_structure(&mut self) -> Structure {
        if self.rng.chance(0.5) {
            Structure::random_chord_in(self.scale, &mut self.rng)
        } else {
            Structure::random_mode_in(self.scale, &mut self.rng)
        }
    }

    fn next_interval_ms(&mut self) -> f64 {
        let drift = self.sequence_count as f64 / self.max_repeats.max(1) as f64 * 0.4;
        let base = self.style.base_interval_ms();
        let adjusted = match self.direction {
            TempoDirection::Increasing => base * (1.0 - drift),
            TempoDirection::Decreasing => base * (1.0 + drift),
        };
        adjusted * self.mood.season.tempo_modifier() * self.mood.hour_modifier() * self.rng.uniform(0.8, 1.2)
    }
}

fn random_direction(rng: &mut Rng) -> TempoDirection {
    if rng.chance(0.5) {
        TempoDirection::Increasing
    } else {
        TempoDirection::Decreasing
    }
}

fn planned(offset: f64, pitch: i32, velocity: u8, hold: f64) -> PlannedNote {
    PlannedNote {
        offset,
        pitch: pitch.clamp(0, 127) as u8,
        velocity,
        hold,
    }
}

/// Simultaneous layer notes share one key; the first layer wins.
fn push_unique(notes: &mut Vec<PlannedNote>, offset: f64, pitch: i32, velocity: u8, hold: f64) {
    let note = planned(offset, pitch, velocity, hold);
    if !notes.iter().any(|n| n.offset == offset && n.pitch == note.pitch) {
        notes.push(note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(style: AmbientStyle) -> AmbientGenerator {
        AmbientGenerator::new(style, AmbientMood::new(7, 14), Rng::new_with_seed(42))
    }

    #[test]
    fn test_seasons_and_hours() {
        assert_eq!(Season::from_month(4), Season::Spring);
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(AmbientMood::new(10, 7).hour_modifier(), 0.8);
        assert_eq!(AmbientMood::new(10, 19).hour_modifier(), 1.2);
        assert_eq!(AmbientMood::new(10, 23).hour_modifier(), 1.4);
        assert_eq!(AmbientMood::new(10, 3).season.tempo_modifier(), 1.2);
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!("only-impro".parse::<AmbientStyle>(), Ok(AmbientStyle::OnlyImpro));
        assert_eq!("Chords".parse::<AmbientStyle>(), Ok(AmbientStyle::OnlyChords));
        assert!("polka".parse::<AmbientStyle>().is_err());
    }

    #[test]
    fn test_only_chords_has_quiet_simultaneous_layer() {
        let mut g = generator(AmbientStyle::OnlyChords);
        let step = g.next_step();
        assert!(!step.notes.is_empty());
        assert!(step.notes.iter().all(|n| n.offset == 0.0 && n.velocity == CHORD_VELOCITY));
        assert!(step.notes.iter().all(|n| (3.0..6.0).contains(&n.hold)));
    }

    #[test]
    fn test_only_impro_notes_are_spaced_and_short() {
        let mut g = generator(AmbientStyle::OnlyImpro);
        let step = g.next_step();
        assert!((1..=6).contains(&step.notes.len()));
        for (i, n) in step.notes.iter().enumerate() {
            assert_eq!(n.velocity, IMPROV_VELOCITY);
            assert_eq!(n.hold, IMPROV_HOLD_SECS);
            if i > 0 {
                assert!(n.offset > step.notes[i - 1].offset);
            }
        }
    }

    #[test]
    fn test_interval_follows_mood() {
        // summer afternoon: base 2000 ms, drift at most 40 %, jitter 0.8–1.2
        let mut g = generator(AmbientStyle::Mixed);
        for _ in 0..20 {
            let step = g.next_step();
            assert!(step.next_in >= 2.0 * 0.6 * 0.8 && step.next_in <= 2.0 * 1.4 * 1.2, "{}", step.next_in);
        }
    }

    #[test]
    fn test_structure_repeats_before_changing() {
        let mut g = generator(AmbientStyle::OnlyChords);
        let first = g.next_step().description;
        let second = g.next_step().description;
        // max_repeats is at least 2, so the second step reuses the structure
        assert_eq!(first, second);
    }

    #[test]
    fn test_partiture_rolls_over() {
        let mut g = generator(AmbientStyle::OnlyImpro);
        let mut elapsed = 0.0;
        let mut rolled = false;
        while elapsed < 400.0 {
            let step = g.next_step();
            rolled |= step.new_partiture;
            elapsed += step.next_in;
        }
        assert!(rolled);
    }
}
