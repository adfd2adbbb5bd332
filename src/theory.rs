//! Jazz theory tables and the ear-training quiz.
//!
//! Structure notes are pitch offsets starting at the scale root (0–11),
//! stacked by the interval table. A quiz accepts each structure note in any
//! of four octaves (+36, +48, +60, +72) and is complete once every note
//! has been played in at least one of them.

use crate::rng::Rng;
use std::collections::BTreeSet;
use std::fmt;

pub const SCALE_NAMES: [&str; 12] = ["C", "C#", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];

/// Chord qualities with the semitone steps stacked on the root.
pub const CHORDS: [(&str, [u8; 3]); 12] = [
    ("maj7", [4, 3, 4]),
    ("min7", [3, 4, 3]),
    ("min7/b5", [3, 3, 4]),
    ("7", [4, 3, 3]),
    ("dim", [3, 3, 3]),
    ("aug", [4, 4, 2]),
    ("7/#11", [4, 2, 4]),
    ("maj7/#5", [4, 4, 3]),
    ("minM7", [3, 4, 4]),
    ("sus4/7", [5, 2, 3]),
    ("6", [4, 3, 2]),
    ("min6", [3, 4, 2]),
];

pub const MODES: [(&str, [u8; 7]); 7] = [
    ("Ionian", [2, 2, 1, 2, 2, 2, 1]),
    ("Dorian", [2, 1, 2, 2, 2, 1, 2]),
    ("Phrygian", [1, 2, 2, 2, 1, 2, 2]),
    ("Lydian", [2, 2, 2, 1, 2, 2, 1]),
    ("Mixolydian", [2, 2, 1, 2, 2, 1, 2]),
    ("Aeolian", [2, 1, 2, 2, 1, 2, 2]),
    ("Locrian", [1, 2, 2, 1, 2, 2, 2]),
];

/// Chord ids used for quizzes.
pub const BASIC_CHORDS: [usize; 7] = [0, 1, 3, 4, 5, 10, 11];

/// Octave placements accepted for each structure note.
pub const QUIZ_OCTAVES: [u8; 4] = [36, 48, 60, 72];

/// Offset at which a structure is sounded to the learner.
pub const SOUNDING_OFFSET: u8 = 36;

/// Root followed by each interval added cumulatively.
pub fn notes_for_scale(root: u8, intervals: &[u8]) -> Vec<u8> {
    let mut notes = Vec::with_capacity(intervals.len() + 1);
    let mut current = root;
    notes.push(current);
    for step in intervals {
        current = current.saturating_add(*step);
        notes.push(current);
    }
    notes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    Chord,
    Mode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    pub kind: StructureKind,
    /// Index into [`SCALE_NAMES`].
    pub scale: usize,
    pub name: &'static str,
    pub notes: Vec<u8>,
}

impl Structure {
    pub fn chord(scale: usize, chord_id: usize) -> Option<Self> {
        let (name, intervals) = *CHORDS.get(chord_id)?;
        if scale >= SCALE_NAMES.len() {
            return None;
        }
        Some(Self {
            kind: StructureKind::Chord,
            scale,
            name,
            notes: notes_for_scale(scale as u8, &intervals),
        })
    }

    pub fn mode(scale: usize, mode_id: usize) -> Option<Self> {
        let (name, intervals) = *MODES.get(mode_id)?;
        if scale >= SCALE_NAMES.len() {
            return None;
        }
        Some(Self {
            kind: StructureKind::Mode,
            scale,
            name,
            notes: notes_for_scale(scale as u8, &intervals),
        })
    }

    /// Random root with one of the basic chord qualities.
    pub fn random_chord(rng: &mut Rng) -> Self {
        let scale = rng.index(SCALE_NAMES.len());
        Self::random_chord_in(scale, rng)
    }

    pub fn random_chord_in(scale: usize, rng: &mut Rng) -> Self {
        let chord_id = BASIC_CHORDS[rng.index(BASIC_CHORDS.len())];
        Self::chord(scale, chord_id).unwrap_or_else(|| Self::fallback(StructureKind::Chord))
    }

    pub fn random_mode(rng: &mut Rng) -> Self {
        let scale = rng.index(SCALE_NAMES.len());
        Self::random_mode_in(scale, rng)
    }

    pub fn random_mode_in(scale: usize, rng: &mut Rng) -> Self {
        let mode_id = rng.index(MODES.len());
        Self::mode(scale, mode_id).unwrap_or_else(|| Self::fallback(StructureKind::Mode))
    }

    fn fallback(kind: StructureKind) -> Self {
        let (name, notes) = match kind {
            StructureKind::Chord => (CHORDS[0].0, notes_for_scale(0, &CHORDS[0].1)),
            StructureKind::Mode => (MODES[0].0, notes_for_scale(0, &MODES[0].1)),
        };
        Self { kind, scale: 0, name, notes }
    }

    pub fn scale_name(&self) -> &'static str {
        SCALE_NAMES[self.scale % SCALE_NAMES.len()]
    }

    /// Chords name themselves ("Ebmin7"); modes only give the root.
    pub fn question(&self) -> String {
        match self.kind {
            StructureKind::Chord => format!("{}{}", self.scale_name(), self.name),
            StructureKind::Mode => self.scale_name().to_string(),
        }
    }

    pub fn answer(&self) -> String {
        match self.kind {
            StructureKind::Chord => format!("{}{}", self.scale_name(), self.name),
            StructureKind::Mode => format!("{} {}", self.scale_name(), self.name),
        }
    }

    /// Pitches played to the learner when the round starts.
    pub fn sounding_notes(&self) -> Vec<u8> {
        self.notes
            .iter()
            .map(|n| n.saturating_add(SOUNDING_OFFSET).min(127))
            .collect()
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.answer())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPress {
    Correct { complete: bool },
    Wrong,
}

/// One quiz question and the progress towards answering it.
#[derive(Debug, Clone)]
pub struct QuizRound {
    structure: Structure,
    good: BTreeSet<u8>,
    /// One group per structure note: that note in every quiz octave.
    required: Vec<[u8; 4]>,
}

impl QuizRound {
    pub fn new(structure: Structure) -> Self {
        let required: Vec<[u8; 4]> = structure
            .notes
            .iter()
            .map(|&n| QUIZ_OCTAVES.map(|o| n.saturating_add(o).min(127)))
            .collect();
        let good = required.iter().flatten().copied().collect();
        Self {
            structure,
            good,
            required,
        }
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn good_notes(&self) -> &BTreeSet<u8> {
        &self.good
    }

    pub fn remaining(&self) -> usize {
        self.required.len()
    }

    pub fn is_complete(&self) -> bool {
        self.required.is_empty()
    }

    /// A good note clears every group that contains it.
    pub fn press(&mut self, pitch: u8) -> QuizPress {
        if !self.good.contains(&pitch) {
            return QuizPress::Wrong;
        }
        self.required.retain(|group| !group.contains(&pitch));
        QuizPress::Correct {
            complete: self.required.is_empty(),
        }
    }
}
