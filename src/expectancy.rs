use crate::timeline::Timeline;
use crate::types::*;
use std::collections::{BTreeMap, BTreeSet};

/// Pitches sounding at `elapsed`, with the velocity of the NoteOn that
/// started each one.
///
/// A NoteOn at `t_on` is active when `t_on <= elapsed` and the nearest
/// following NoteOff for that pitch (in sequence order) is later than
/// `elapsed`, or does not exist. Scanning the prefix of events with
/// `time <= elapsed` gives exactly that: any NoteOff inside the prefix has
/// already happened, any NoteOff after it has not.
pub fn active_voices(timeline: &Timeline, elapsed: f64) -> BTreeMap<u8, u8> {
    let events = timeline.events();
    let end = events.partition_point(|e| e.time() <= elapsed);

    let mut sounding: [Option<u8>; NOTE_COUNT] = [None; NOTE_COUNT];
    for e in &events[..end] {
        sounding[e.pitch() as usize] = match e.kind() {
            NoteKind::On => Some(e.velocity()),
            NoteKind::Off => None,
        };
    }

    sounding
        .iter()
        .enumerate()
        .filter_map(|(pitch, vel)| vel.map(|v| (pitch as u8, v)))
        .collect()
}

/// Expected pitch set at `elapsed`. Drives preview audio, highlighting and scoring.
pub fn active_notes(timeline: &Timeline, elapsed: f64) -> BTreeSet<u8> {
    active_voices(timeline, elapsed).into_keys().collect()
}

/// Difference between two consecutive expectancy evaluations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpectedChange {
    /// (pitch, velocity) pairs that became active.
    pub added: Vec<(u8, u8)>,
    pub removed: Vec<u8>,
}

impl ExpectedChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Remembers the last expected set so each tick only reports what changed.
#[derive(Debug, Default)]
pub struct ExpectancyWindow {
    current: BTreeMap<u8, u8>,
}

impl ExpectancyWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, timeline: &Timeline, elapsed: f64) -> ExpectedChange {
        self.replace(active_voices(timeline, elapsed))
    }

    /// Forget everything; the returned change lists every pitch that was set.
    pub fn clear(&mut self) -> ExpectedChange {
        self.replace(BTreeMap::new())
    }

    /// Install an arbitrary expected set (quiz rounds use this).
    pub fn replace(&mut self, next: BTreeMap<u8, u8>) -> ExpectedChange {
        let removed = self
            .current
            .keys()
            .filter(|p| !next.contains_key(p))
            .copied()
            .collect();
        let added = next
            .iter()
            .filter(|(p, _)| !self.current.contains_key(p))
            .map(|(&p, &v)| (p, v))
            .collect();
        self.current = next;
        ExpectedChange { added, removed }
    }

    pub fn pitches(&self) -> BTreeSet<u8> {
        self.current.keys().copied().collect()
    }

    pub fn contains(&self, pitch: u8) -> bool {
        self.current.contains_key(&pitch)
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}
