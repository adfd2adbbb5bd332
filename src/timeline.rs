use crate::types::{NoteEvent, NoteKind};

/// Time-ordered note events plus the achievable score.
///
/// Events are sorted ascending by time with ties kept in insertion order.
/// A timeline is never edited in place; the session swaps whole values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    events: Vec<NoteEvent>,
    max_score: u32,
}

impl Timeline {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Stable-sorts `events` by time.
    pub fn from_events(mut events: Vec<NoteEvent>) -> Self {
        events.sort_by(|a, b| a.time().total_cmp(&b.time()));
        let max_score = events.iter().filter(|e| e.kind() == NoteKind::On).count() as u32;
        Self { events, max_score }
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NoteEvent> {
        self.events.iter()
    }

    /// Number of NoteOn events.
    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn last_event_time(&self) -> f64 {
        self.events.last().map(|e| e.time()).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Copy of this timeline moved later by `secs`.
    pub fn offset(&self, secs: f64) -> Self {
        Self::from_events(self.events.iter().map(|e| e.shifted(secs)).collect())
    }

    /// Plays `parts` back to back; each starts at the previous part's start
    /// plus its length.
    pub fn concat(parts: &[(Timeline, f64)]) -> Self {
        let mut events = Vec::new();
        let mut start = 0.0;
        for (part, length) in parts {
            events.extend(part.iter().map(|e| e.shifted(start)));
            start += length.max(0.0);
        }
        Self::from_events(events)
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a NoteEvent;
    type IntoIter = std::slice::Iter<'a, NoteEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
