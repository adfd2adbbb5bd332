use crate::types::PlaybackState;
use log::trace;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreState {
    pub score: u32,
    pub max_score: u32,
}

impl ScoreState {
    /// 100·score/max rounded to one decimal; 0 with nothing to score.
    pub fn percentage(&self) -> f64 {
        if self.max_score == 0 {
            return 0.0;
        }
        let pct = 100.0 * self.score as f64 / self.max_score as f64;
        (pct * 10.0).round() / 10.0
    }
}

/// Counts live presses that land on an expected pitch during practice.
///
/// Repeated presses of the same expected pitch each count; the score is
/// capped at `max_score`.
#[derive(Debug, Default)]
pub struct ScoringEngine {
    state: ScoreState,
}

impl ScoringEngine {
    pub fn new(max_score: u32) -> Self {
        Self {
            state: ScoreState { score: 0, max_score },
        }
    }

    pub fn state(&self) -> ScoreState {
        self.state
    }

    pub fn percentage(&self) -> f64 {
        self.state.percentage()
    }

    /// Returns true when the press was counted.
    pub fn on_live_note_on(&mut self, pitch: u8, playback: PlaybackState, expected: &BTreeSet<u8>) -> bool {
        if playback != PlaybackState::Playing || !expected.contains(&pitch) {
            return false;
        }
        if self.state.score >= self.state.max_score {
            trace!("Score already at max ({}), press on {} not counted", self.state.max_score, pitch);
            return false;
        }
        self.state.score += 1;
        true
    }

    /// Zero the score, keeping the max.
    pub fn reset(&mut self) {
        self.state.score = 0;
    }

    /// New timeline: zero the score and adopt its max.
    pub fn reset_for(&mut self, max_score: u32) {
        self.state = ScoreState { score: 0, max_score };
    }
}
