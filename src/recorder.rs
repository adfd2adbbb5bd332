use crate::types::*;
use log::{debug, info};
use std::time::Instant;

/// Captures live note events with times relative to the start of a take.
#[derive(Debug, Default)]
pub struct Recorder {
    origin: Option<Instant>,
    captured: Vec<NoteEvent>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.origin.is_some()
    }

    pub fn len(&self) -> usize {
        self.captured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captured.is_empty()
    }

    /// Begin a new take, discarding anything captured so far.
    pub fn start(&mut self, now: Instant) {
        self.captured.clear();
        self.origin = Some(now);
        info!("Recording started");
    }

    /// Append an event at `at`; ignored unless a take is running.
    pub fn capture(&mut self, kind: NoteKind, pitch: u8, velocity: u8, at: Instant) {
        if let Some(origin) = self.origin {
            let time = at.saturating_duration_since(origin).as_secs_f64();
            self.captured.push(NoteEvent::new(kind, pitch, velocity, time));
        }
    }

    pub fn capture_live(&mut self, note: &LiveNote) {
        let kind = if note.on { NoteKind::On } else { NoteKind::Off };
        self.capture(kind, note.pitch, note.velocity, note.arrival);
    }

    /// End the take and hand back its events, stable-sorted by time.
    /// Stopping when nothing is recording returns an empty take.
    pub fn stop(&mut self) -> Vec<NoteEvent> {
        if self.origin.take().is_none() {
            debug!("Recorder stop ignored: not recording");
            return Vec::new();
        }
        let mut take = std::mem::take(&mut self.captured);
        take.sort_by(|a, b| a.time().total_cmp(&b.time()));
        info!("Recording stopped: {} events", take.len());
        take
    }

    /// Drop any take in progress.
    pub fn discard(&mut self) {
        if self.origin.take().is_some() {
            debug!("Recording discarded ({} events)", self.captured.len());
        }
        self.captured.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_capture_relative_to_start() {
        let t0 = Instant::now();
        let mut rec = Recorder::new();
        rec.start(t0);
        rec.capture(NoteKind::On, 60, 100, t0 + Duration::from_millis(250));
        rec.capture(NoteKind::Off, 60, 0, t0 + Duration::from_millis(750));
        let take = rec.stop();
        assert_eq!(take.len(), 2);
        assert!((take[0].time() - 0.25).abs() < 1e-9);
        assert!((take[1].time() - 0.75).abs() < 1e-9);
        assert!(!rec.is_active());
    }

    #[test]
    fn test_inactive_capture_ignored() {
        let mut rec = Recorder::new();
        rec.capture(NoteKind::On, 60, 100, Instant::now());
        assert!(rec.is_empty());
        assert!(rec.stop().is_empty());
    }

    #[test]
    fn test_restart_clears_previous_take() {
        let t0 = Instant::now();
        let mut rec = Recorder::new();
        rec.start(t0);
        rec.capture(NoteKind::On, 60, 100, t0);
        rec.start(t0 + Duration::from_secs(1));
        assert!(rec.is_empty());
        rec.discard();
        assert!(!rec.is_active());
    }

    #[test]
    fn test_capture_before_origin_clamps_to_zero() {
        let t0 = Instant::now();
        let mut rec = Recorder::new();
        rec.start(t0 + Duration::from_millis(100));
        rec.capture(NoteKind::On, 64, 80, t0);
        assert_eq!(rec.stop()[0].time(), 0.0);
    }
}
