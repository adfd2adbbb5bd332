use crate::types::*;
use log::debug;
use std::time::Instant;

/// Outcome of a start/resume request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStart {
    /// Started from Stopped: the caller resets the score.
    FromBeginning,
    /// Continued from Paused: elapsed time picks up where it froze.
    Resumed,
    /// Already running; nothing changed.
    Ignored,
}

/// Origin/pause state machine behind playback.
///
/// Elapsed time is `now - origin` while running and `pause - origin` while
/// paused. Resuming shifts the origin forward by the paused span, so
/// elapsed time is continuous across pause/resume.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    state: PlaybackState,
    mode: PlaybackMode,
    origin: Instant,
    paused_at: Option<Instant>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Stopped,
            mode: PlaybackMode::Practice,
            origin: Instant::now(),
            paused_at: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, PlaybackState::Playing | PlaybackState::Previewing)
    }

    /// Stopped → running from zero; Paused → running where it paused.
    pub fn start(&mut self, now: Instant, mode: PlaybackMode) -> ClockStart {
        match self.state {
            PlaybackState::Stopped => {
                self.origin = now;
                self.paused_at = None;
                self.mode = mode;
                self.state = mode.running_state();
                ClockStart::FromBeginning
            }
            PlaybackState::Paused => {
                self.mode = mode;
                self.resume(now)
            }
            PlaybackState::Playing | PlaybackState::Previewing => {
                debug!("Clock start ignored: already {}", self.state);
                ClockStart::Ignored
            }
        }
    }

    pub fn pause(&mut self, now: Instant) -> bool {
        if !self.is_running() {
            debug!("Clock pause ignored: {}", self.state);
            return false;
        }
        self.paused_at = Some(now);
        self.state = PlaybackState::Paused;
        true
    }

    pub fn resume(&mut self, now: Instant) -> ClockStart {
        match (self.state, self.paused_at) {
            (PlaybackState::Paused, Some(paused)) => {
                self.origin += now.saturating_duration_since(paused);
                self.paused_at = None;
                self.state = self.mode.running_state();
                ClockStart::Resumed
            }
            _ => {
                debug!("Clock resume ignored: {}", self.state);
                ClockStart::Ignored
            }
        }
    }

    /// Always lands in Stopped. Returns whether it was doing anything.
    pub fn stop(&mut self) -> bool {
        let was_active = self.state != PlaybackState::Stopped;
        self.state = PlaybackState::Stopped;
        self.paused_at = None;
        was_active
    }

    /// Seconds since the timeline origin, `None` while stopped.
    pub fn elapsed(&self, now: Instant) -> Option<f64> {
        self.elapsed_at(now)
    }

    /// Elapsed time as it was at `instant` (an input's arrival time).
    pub fn elapsed_at(&self, instant: Instant) -> Option<f64> {
        let at = match self.state {
            PlaybackState::Stopped => return None,
            PlaybackState::Paused => self.paused_at.unwrap_or(instant),
            PlaybackState::Playing | PlaybackState::Previewing => instant,
        };
        Some(at.saturating_duration_since(self.origin).as_secs_f64())
    }

    /// Stops the clock once `elapsed` passes the tail grace after the last
    /// event. Returns true on the transition.
    pub fn check_completion(&mut self, now: Instant, last_event_time: f64) -> bool {
        if !self.is_running() {
            return false;
        }
        match self.elapsed(now) {
            Some(elapsed) if elapsed > last_event_time + TAIL_GRACE_SECS => {
                self.stop();
                true
            }
            _ => false,
        }
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}
