use crate::ports::{all_notes_off, send_to_all, SharedSink};
use crate::types::*;
use log::{debug, error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Longest single sleep, bounding how late a cancel is noticed.
const SLICE: Duration = Duration::from_millis(20);

/// Plays a note list to the sinks at real-time pace on its own thread.
///
/// Independent of the session clock: used to let the learner hear a
/// passage without starting practice. Only one audition runs at a time;
/// starting another cancels and joins the previous one first.
pub struct Auditioner {
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Auditioner {
    pub fn new() -> Self {
        Self {
            cancel: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn start(&mut self, events: Vec<NoteEvent>, sinks: Vec<SharedSink>) {
        self.stop();

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = cancel.clone();
        let spawned = thread::Builder::new().name("audition".into()).spawn(move || {
            play(&events, &sinks, &cancel);
            all_notes_off(&sinks);
        });
        match spawned {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => error!("Failed to spawn audition thread: {}", e),
        }
    }

    /// Cancel and wait for the running audition, if any.
    pub fn stop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            debug!("Audition stopped");
        }
    }
}

impl Default for Auditioner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Auditioner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn play(events: &[NoteEvent], sinks: &[SharedSink], cancel: &AtomicBool) {
    info!("Audition: {} events", events.len());
    let start = Instant::now();

    for e in events {
        let target = start + Duration::from_secs_f64(e.time());
        loop {
            if cancel.load(Ordering::Relaxed) {
                return;
            }
            let now = Instant::now();
            if now >= target {
                break;
            }
            thread::sleep((target - now).min(SLICE));
        }
        send_to_all(sinks, e.pitch(), e.velocity(), e.is_on());
    }
    debug!("Audition complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{shared, MemorySink};

    #[test]
    fn test_audition_plays_then_silences() {
        let heard = MemorySink::new();
        let mut aud = Auditioner::new();
        aud.start(
            vec![NoteEvent::on(60, 100, 0.0), NoteEvent::off(60, 0.03)],
            vec![shared(heard.clone())],
        );
        thread::sleep(Duration::from_millis(300));
        aud.stop();

        let msgs = heard.messages();
        assert_eq!(msgs[0].pitch, 60);
        assert!(msgs[0].on);
        // one release from the passage plus the 128-note sweep
        assert_eq!(msgs.len(), 1 + 1 + 128);
    }

    #[test]
    fn test_stop_cancels_promptly() {
        let heard = MemorySink::new();
        let mut aud = Auditioner::new();
        aud.start(vec![NoteEvent::on(60, 100, 30.0)], vec![shared(heard.clone())]);
        let begin = Instant::now();
        aud.stop();
        assert!(begin.elapsed() < Duration::from_secs(1));
        assert!(heard.note_ons().is_empty());
        assert!(!aud.is_running());
    }
}
