//! The practice session: one object owning the loaded timeline, the
//! playback clock, the score, the recorder and every pending task.
//!
//! Nothing here blocks or spawns except the auditioner. The coordinator
//! calls [`PracticeSession::tick`] periodically; each tick drains live
//! input first, then updates expectancy, scores, checks completion and
//! finally runs due tasks, always in that order.
//!
//! Previewing sends every timeline event crossed since the previous tick,
//! in timeline order, so re-struck and sub-tick notes reach the sinks
//! with their own on and off.

use crate::ambient::{AmbientGenerator, AmbientMood, AmbientStyle};
use crate::audition::Auditioner;
use crate::config::PracticeConfig;
use crate::error::{PracticeError, Result};
use crate::expectancy::{active_notes, active_voices, ExpectancyWindow};
use crate::ingest;
use crate::midi_codec;
use crate::playback_clock::{ClockStart, PlaybackClock};
use crate::ports::{all_notes_off, input_queue, send_to_all, shared, NoteSink, SharedSink};
use crate::recorder::Recorder;
use crate::rng::Rng;
use crate::scoring::{ScoreState, ScoringEngine};
use crate::tasks::TaskQueue;
use crate::theory::{QuizPress, QuizRound, Structure, StructureKind};
use crate::timeline::Timeline;
use crate::types::*;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, trace, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::{Duration, Instant};

/// Velocity used when a quiz structure is played to the learner.
const QUIZ_VELOCITY: u8 = 100;
/// How long a quiz structure rings.
const QUIZ_HOLD_SECS: f64 = 1.0;
/// Upper bound for any scheduled delay.
const MAX_DELAY_SECS: f64 = 86_400.0;

/// Work deferred to a later tick. Runs only if the session generation
/// has not changed since it was scheduled.
#[derive(Debug, Clone, PartialEq)]
enum Deferred {
    Release(Vec<u8>),
    Sound { pitch: u8, velocity: u8, hold: f64 },
    RevealAnswer,
    AmbientStep,
}

fn after(now: Instant, secs: f64) -> Instant {
    let secs = if secs.is_finite() { secs.clamp(0.0, MAX_DELAY_SECS) } else { 0.0 };
    now + Duration::from_secs_f64(secs)
}

pub struct PracticeSession {
    config: PracticeConfig,
    timeline: Timeline,
    source: String,
    clock: PlaybackClock,
    scoring: ScoringEngine,
    recorder: Recorder,
    last_take: Vec<NoteEvent>,
    expected: ExpectancyWindow,
    /// Preview voices currently sounding on the sinks.
    forwarded: BTreeSet<u8>,
    /// Index of the first timeline event not yet forwarded. `None` after a
    /// resume: the next preview tick re-sounds the active voices first.
    preview_cursor: Option<usize>,
    /// Keys physically held down, collapsed across input paths.
    pressed: BTreeSet<u8>,
    /// Pitches sounded by the quiz or the ambient generator.
    generator_notes: BTreeSet<u8>,
    sinks: Vec<SharedSink>,
    input_tx: Sender<InputEvent>,
    input_rx: Receiver<InputEvent>,
    listeners: Vec<Sender<PracticeUpdate>>,
    tasks: TaskQueue<Deferred>,
    quiz: Option<QuizRound>,
    quiz_revealed: bool,
    ambient: Option<AmbientGenerator>,
    auditioner: Auditioner,
    rng: Rng,
}

impl PracticeSession {
    pub fn new(config: PracticeConfig) -> Self {
        let (input_tx, input_rx) = input_queue();
        Self {
            config,
            timeline: Timeline::empty(),
            source: String::new(),
            clock: PlaybackClock::new(),
            scoring: ScoringEngine::new(0),
            recorder: Recorder::new(),
            last_take: Vec::new(),
            expected: ExpectancyWindow::new(),
            forwarded: BTreeSet::new(),
            preview_cursor: Some(0),
            pressed: BTreeSet::new(),
            generator_notes: BTreeSet::new(),
            sinks: Vec::new(),
            input_tx,
            input_rx,
            listeners: Vec::new(),
            tasks: TaskQueue::new(),
            quiz: None,
            quiz_revealed: false,
            ambient: None,
            auditioner: Auditioner::new(),
            rng: Rng::default(),
        }
    }

    pub fn with_sink<S: NoteSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(shared(sink));
        self
    }

    pub fn with_shared_sink(mut self, sink: SharedSink) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_listener(mut self, tx: Sender<PracticeUpdate>) -> Self {
        self.listeners.push(tx);
        self
    }

    /// Seed the generators (quiz, ambient) for reproducible runs.
    pub fn with_rng(mut self, rng: Rng) -> Self {
        self.rng = rng;
        self
    }

    /// Handle for note sources. Sources must only `try_send`.
    pub fn input_sender(&self) -> Sender<InputEvent> {
        self.input_tx.clone()
    }

    // ─── Accessors ──────────────────────────────────────────────────────

    pub fn config(&self) -> &PracticeConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn state(&self) -> PlaybackState {
        self.clock.state()
    }

    pub fn elapsed(&self, now: Instant) -> Option<f64> {
        self.clock.elapsed(now)
    }

    pub fn score(&self) -> ScoreState {
        self.scoring.state()
    }

    pub fn percentage(&self) -> f64 {
        self.scoring.percentage()
    }

    pub fn expected(&self) -> BTreeSet<u8> {
        self.expected.pitches()
    }

    pub fn pressed(&self) -> &BTreeSet<u8> {
        &self.pressed
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_active()
    }

    /// Events of the most recently stopped take.
    pub fn last_take(&self) -> &[NoteEvent] {
        &self.last_take
    }

    pub fn quiz(&self) -> Option<&QuizRound> {
        self.quiz.as_ref()
    }

    pub fn ambient_running(&self) -> bool {
        self.ambient.is_some()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.pending()
    }

    pub fn generation(&self) -> u64 {
        self.tasks.generation()
    }

    // ─── Timeline ───────────────────────────────────────────────────────

    /// Ingest a MIDI file. On failure the current timeline stays loaded
    /// and listeners get an `Error` update.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        match ingest::ingest(path) {
            Ok(timeline) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.replace_timeline(timeline, name);
                Ok(())
            }
            Err(e) => {
                warn!("Load failed, keeping {:?}: {}", self.source, e);
                self.notify(PracticeUpdate::Error { message: e.to_string() });
                Err(e)
            }
        }
    }

    /// Swap in a new timeline. Playback, score, tasks and any take in
    /// progress are discarded with the old one.
    pub fn replace_timeline(&mut self, timeline: Timeline, source: impl Into<String>) {
        self.halt();
        self.recorder.discard();
        self.scoring.reset_for(timeline.max_score());
        self.timeline = timeline;
        self.source = source.into();
        info!(
            "Timeline loaded: {} ({} notes, {:.1}s)",
            self.source,
            self.timeline.max_score(),
            self.timeline.last_event_time()
        );
        self.notify(PracticeUpdate::TimelineLoaded {
            source: self.source.clone(),
            notes: self.timeline.max_score(),
            duration: self.timeline.last_event_time(),
        });
        self.notify(PracticeUpdate::PlaybackState { state: self.clock.state() });
        self.notify_score();
    }

    // ─── Playback ───────────────────────────────────────────────────────

    /// Practice from the beginning, or continue a paused run.
    pub fn start(&mut self, now: Instant) -> ClockStart {
        self.begin(now, PlaybackMode::Practice)
    }

    /// Like `start`, but timeline notes are forwarded to the sinks and
    /// nothing is scored.
    pub fn preview(&mut self, now: Instant) -> ClockStart {
        self.begin(now, PlaybackMode::Preview)
    }

    /// Stop a running preview, or start one. Returns true if a preview is
    /// now running.
    pub fn toggle_preview(&mut self, now: Instant) -> bool {
        if self.clock.state() == PlaybackState::Previewing {
            self.stop();
            false
        } else {
            self.preview(now) != ClockStart::Ignored
        }
    }

    fn begin(&mut self, now: Instant, mode: PlaybackMode) -> ClockStart {
        if self.clock.state() == PlaybackState::Stopped && (self.quiz.is_some() || self.ambient.is_some()) {
            self.halt();
        }
        let outcome = self.clock.start(now, mode);
        match outcome {
            ClockStart::FromBeginning => {
                self.preview_cursor = Some(0);
                self.scoring.reset();
                info!("Playback started ({})", self.clock.state());
                self.notify_score();
            }
            ClockStart::Resumed => {
                self.preview_cursor = None;
                info!("Playback resumed ({})", self.clock.state());
            }
            ClockStart::Ignored => return outcome,
        }
        self.notify(PracticeUpdate::PlaybackState { state: self.clock.state() });
        outcome
    }

    pub fn pause(&mut self, now: Instant) -> bool {
        if !self.clock.pause(now) {
            return false;
        }
        self.release_forwarded();
        // Cleared without notifying so the display keeps its highlight and
        // the next update after resume re-reports the active set.
        self.expected.clear();
        info!("Playback paused at {:.2}s", self.clock.elapsed(now).unwrap_or(0.0));
        self.notify(PracticeUpdate::PlaybackState { state: self.clock.state() });
        true
    }

    pub fn resume(&mut self, now: Instant) -> bool {
        if self.clock.resume(now) != ClockStart::Resumed {
            return false;
        }
        if self.clock.mode() == PlaybackMode::Preview {
            self.preview_cursor = None;
        }
        info!("Playback resumed ({})", self.clock.state());
        self.notify(PracticeUpdate::PlaybackState { state: self.clock.state() });
        true
    }

    /// Unconditional stop. Returns whether anything was playing or paused.
    pub fn stop(&mut self) -> bool {
        let was_active = self.halt();
        if was_active {
            info!("Playback stopped");
        }
        self.notify(PracticeUpdate::PlaybackState { state: self.clock.state() });
        was_active
    }

    /// Back to a clean stopped state with the same timeline. Idempotent.
    pub fn reset(&mut self) {
        self.halt();
        self.recorder.discard();
        self.scoring.reset();
        debug!("Session reset (generation {})", self.tasks.generation());
        self.notify(PracticeUpdate::PlaybackState { state: self.clock.state() });
        self.notify_score();
    }

    pub fn close(&mut self) {
        self.halt();
        self.recorder.discard();
        info!("Session closed");
    }

    /// Play the whole timeline to the sinks on the audition thread,
    /// independent of the practice clock.
    pub fn audition(&mut self) -> bool {
        if self.timeline.is_empty() {
            debug!("Audition ignored: no timeline");
            return false;
        }
        self.auditioner.start(self.timeline.events().to_vec(), self.sinks.clone());
        true
    }

    /// Stops the clock and everything that could still reach a sink.
    /// Returns whether the clock was active.
    fn halt(&mut self) -> bool {
        let was_active = self.clock.stop();
        self.preview_cursor = Some(0);
        self.tasks.invalidate();
        self.auditioner.stop();
        self.release_forwarded();
        self.release_generator_notes();
        all_notes_off(&self.sinks);
        self.quiz = None;
        self.quiz_revealed = false;
        self.ambient = None;
        self.set_expected(BTreeMap::new());
        was_active
    }

    // ─── Recording ──────────────────────────────────────────────────────

    pub fn start_recording(&mut self, now: Instant) {
        self.recorder.start(now);
        self.notify(PracticeUpdate::RecordingStarted);
    }

    /// End the take. Stopping while idle keeps the previous take.
    pub fn stop_recording(&mut self) -> &[NoteEvent] {
        if !self.recorder.is_active() {
            debug!("Stop recording ignored: not recording");
            return &self.last_take;
        }
        self.last_take = self.recorder.stop();
        self.notify(PracticeUpdate::RecordingStopped { notes: self.last_take.len() });
        &self.last_take
    }

    /// Write the last take as a format-0 MIDI file, stopping a running
    /// take first. Returns the number of events written.
    pub fn export_recording(&mut self, path: &Path) -> Result<usize> {
        if self.recorder.is_active() {
            self.stop_recording();
        }
        if self.last_take.is_empty() {
            return Err(PracticeError::State("nothing recorded"));
        }
        midi_codec::save(
            path,
            &self.last_take,
            self.config.export_ticks_per_quarter,
            self.config.export_tempo,
        )?;
        info!("Recording saved to {:?} ({} events)", path, self.last_take.len());
        Ok(self.last_take.len())
    }

    /// Write the loaded timeline (a file or a generated piece) as a
    /// format-0 MIDI file. Returns the number of events written.
    pub fn export_timeline(&self, path: &Path) -> Result<usize> {
        if self.timeline.is_empty() {
            return Err(PracticeError::State("no timeline loaded"));
        }
        midi_codec::save(
            path,
            self.timeline.events(),
            self.config.export_ticks_per_quarter,
            self.config.export_tempo,
        )?;
        info!("Timeline {:?} saved to {:?} ({} events)", self.source, path, self.timeline.len());
        Ok(self.timeline.len())
    }

    // ─── Quiz ───────────────────────────────────────────────────────────

    /// Start an ear-training round: play a random structure, expect its
    /// notes, and reveal the answer later. Returns the question.
    pub fn start_quiz(&mut self, kind: StructureKind, now: Instant) -> String {
        if self.halt() {
            self.notify(PracticeUpdate::PlaybackState { state: self.clock.state() });
        }
        let structure = match kind {
            StructureKind::Chord => Structure::random_chord(&mut self.rng),
            StructureKind::Mode => Structure::random_mode(&mut self.rng),
        };
        let round = QuizRound::new(structure);
        let question = round.structure().question();
        info!("Quiz: {} ({} notes)", question, round.remaining());

        let expected = round.good_notes().iter().map(|&p| (p, QUIZ_VELOCITY)).collect();
        self.quiz = Some(round);
        self.quiz_revealed = false;
        self.notify(PracticeUpdate::QuizQuestion { text: question.clone() });
        self.set_expected(expected);
        self.sound_quiz(now);
        self.tasks
            .schedule(after(now, self.config.quiz_reveal_secs), Deferred::RevealAnswer);
        question
    }

    /// Play the current quiz structure again.
    pub fn replay_quiz(&mut self, now: Instant) -> bool {
        self.release_generator_notes();
        self.sound_quiz(now)
    }

    fn sound_quiz(&mut self, now: Instant) -> bool {
        let notes = match &self.quiz {
            Some(round) => round.structure().sounding_notes(),
            None => {
                debug!("No quiz to sound");
                return false;
            }
        };
        for &pitch in &notes {
            self.sound_generator_note(pitch, QUIZ_VELOCITY);
        }
        self.tasks.schedule(after(now, QUIZ_HOLD_SECS), Deferred::Release(notes));
        true
    }

    fn resolve_quiz_press(&mut self, pitch: u8) {
        if self.quiz_revealed {
            return;
        }
        let Some(round) = self.quiz.as_mut() else {
            return;
        };
        match round.press(pitch) {
            QuizPress::Wrong => self.notify(PracticeUpdate::QuizNote { pitch, correct: false }),
            QuizPress::Correct { complete } => {
                self.notify(PracticeUpdate::QuizNote { pitch, correct: true });
                if complete {
                    info!("Quiz answered");
                    self.reveal_answer();
                }
            }
        }
    }

    fn reveal_answer(&mut self) {
        if self.quiz_revealed {
            return;
        }
        let Some(round) = &self.quiz else {
            return;
        };
        let text = round.structure().answer();
        self.quiz_revealed = true;
        debug!("Quiz answer: {}", text);
        self.notify(PracticeUpdate::QuizAnswer { text });
        self.set_expected(BTreeMap::new());
    }

    // ─── Ambient ────────────────────────────────────────────────────────

    pub fn start_ambient(&mut self, style: AmbientStyle, now: Instant) {
        if self.halt() {
            self.notify(PracticeUpdate::PlaybackState { state: self.clock.state() });
        }
        let rng = Rng::new_with_seed(self.rng.rand_u64() as u128);
        let generator = AmbientGenerator::new(style, AmbientMood::now(), rng);
        info!("Ambient started ({}, {})", style, generator.scale_name());
        self.ambient = Some(generator);
        self.ambient_step(now);
    }

    pub fn stop_ambient(&mut self) -> bool {
        if self.ambient.take().is_none() {
            return false;
        }
        self.tasks.invalidate();
        self.release_generator_notes();
        info!("Ambient stopped");
        true
    }

    fn ambient_step(&mut self, now: Instant) {
        let Some(generator) = self.ambient.as_mut() else {
            return;
        };
        let step = generator.next_step();
        self.release_generator_notes();
        trace!("Ambient step: {} ({} notes, next in {:.2}s)", step.description, step.notes.len(), step.next_in);
        self.notify(PracticeUpdate::Ambient { description: step.description.clone() });

        for note in &step.notes {
            if note.offset <= 0.0 {
                self.sound_generator_note(note.pitch, note.velocity);
                self.tasks.schedule(after(now, note.hold), Deferred::Release(vec![note.pitch]));
            } else {
                self.tasks.schedule(
                    after(now, note.offset),
                    Deferred::Sound {
                        pitch: note.pitch,
                        velocity: note.velocity,
                        hold: note.hold,
                    },
                );
            }
        }
        self.tasks.schedule(after(now, step.next_in), Deferred::AmbientStep);
    }

    // ─── Tick ───────────────────────────────────────────────────────────

    /// One cooperative step. Never blocks.
    pub fn tick(&mut self, now: Instant) {
        // 1. live input
        let drained: Vec<LiveNote> = self
            .input_rx
            .try_iter()
            .map(|event| match event {
                InputEvent::Note(note) => note,
            })
            .collect();
        for note in &drained {
            self.handle_live(note);
        }

        // 2. expectancy
        if self.clock.is_running() {
            if let Some(elapsed) = self.clock.elapsed(now) {
                self.notify(PracticeUpdate::Position {
                    elapsed,
                    duration: self.timeline.last_event_time(),
                });
                if self.clock.state() == PlaybackState::Previewing {
                    self.forward_until(elapsed);
                }
                if !self.expected.update(&self.timeline, elapsed).is_empty() {
                    self.notify_expected();
                }
            }
        }

        // 3. scoring, against the expectation at each press's arrival
        let mut scored = false;
        for note in drained.iter().filter(|n| n.on) {
            let Some(at) = self.clock.elapsed_at(note.arrival) else {
                continue;
            };
            let expected = active_notes(&self.timeline, at);
            if self.scoring.on_live_note_on(note.pitch, self.clock.state(), &expected) {
                trace!("Scored {} at {:.3}s", pitch_name(note.pitch), at);
                scored = true;
            }
        }
        if scored {
            self.notify_score();
        }

        // 4. completion
        if self.clock.check_completion(now, self.timeline.last_event_time()) {
            self.complete();
        }

        // 5. deferred work
        for task in self.tasks.pop_due(now) {
            self.run(task, now);
        }
    }

    fn handle_live(&mut self, note: &LiveNote) {
        if note.on {
            self.pressed.insert(note.pitch);
            self.notify(PracticeUpdate::PitchPressed {
                pitch: note.pitch,
                velocity: note.velocity,
                origin: NoteOrigin::Live,
            });
        } else {
            self.pressed.remove(&note.pitch);
            self.notify(PracticeUpdate::PitchReleased {
                pitch: note.pitch,
                origin: NoteOrigin::Live,
            });
        }
        if self.config.midi_thru {
            send_to_all(&self.sinks, note.pitch, note.velocity, note.on);
        }
        self.recorder.capture_live(note);
        if note.on {
            self.resolve_quiz_press(note.pitch);
        }
    }

    fn complete(&mut self) {
        let state = self.scoring.state();
        info!(
            "Playback complete: {}/{} ({:.1}%)",
            state.score,
            state.max_score,
            state.percentage()
        );
        self.release_forwarded();
        all_notes_off(&self.sinks);
        self.set_expected(BTreeMap::new());
        self.notify(PracticeUpdate::PlaybackState { state: self.clock.state() });
        self.notify(PracticeUpdate::Completed {
            score: state.score,
            max_score: state.max_score,
            percentage: state.percentage(),
        });
    }

    fn run(&mut self, task: Deferred, now: Instant) {
        match task {
            Deferred::Release(pitches) => {
                for pitch in pitches {
                    self.release_generator_note(pitch);
                }
            }
            Deferred::Sound { pitch, velocity, hold } => {
                self.sound_generator_note(pitch, velocity);
                self.tasks.schedule(after(now, hold), Deferred::Release(vec![pitch]));
            }
            Deferred::RevealAnswer => self.reveal_answer(),
            Deferred::AmbientStep => self.ambient_step(now),
        }
    }

    // ─── Sink helpers ───────────────────────────────────────────────────

    /// Previewing: sends the events in `(previous tick, elapsed]` in
    /// timeline order. After a resume the voices active at `elapsed` are
    /// sounded instead and the cursor jumps past them.
    fn forward_until(&mut self, elapsed: f64) {
        let events = self.timeline.events();
        let end = events.partition_point(|e| e.time() <= elapsed);
        let Some(cursor) = self.preview_cursor else {
            for (pitch, velocity) in active_voices(&self.timeline, elapsed) {
                self.forward_on(pitch, velocity);
            }
            self.preview_cursor = Some(end);
            return;
        };
        let crossed: Vec<NoteEvent> = events[cursor.min(end)..end].to_vec();
        for e in &crossed {
            match e.kind() {
                NoteKind::On => self.forward_on(e.pitch(), e.velocity()),
                NoteKind::Off => self.forward_off(e.pitch()),
            }
        }
        self.preview_cursor = Some(end);
    }

    fn forward_on(&mut self, pitch: u8, velocity: u8) {
        send_to_all(&self.sinks, pitch, velocity, true);
        self.forwarded.insert(pitch);
        self.notify(PracticeUpdate::PitchPressed {
            pitch,
            velocity,
            origin: NoteOrigin::Preview,
        });
    }

    /// Offs for voices this preview never sounded are not sent.
    fn forward_off(&mut self, pitch: u8) {
        if self.forwarded.remove(&pitch) {
            send_to_all(&self.sinks, pitch, 0, false);
            self.notify(PracticeUpdate::PitchReleased { pitch, origin: NoteOrigin::Preview });
        }
    }

    fn release_forwarded(&mut self) {
        for pitch in std::mem::take(&mut self.forwarded) {
            send_to_all(&self.sinks, pitch, 0, false);
            self.notify(PracticeUpdate::PitchReleased { pitch, origin: NoteOrigin::Preview });
        }
    }

    fn sound_generator_note(&mut self, pitch: u8, velocity: u8) {
        send_to_all(&self.sinks, pitch, velocity, true);
        self.generator_notes.insert(pitch);
        self.notify(PracticeUpdate::PitchPressed {
            pitch,
            velocity,
            origin: NoteOrigin::Generator,
        });
    }

    fn release_generator_note(&mut self, pitch: u8) {
        if self.generator_notes.remove(&pitch) {
            send_to_all(&self.sinks, pitch, 0, false);
            self.notify(PracticeUpdate::PitchReleased { pitch, origin: NoteOrigin::Generator });
        }
    }

    fn release_generator_notes(&mut self) {
        for pitch in std::mem::take(&mut self.generator_notes) {
            send_to_all(&self.sinks, pitch, 0, false);
            self.notify(PracticeUpdate::PitchReleased { pitch, origin: NoteOrigin::Generator });
        }
    }

    // ─── Notifications ──────────────────────────────────────────────────

    fn set_expected(&mut self, next: BTreeMap<u8, u8>) {
        if !self.expected.replace(next).is_empty() {
            self.notify_expected();
        }
    }

    fn notify_expected(&self) {
        let expected = self
            .expected
            .pitches()
            .into_iter()
            .filter(|&p| self.config.in_display_span(p))
            .collect();
        self.notify(PracticeUpdate::ExpectedChanged { expected });
    }

    fn notify_score(&self) {
        let state = self.scoring.state();
        self.notify(PracticeUpdate::Score {
            score: state.score,
            max_score: state.max_score,
            percentage: state.percentage(),
        });
    }

    /// Full or disconnected listeners miss the update.
    fn notify(&self, update: PracticeUpdate) {
        for tx in &self.listeners {
            let _ = tx.try_send(update.clone());
        }
    }
}
