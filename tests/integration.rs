//! End-to-end integration tests for the practice pipeline.
//!
//! These tests exercise the full data flow:
//!   SMF bytes → ingest → Timeline → PracticeSession ← live input queue
//!   PracticeSession → sinks / PracticeUpdate channel → assertions
//!
//! Time is driven explicitly: every session call takes an `Instant`, so
//! the tests step through seconds of playback without sleeping.

use crossbeam_channel::{unbounded, Receiver};
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::collections::BTreeSet;
use std::thread;
use std::time::{Duration, Instant};

use piano_practice::composer::{lyrics_melody, SegmentKind, SegmentParams, SegmentStyle, SongComposer};
use piano_practice::config::PracticeConfig;
use piano_practice::coordinator::{Command, Coordinator};
use piano_practice::error::PracticeError;
use piano_practice::expectancy::active_notes;
use piano_practice::ingest::{ingest, ingest_bytes};
use piano_practice::midi_codec;
use piano_practice::ports::{MemorySink, SinkMessage};
use piano_practice::recorder::Recorder;
use piano_practice::rng::Rng;
use piano_practice::scoring::ScoringEngine;
use piano_practice::session::PracticeSession;
use piano_practice::tasks::TaskQueue;
use piano_practice::theory::StructureKind;
use piano_practice::timeline::Timeline;
use piano_practice::types::*;

// ─── Helpers ───────────────────────────────────────────────────────────────

fn note(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOn { key: u7::new(key), vel: u7::new(vel) },
        },
    }
}

fn tempo(delta: u32, us: u32) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(us))),
    }
}

fn end() -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}

/// A metrical SMF at 480 ticks per quarter.
fn smf(tracks: Vec<Vec<TrackEvent<'static>>>) -> Vec<u8> {
    let format = if tracks.len() > 1 { Format::Parallel } else { Format::SingleTrack };
    let smf = Smf {
        header: Header::new(format, Timing::Metrical(u15::new(480))),
        tracks,
    };
    let mut bytes = Vec::new();
    smf.write_std(&mut bytes).unwrap();
    bytes
}

/// C4 over [0, 1) s then E4 over [1, 2) s at the default 120 BPM.
fn c4_then_e4() -> Vec<u8> {
    smf(vec![vec![
        note(0, 60, 100),
        note(960, 60, 0),
        note(0, 64, 90),
        note(960, 64, 0),
        end(),
    ]])
}

fn at(t0: Instant, secs: f64) -> Instant {
    t0 + Duration::from_secs_f64(secs)
}

fn quiet() -> PracticeConfig {
    PracticeConfig {
        midi_thru: false,
        ..PracticeConfig::default()
    }
}

fn session_with_memory_sink() -> (PracticeSession, MemorySink, Receiver<PracticeUpdate>) {
    let heard = MemorySink::new();
    let (tx, rx) = unbounded();
    let session = PracticeSession::new(quiet())
        .with_sink(heard.clone())
        .with_listener(tx)
        .with_rng(Rng::new_with_seed(42));
    (session, heard, rx)
}

fn press(session: &PracticeSession, pitch: u8, arrival: Instant) {
    session
        .input_sender()
        .try_send(InputEvent::Note(LiveNote::press(pitch, 90, arrival)))
        .unwrap();
}

fn release(session: &PracticeSession, pitch: u8, arrival: Instant) {
    session
        .input_sender()
        .try_send(InputEvent::Note(LiveNote::release(pitch, arrival)))
        .unwrap();
}

// ─── Ingestion & expectancy ────────────────────────────────────────────────

#[test]
fn test_expected_set_follows_the_timeline() {
    let timeline = ingest_bytes(&c4_then_e4()).unwrap();
    assert_eq!(timeline.max_score(), 2);
    assert_eq!(active_notes(&timeline, 0.5), BTreeSet::from([60]));
    assert_eq!(active_notes(&timeline, 1.5), BTreeSet::from([64]));
    assert!(active_notes(&timeline, 2.5).is_empty());
}

#[test]
fn test_orphan_note_closed_two_seconds_after_onset() {
    // 4800 ticks = 5.0 s, never released
    let timeline = ingest_bytes(&smf(vec![vec![note(4800, 72, 90), end()]])).unwrap();
    let events = timeline.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].kind(), NoteKind::Off);
    assert_eq!(events[1].pitch(), 72);
    assert!((events[1].time() - 7.0).abs() < 1e-9);
}

#[test]
fn test_tempo_change_in_first_track_applies_to_later_track() {
    let bytes = smf(vec![
        vec![tempo(0, 500_000), tempo(960, 250_000), end()],
        vec![note(1920, 67, 80), note(960, 67, 0), end()],
    ]);
    let timeline = ingest_bytes(&bytes).unwrap();
    // 960 ticks at 0.5 s/q = 1.0 s, then 960 more at 0.25 s/q = 0.5 s
    assert!((timeline.events()[0].time() - 1.5).abs() < 1e-9);
    assert!((timeline.events()[1].time() - 2.0).abs() < 1e-9);
}

#[test]
fn test_restruck_note_keeps_pairs() {
    let bytes = smf(vec![vec![note(0, 60, 90), note(480, 60, 80), note(480, 60, 0), end()]]);
    let timeline = ingest_bytes(&bytes).unwrap();
    let kinds: Vec<NoteKind> = timeline.iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![NoteKind::On, NoteKind::Off, NoteKind::On, NoteKind::Off]);
    assert_eq!(timeline.max_score(), 2);
}

#[test]
fn test_invalid_file_is_format_error() {
    let err = ingest_bytes(b"MThd garbage").unwrap_err();
    assert!(matches!(err, PracticeError::FileFormat(_)));
}

#[test]
fn test_malformed_message_mid_track_keeps_later_notes() {
    let body: &[u8] = &[
        0x00, 0x90, 60, 100,
        0x00, 0xF4,
        0x83, 0x60, 0x80, 60, 0,
        0x00, 0x90, 62, 100,
        0x83, 0x60, 0x80, 62, 0,
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let mut bytes = b"MThd\x00\x00\x00\x06\x00\x00\x00\x01\x01\xE0MTrk".to_vec();
    bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
    bytes.extend_from_slice(body);

    let timeline = ingest_bytes(&bytes).unwrap();
    assert_eq!(timeline.max_score(), 2);
    // C4 closed by its own NoteOff, not by the orphan rule
    assert!((timeline.last_event_time() - 1.0).abs() < 1e-9);
    assert_eq!(active_notes(&timeline, 0.75), BTreeSet::from([62]));
}

// ─── Recording round trip ──────────────────────────────────────────────────

#[test]
fn test_recording_round_trip_through_codec() {
    let t0 = Instant::now();
    let mut recorder = Recorder::new();
    recorder.start(t0);
    recorder.capture(NoteKind::On, 60, 100, t0);
    recorder.capture(NoteKind::Off, 60, 0, at(t0, 0.40));
    let take = recorder.stop();

    let bytes = midi_codec::encode(&take, 480, DEFAULT_TEMPO).unwrap();
    let decoded = midi_codec::decode(&bytes).unwrap();
    assert_eq!(decoded.len(), 2);
    assert!(decoded[0].is_on() && decoded[0].pitch() == 60);
    assert!(!decoded[1].is_on() && decoded[1].pitch() == 60);
    // within half a tick at 960 ticks per second
    assert!((decoded[1].time() - decoded[0].time() - 0.40).abs() <= 0.5 / 960.0);

    let smf = Smf::parse(&bytes).unwrap();
    let deltas: Vec<u32> = smf.tracks[0].iter().map(|e| e.delta.as_int()).collect();
    assert_eq!(deltas, vec![0, 0, 384, 0]);
}

#[test]
fn test_round_trip_within_one_tick_at_custom_resolution() {
    // 96 ticks per quarter at 80 BPM: one tick is 7.8125 ms
    let ppq = 96;
    let tempo = 750_000;
    let one_tick = tempo as f64 / 1_000_000.0 / ppq as f64;
    let events = vec![
        NoteEvent::on(60, 100, 0.0),
        NoteEvent::on(64, 72, 0.137),
        NoteEvent::off(60, 0.5),
        NoteEvent::on(67, 55, 0.733),
        NoteEvent::off(64, 1.21),
        NoteEvent::off(67, 2.005),
        NoteEvent::on(72, 127, 3.3333),
        NoteEvent::off(72, 4.0001),
    ];

    let bytes = midi_codec::encode(&events, ppq, tempo).unwrap();
    let decoded = midi_codec::decode(&bytes).unwrap();
    assert_eq!(decoded.len(), events.len());
    for (sent, read) in events.iter().zip(&decoded) {
        assert_eq!((read.kind(), read.pitch()), (sent.kind(), sent.pitch()));
        if sent.is_on() {
            assert_eq!(read.velocity(), sent.velocity());
        }
        assert!(
            (read.time() - sent.time()).abs() <= one_tick,
            "{:?} read back as {:?}",
            sent,
            read
        );
    }
}

#[test]
fn test_composed_song_exports_and_reloads() {
    let mut composer = SongComposer::new(0, Rng::new_with_seed(7));
    for (kind, style) in [
        (SegmentKind::Intro, SegmentStyle::Static),
        (SegmentKind::Verse, SegmentStyle::Rising),
        (SegmentKind::Outro, SegmentStyle::Falling),
    ] {
        composer.add_segment(SegmentParams { kind, style, duration: 10.0, position: 12 });
    }
    let song = composer.song_timeline();
    assert!(song.max_score() > 0);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("song.mid");
    let mut session = PracticeSession::new(quiet());
    session.replace_timeline(song.clone(), "song");
    assert_eq!(session.export_timeline(&path).unwrap(), song.len());

    let reloaded = ingest(&path).unwrap();
    assert_eq!(reloaded.max_score(), song.max_score());
    assert!((reloaded.last_event_time() - song.last_event_time()).abs() < 0.01);
}

#[test]
fn test_session_records_live_input_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("take.mid");
    let (mut session, _probe, rx) = session_with_memory_sink();
    let t0 = Instant::now();

    session.start_recording(t0);
    press(&session, 60, t0);
    release(&session, 60, at(t0, 0.4));
    session.tick(at(t0, 0.5));
    assert_eq!(session.export_recording(&path).unwrap(), 2);
    assert!(!session.is_recording());

    let bytes = std::fs::read(&path).unwrap();
    let timeline = ingest_bytes(&bytes).unwrap();
    assert_eq!(timeline.max_score(), 1);
    assert!((timeline.events()[1].time() - 0.4).abs() <= 0.5 / 960.0);
    assert!(rx
        .try_iter()
        .any(|u| u == PracticeUpdate::RecordingStopped { notes: 2 }));
}

// ─── Playback & scoring ────────────────────────────────────────────────────

#[test]
fn test_empty_timeline_scores_zero_percent() {
    assert_eq!(ScoringEngine::new(0).percentage(), 0.0);

    let (mut session, _probe, _rx) = session_with_memory_sink();
    session.replace_timeline(Timeline::empty(), "empty");
    let t0 = Instant::now();
    session.start(t0);
    press(&session, 60, at(t0, 0.1));
    session.tick(at(t0, 0.2));
    assert_eq!(session.percentage(), 0.0);
    assert_eq!(session.score().score, 0);
}

#[test]
fn test_practice_run_scores_and_completes() {
    let (mut session, _probe, rx) = session_with_memory_sink();
    session.replace_timeline(ingest_bytes(&c4_then_e4()).unwrap(), "c4-e4");
    let t0 = Instant::now();
    session.start(t0);

    press(&session, 60, at(t0, 0.10));
    session.tick(at(t0, 0.12));
    press(&session, 64, at(t0, 1.10));
    // a second press of the same pitch counts too, up to the max
    press(&session, 64, at(t0, 1.20));
    session.tick(at(t0, 1.25));
    assert_eq!(session.score().score, 2);
    assert_eq!(session.percentage(), 100.0);

    session.tick(at(t0, 4.5));
    assert_eq!(session.state(), PlaybackState::Stopped);
    let updates: Vec<PracticeUpdate> = rx.try_iter().collect();
    assert!(updates.contains(&PracticeUpdate::Completed {
        score: 2,
        max_score: 2,
        percentage: 100.0
    }));
}

#[test]
fn test_pause_resume_keeps_elapsed_continuous() {
    let (mut session, _probe, _rx) = session_with_memory_sink();
    session.replace_timeline(ingest_bytes(&c4_then_e4()).unwrap(), "c4-e4");
    let t0 = Instant::now();
    session.start(t0);
    session.tick(at(t0, 0.5));
    assert!(session.pause(at(t0, 1.0)));
    assert!((session.elapsed(at(t0, 2.0)).unwrap() - 1.0).abs() < 1e-6);

    // presses while paused never score
    press(&session, 64, at(t0, 2.5));
    session.tick(at(t0, 2.6));
    assert_eq!(session.score().score, 0);

    assert!(session.resume(at(t0, 3.0)));
    assert!((session.elapsed(at(t0, 3.5)).unwrap() - 1.5).abs() < 1e-6);
    session.tick(at(t0, 3.5));
    assert_eq!(session.expected(), BTreeSet::from([64]));
}

#[test]
fn test_preview_forwards_boundaries_and_never_scores() {
    let (mut session, heard, _rx) = session_with_memory_sink();
    session.replace_timeline(ingest_bytes(&c4_then_e4()).unwrap(), "c4-e4");
    heard.clear();
    let t0 = Instant::now();
    assert!(session.toggle_preview(t0));
    assert_eq!(session.state(), PlaybackState::Previewing);

    session.tick(at(t0, 0.5));
    press(&session, 64, at(t0, 1.5));
    session.tick(at(t0, 1.5));
    session.tick(at(t0, 2.5));

    let msgs = heard.messages();
    assert_eq!(
        msgs,
        vec![
            SinkMessage { pitch: 60, velocity: 100, on: true },
            SinkMessage { pitch: 60, velocity: 0, on: false },
            SinkMessage { pitch: 64, velocity: 90, on: true },
            SinkMessage { pitch: 64, velocity: 0, on: false },
        ]
    );
    assert_eq!(session.score().score, 0);

    assert!(!session.toggle_preview(at(t0, 2.6)));
    assert_eq!(session.state(), PlaybackState::Stopped);
    // stop sweeps every pitch
    assert_eq!(heard.messages().len(), 4 + 128);
}

#[test]
fn test_replacing_timeline_resets_everything() {
    let (mut session, heard, _rx) = session_with_memory_sink();
    session.replace_timeline(ingest_bytes(&c4_then_e4()).unwrap(), "c4-e4");
    let t0 = Instant::now();
    session.start(t0);
    session.start_recording(t0);
    press(&session, 60, at(t0, 0.1));
    session.tick(at(t0, 0.2));
    assert_eq!(session.score().score, 1);
    heard.clear();

    let mut rng = Rng::new_with_seed(8);
    session.replace_timeline(lyrics_melody("la la", &mut rng), "lyrics");
    assert_eq!(session.state(), PlaybackState::Stopped);
    assert_eq!(session.score().score, 0);
    assert!(session.score().max_score >= 4);
    assert!(!session.is_recording());
    assert!(session.expected().is_empty());
    assert_eq!(heard.messages().len(), 128);
}

// ─── Scheduled tasks ───────────────────────────────────────────────────────

#[test]
fn test_stale_generation_tasks_are_dropped() {
    let t0 = Instant::now();
    let mut queue = TaskQueue::new();
    let old = queue.generation();
    queue.schedule(at(t0, 1.0), "old");
    queue.invalidate();
    queue.schedule_in_generation(old, at(t0, 1.0), "late");
    queue.schedule(at(t0, 2.0), "fresh");
    assert_eq!(queue.pop_due(at(t0, 5.0)), vec!["fresh"]);
    assert_eq!(queue.pending(), 0);
}

#[test]
fn test_quiz_completed_reveals_answer_early() {
    let (mut session, _probe, rx) = session_with_memory_sink();
    let t0 = Instant::now();
    let question = session.start_quiz(StructureKind::Chord, t0);
    let structure = session.quiz().unwrap().structure().clone();
    assert_eq!(question, structure.question());

    for (i, n) in structure.notes.iter().enumerate() {
        press(&session, n + 48, at(t0, 0.5 + i as f64 * 0.1));
    }
    session.tick(at(t0, 1.5));

    let updates: Vec<PracticeUpdate> = rx.try_iter().collect();
    let answers: Vec<&PracticeUpdate> = updates
        .iter()
        .filter(|u| matches!(u, PracticeUpdate::QuizAnswer { .. }))
        .collect();
    assert_eq!(answers, vec![&PracticeUpdate::QuizAnswer { text: structure.answer() }]);
    assert!(session.expected().is_empty());

    // the scheduled reveal still fires but says nothing new
    session.tick(at(t0, 11.0));
    assert!(!rx
        .try_iter()
        .any(|u| matches!(u, PracticeUpdate::QuizAnswer { .. })));
}

#[test]
fn test_quiz_reveal_after_reset_is_dropped() {
    let (mut session, heard, rx) = session_with_memory_sink();
    let t0 = Instant::now();
    session.start_quiz(StructureKind::Mode, t0);
    session.reset();
    heard.clear();
    let _ = rx.try_iter().count();

    session.tick(at(t0, 11.0));
    assert!(rx.try_iter().next().is_none());
    assert!(heard.messages().is_empty());
    assert!(session.quiz().is_none());
}

#[test]
fn test_wrong_quiz_note_is_reported() {
    let (mut session, _probe, rx) = session_with_memory_sink();
    let t0 = Instant::now();
    session.start_quiz(StructureKind::Chord, t0);
    let good = session.quiz().unwrap().good_notes().clone();
    let wrong = (0u8..128).find(|p| !good.contains(p)).unwrap();
    press(&session, wrong, at(t0, 0.2));
    session.tick(at(t0, 0.3));
    assert!(rx
        .try_iter()
        .any(|u| u == PracticeUpdate::QuizNote { pitch: wrong, correct: false }));
}

#[test]
fn test_ambient_stops_cleanly() {
    let (mut session, heard, _rx) = session_with_memory_sink();
    let t0 = Instant::now();
    session.start_ambient(piano_practice::ambient::AmbientStyle::Mixed, t0);
    assert!(session.ambient_running());
    assert!(session.pending_tasks() > 0);
    assert!(!heard.note_ons().is_empty());

    assert!(session.stop_ambient());
    assert_eq!(session.pending_tasks(), 0);
    heard.clear();
    session.tick(at(t0, 600.0));
    assert!(heard.messages().is_empty());
}

// ─── Coordinator ───────────────────────────────────────────────────────────

#[test]
fn test_coordinator_applies_commands_between_ticks() {
    let (tx, rx) = unbounded();
    let mut session = PracticeSession::new(quiet()).with_listener(tx);
    session.replace_timeline(ingest_bytes(&c4_then_e4()).unwrap(), "c4-e4");
    let input = session.input_sender();
    let (cmd_tx, cmd_rx) = unbounded();

    let handle = thread::Builder::new()
        .name("test-coordinator".into())
        .spawn(move || {
            Coordinator::new(session, cmd_rx)
                .with_tick_period(Duration::from_millis(5))
                .run()
        })
        .unwrap();

    cmd_tx.send(Command::Play).unwrap();
    thread::sleep(Duration::from_millis(50));
    input
        .try_send(InputEvent::Note(LiveNote::press(60, 90, Instant::now())))
        .unwrap();
    thread::sleep(Duration::from_millis(100));
    cmd_tx.send(Command::Stop).unwrap();
    cmd_tx.send(Command::Shutdown).unwrap();

    let session = handle.join().unwrap();
    assert_eq!(session.score().score, 1);
    assert_eq!(session.state(), PlaybackState::Stopped);

    let updates: Vec<PracticeUpdate> = rx.try_iter().collect();
    assert!(updates.contains(&PracticeUpdate::PlaybackState { state: PlaybackState::Playing }));
    assert!(updates
        .iter()
        .any(|u| matches!(u, PracticeUpdate::Position { .. })));
}

#[test]
fn test_press_queued_before_pause_is_scored() {
    let mut session = PracticeSession::new(quiet());
    session.replace_timeline(ingest_bytes(&c4_then_e4()).unwrap(), "c4-e4");
    let input = session.input_sender();
    let (cmd_tx, cmd_rx) = unbounded();

    // the ticker never fires, so only commands drive the session
    let handle = thread::spawn(move || {
        Coordinator::new(session, cmd_rx)
            .with_tick_period(Duration::from_secs(600))
            .run()
    });

    cmd_tx.send(Command::Play).unwrap();
    thread::sleep(Duration::from_millis(50));
    input
        .try_send(InputEvent::Note(LiveNote::press(60, 90, Instant::now())))
        .unwrap();
    cmd_tx.send(Command::Pause).unwrap();
    cmd_tx.send(Command::Shutdown).unwrap();

    let session = handle.join().unwrap();
    assert_eq!(session.score().score, 1);
}

#[test]
fn test_coordinator_exits_when_commands_disconnect() {
    let (cmd_tx, cmd_rx) = unbounded::<Command>();
    let handle = thread::spawn(move || Coordinator::new(PracticeSession::new(quiet()), cmd_rx).run());
    drop(cmd_tx);
    let session = handle.join().unwrap();
    assert_eq!(session.state(), PlaybackState::Stopped);
}
