use piano_practice::composer::{lyrics_melody, SegmentKind, SegmentParams, SegmentStyle, SongComposer};
use piano_practice::config::PracticeConfig;
use piano_practice::console_display;
use piano_practice::coordinator::{self, Command};
#[cfg(feature = "midi-io")]
use piano_practice::midi_port;
use piano_practice::ports::LogSink;
use piano_practice::rng::Rng;
use piano_practice::session::PracticeSession;
use piano_practice::types::*;

use clap::Parser;
use crossbeam_channel::{bounded, unbounded, Sender};
use log::{error, info, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "piano-practice")]
#[command(about = "Piano practice scheduler: play along with a MIDI file and get scored")]
struct Cli {
    /// MIDI file to load at startup
    #[arg(long)]
    file: Option<PathBuf>,

    /// JSON config file (missing or invalid → defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the default config to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Tick period in milliseconds (overrides config)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Enable console display (terminal TUI)
    #[arg(long)]
    console: bool,

    /// Console display refresh rate (Hz)
    #[arg(long, default_value_t = 20)]
    display_hz: u32,

    /// Print every update to stdout as a JSON line
    #[arg(long)]
    dump: bool,

    /// MIDI input port name filter (needs the midi-io feature)
    #[arg(long)]
    input: Option<String>,

    /// MIDI output port name filter (needs the midi-io feature)
    #[arg(long)]
    output: Option<String>,

    /// List MIDI ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Generated piece to load instead of a file: "song"
    #[arg(long)]
    demo: Option<String>,

    /// Build the piece from lyrics instead of a file
    #[arg(long)]
    lyrics: Option<String>,

    /// Seed for generated pieces, quizzes and ambient
    #[arg(long)]
    seed: Option<u64>,

    /// Start practice immediately
    #[arg(long)]
    play: bool,

    /// Feed the piece's own notes back as live input (scripted learner)
    #[arg(long)]
    autoplay: bool,
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let cli = Cli::parse();

    if let Some(path) = &cli.write_config {
        if let Err(e) = PracticeConfig::default().save(path) {
            error!("Could not write config: {}", e);
        }
        return;
    }

    if cli.list_ports {
        list_ports();
        return;
    }

    let mut config = match &cli.config {
        Some(path) => PracticeConfig::load_or_default(path),
        None => PracticeConfig::default(),
    };
    if let Some(ms) = cli.tick_ms {
        config.tick_ms = ms;
    }
    let mut rng = match cli.seed {
        Some(seed) => Rng::new_with_seed(seed as u128),
        None => Rng::default(),
    };

    info!("═══════════════════════════════════════════════");
    info!("  PIANO PRACTICE v{}", env!("CARGO_PKG_VERSION"));
    info!("  Tick: {} ms", config.tick_ms);
    let (low, high) = config.display_span();
    info!("  Keys: {}–{}", pitch_name(low), pitch_name(high));
    if cli.console { info!("  UI: Console TUI"); }
    if cli.dump { info!("  UI: JSON lines on stdout"); }
    info!("═══════════════════════════════════════════════");

    let mut handles = Vec::new();
    let mut session = PracticeSession::new(config.clone())
        .with_rng(Rng::new_with_seed(rng.rand_u64() as u128));

    // ─── Display collaborators ──────────────────────────────────────
    if cli.console {
        let (tx, rx) = bounded::<PracticeUpdate>(256);
        session = session.with_listener(tx);
        let hz = cli.display_hz;
        let cfg = config.clone();
        handles.push(thread::Builder::new().name("display".into()).spawn(move || {
            console_display::ConsoleDisplay::new(rx, hz, &cfg).run();
        }).unwrap());
    }

    if cli.dump {
        let (tx, rx) = bounded::<PracticeUpdate>(1024);
        session = session.with_listener(tx);
        handles.push(thread::Builder::new().name("dump".into()).spawn(move || {
            let stdout = io::stdout();
            for update in rx.iter() {
                match serde_json::to_string(&update) {
                    Ok(json) => {
                        let mut out = stdout.lock();
                        let _ = writeln!(out, "{}", json);
                    }
                    Err(e) => warn!("Update not serializable: {}", e),
                }
            }
        }).unwrap());
    }

    // ─── Sinks and sources ──────────────────────────────────────────
    session = attach_output(session, cli.output.as_deref());
    #[cfg(feature = "midi-io")]
    let _input = cli.input.as_deref().and_then(|filter| {
        match midi_port::MidiInputSource::connect(filter, session.input_sender()) {
            Ok(source) => {
                info!("MIDI input: {}", source.port_name());
                Some(source)
            }
            Err(e) => {
                error!("MIDI input unavailable: {}", e);
                None
            }
        }
    });
    #[cfg(not(feature = "midi-io"))]
    if cli.input.is_some() {
        error!("MIDI input requires the 'midi-io' feature");
    }

    // ─── Initial piece ──────────────────────────────────────────────
    if let Some(path) = &cli.file {
        if let Err(e) = session.load_file(path) {
            error!("Could not load {:?}: {}", path, e);
        }
    } else if let Some(text) = &cli.lyrics {
        session.replace_timeline(lyrics_melody(text, &mut rng), "lyrics");
    } else if let Some(demo) = &cli.demo {
        match demo.as_str() {
            "song" => session.replace_timeline(demo_song(&mut rng), "demo song"),
            other => warn!("Unknown demo {:?}", other),
        }
    }

    if cli.autoplay {
        let events = session.timeline().events().to_vec();
        let tx = session.input_sender();
        let lead = Duration::from_millis(config.tick_ms * 2);
        handles.push(thread::Builder::new().name("autoplay".into()).spawn(move || {
            autoplay(&events, &tx, lead);
        }).unwrap());
    }

    // ─── Commands ───────────────────────────────────────────────────
    let (cmd_tx, cmd_rx) = unbounded::<Command>();
    if cli.play || cli.autoplay {
        let _ = cmd_tx.send(Command::Play);
    }
    thread::Builder::new().name("stdin".into()).spawn(move || {
        read_commands(cmd_tx);
    }).unwrap();

    // ─── Coordinator ────────────────────────────────────────────────
    let runner = coordinator::Coordinator::new(session, cmd_rx);
    let coord = thread::Builder::new().name("coordinator".into()).spawn(move || {
        runner.run()
    }).unwrap();

    info!("Type commands (play, pause, resume, stop, preview, record, save <path>, export <path>, quiz [chord|mode], ambient [style], quit).");
    match coord.join() {
        Ok(session) => {
            let score = session.score();
            info!("Final score: {}/{} ({:.1}%)", score.score, score.max_score, score.percentage());
            // Dropping the session closes the listener channels.
            drop(session);
        }
        Err(_) => error!("Coordinator thread panicked"),
    }
    for h in handles {
        let _ = h.join();
    }
}

/// One command per line until EOF or `quit`.
fn read_commands(tx: Sender<Command>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        match coordinator::parse_command(&line) {
            Some(cmd) => {
                let quit = cmd == Command::Shutdown;
                if tx.send(cmd).is_err() || quit {
                    return;
                }
            }
            None => warn!("Unknown command: {}", line.trim()),
        }
    }
}

/// Presses the timeline's own notes as if a learner played them.
fn autoplay(events: &[NoteEvent], tx: &Sender<InputEvent>, lead: Duration) {
    let start = Instant::now() + lead;
    for e in events {
        let at = start + Duration::from_secs_f64(e.time());
        let now = Instant::now();
        if at > now {
            thread::sleep(at - now);
        }
        let note = if e.is_on() {
            LiveNote::press(e.pitch(), e.velocity(), Instant::now())
        } else {
            LiveNote::release(e.pitch(), Instant::now())
        };
        if tx.try_send(InputEvent::Note(note)).is_err() {
            warn!("Autoplay: input queue full or closed");
            return;
        }
    }
    info!("Autoplay finished");
}

fn demo_song(rng: &mut Rng) -> piano_practice::timeline::Timeline {
    let mut composer = SongComposer::new(rng.index(12), rng.clone());
    for (kind, style, duration) in [
        (SegmentKind::Intro, SegmentStyle::Static, 8.0),
        (SegmentKind::Verse, SegmentStyle::Rising, 12.0),
        (SegmentKind::Chorus, SegmentStyle::Mixed, 12.0),
        (SegmentKind::Outro, SegmentStyle::Falling, 8.0),
    ] {
        composer.add_segment(SegmentParams { kind, style, duration, position: 12 });
    }
    composer.song_timeline()
}

#[cfg(feature = "midi-io")]
fn attach_output(session: PracticeSession, filter: Option<&str>) -> PracticeSession {
    match filter.map(midi_port::MidiOutputSink::connect) {
        Some(Ok(sink)) => {
            info!("MIDI output: {}", sink.port_name());
            session.with_sink(sink)
        }
        Some(Err(e)) => {
            error!("MIDI output unavailable: {}, logging notes instead", e);
            session.with_sink(LogSink::new("out"))
        }
        None => session.with_sink(LogSink::new("out")),
    }
}

#[cfg(not(feature = "midi-io"))]
fn attach_output(session: PracticeSession, filter: Option<&str>) -> PracticeSession {
    if filter.is_some() {
        error!("MIDI output requires the 'midi-io' feature");
    }
    session.with_sink(LogSink::new("out"))
}

#[cfg(feature = "midi-io")]
fn list_ports() {
    match midi_port::list_ports() {
        Ok((inputs, outputs)) => {
            println!("Inputs:");
            for name in inputs {
                println!("  {}", name);
            }
            println!("Outputs:");
            for name in outputs {
                println!("  {}", name);
            }
        }
        Err(e) => error!("Could not list ports: {}", e),
    }
}

#[cfg(not(feature = "midi-io"))]
fn list_ports() {
    error!("Listing ports requires the 'midi-io' feature");
}
