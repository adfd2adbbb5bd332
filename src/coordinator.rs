use crate::ambient::AmbientStyle;
use crate::session::PracticeSession;
use crate::theory::StructureKind;
use crossbeam_channel::{select, tick, Receiver};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Requests from the outside world: stdin, a UI, tests.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(PathBuf),
    Play,
    Pause,
    Resume,
    Stop,
    Preview,
    /// Start a take, or stop the running one.
    Record,
    SaveRecording(PathBuf),
    /// Write the loaded piece, generated or not, to a MIDI file.
    SaveTimeline(PathBuf),
    Quiz(StructureKind),
    ReplayQuiz,
    Ambient(AmbientStyle),
    StopAmbient,
    Audition,
    Reset,
    Shutdown,
}

/// Parse one command line, e.g. `load song.mid`, `quiz mode`, `ambient chords`.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let cmd = match word.to_ascii_lowercase().as_str() {
        "load" | "open" if !rest.is_empty() => Command::Load(PathBuf::from(rest)),
        "play" | "start" => Command::Play,
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "stop" => Command::Stop,
        "preview" => Command::Preview,
        "record" | "rec" => Command::Record,
        "save" if !rest.is_empty() => Command::SaveRecording(PathBuf::from(rest)),
        "export" if !rest.is_empty() => Command::SaveTimeline(PathBuf::from(rest)),
        "quiz" => match rest.to_ascii_lowercase().as_str() {
            "" | "chord" | "chords" => Command::Quiz(StructureKind::Chord),
            "mode" | "modes" => Command::Quiz(StructureKind::Mode),
            _ => return None,
        },
        "replay" => Command::ReplayQuiz,
        "ambient" if rest.is_empty() => Command::Ambient(AmbientStyle::Mixed),
        "ambient" if rest.eq_ignore_ascii_case("stop") => Command::StopAmbient,
        "ambient" => Command::Ambient(rest.parse().ok()?),
        "audition" | "listen" => Command::Audition,
        "reset" => Command::Reset,
        "quit" | "exit" | "q" => Command::Shutdown,
        _ => return None,
    };
    Some(cmd)
}

/// Drives a [`PracticeSession`]: ticks it on a fixed period and applies
/// commands between ticks. Runs until `Shutdown` or until every command
/// sender has been dropped.
pub struct Coordinator {
    session: PracticeSession,
    commands: Receiver<Command>,
    tick_period: Duration,
}

impl Coordinator {
    pub fn new(session: PracticeSession, commands: Receiver<Command>) -> Self {
        let tick_period = Duration::from_millis(session.config().tick_ms.max(1));
        Self {
            session,
            commands,
            tick_period,
        }
    }

    /// Override the tick period from the config.
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period.max(Duration::from_millis(1));
        self
    }

    pub fn session(&self) -> &PracticeSession {
        &self.session
    }

    /// Returns the session once closed, for inspection.
    pub fn run(mut self) -> PracticeSession {
        info!("Coordinator running (tick {} ms)", self.tick_period.as_millis());
        let ticker = tick(self.tick_period);
        let mut tick_count: u64 = 0;

        loop {
            select! {
                recv(ticker) -> msg => {
                    let now = msg.unwrap_or_else(|_| Instant::now());
                    self.session.tick(now);
                    tick_count += 1;
                    if tick_count % 1000 == 0 {
                        debug!("Coordinator: {} ticks", tick_count);
                    }
                }
                recv(self.commands) -> msg => match msg {
                    Ok(Command::Shutdown) => break,
                    Ok(cmd) => {
                        // input queued before the command is judged under the old state
                        let now = Instant::now();
                        self.session.tick(now);
                        self.apply(cmd, now);
                    }
                    Err(_) => {
                        debug!("Command channel closed");
                        break;
                    }
                },
            }
        }

        self.session.close();
        info!("Coordinator shutting down after {} ticks", tick_count);
        self.session
    }

    fn apply(&mut self, cmd: Command, now: Instant) {
        debug!("Command: {:?}", cmd);
        let session = &mut self.session;
        match cmd {
            Command::Load(path) => {
                if let Err(e) = session.load_file(&path) {
                    error!("Could not load {:?}: {}", path, e);
                }
            }
            Command::Play => {
                session.start(now);
            }
            Command::Pause => {
                session.pause(now);
            }
            Command::Resume => {
                session.resume(now);
            }
            Command::Stop => {
                session.stop();
            }
            Command::Preview => {
                session.toggle_preview(now);
            }
            Command::Record => {
                if session.is_recording() {
                    session.stop_recording();
                } else {
                    session.start_recording(now);
                }
            }
            Command::SaveRecording(path) => match session.export_recording(&path) {
                Ok(n) => info!("Saved {} events to {:?}", n, path),
                Err(e) => warn!("Could not save recording: {}", e),
            },
            Command::SaveTimeline(path) => match session.export_timeline(&path) {
                Ok(n) => info!("Saved {} events to {:?}", n, path),
                Err(e) => warn!("Could not save piece: {}", e),
            },
            Command::Quiz(kind) => {
                let question = session.start_quiz(kind, now);
                info!("Play: {}", question);
            }
            Command::ReplayQuiz => {
                session.replay_quiz(now);
            }
            Command::Ambient(style) => session.start_ambient(style, now),
            Command::StopAmbient => {
                session.stop_ambient();
            }
            Command::Audition => {
                session.audition();
            }
            Command::Reset => session.reset(),
            Command::Shutdown => {}
        }
    }
}
