use crate::config::PracticeConfig;
use crate::types::*;
use crossbeam_channel::Receiver;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::time::{Duration, Instant};

const KEYBOARD_WIDTH: usize = 54;

/// What the terminal dashboard currently shows. Kept separate from the
/// drawing so updates can be folded without a terminal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub source: String,
    pub state: Option<PlaybackState>,
    pub elapsed: f64,
    pub duration: f64,
    pub expected: BTreeSet<u8>,
    /// Held keys per source; one source releasing a key leaves the others lit.
    pub held: BTreeMap<NoteOrigin, BTreeSet<u8>>,
    pub score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub recording: bool,
    /// Last quiz, ambient or error line.
    pub status: String,
}

impl DisplayState {
    pub fn apply(&mut self, update: &PracticeUpdate) {
        match update {
            PracticeUpdate::TimelineLoaded { source, notes, duration } => {
                self.source = source.clone();
                self.duration = *duration;
                self.elapsed = 0.0;
                self.status = format!("Loaded {} notes", notes);
            }
            PracticeUpdate::PlaybackState { state } => self.state = Some(*state),
            PracticeUpdate::Position { elapsed, duration } => {
                self.elapsed = *elapsed;
                self.duration = *duration;
            }
            PracticeUpdate::ExpectedChanged { expected } => {
                self.expected = expected.iter().copied().collect();
            }
            PracticeUpdate::PitchPressed { pitch, origin, .. } => {
                self.held.entry(*origin).or_default().insert(*pitch);
            }
            PracticeUpdate::PitchReleased { pitch, origin } => {
                if let Some(keys) = self.held.get_mut(origin) {
                    keys.remove(pitch);
                }
            }
            PracticeUpdate::Score { score, max_score, percentage } => {
                self.score = *score;
                self.max_score = *max_score;
                self.percentage = *percentage;
            }
            PracticeUpdate::Completed { score, max_score, percentage } => {
                self.score = *score;
                self.max_score = *max_score;
                self.percentage = *percentage;
                self.status = format!("Complete: {:.1}%", percentage);
            }
            PracticeUpdate::RecordingStarted => self.recording = true,
            PracticeUpdate::RecordingStopped { notes } => {
                self.recording = false;
                self.status = format!("Recorded {} events", notes);
            }
            PracticeUpdate::QuizQuestion { text } => self.status = format!("Quiz: {}", text),
            PracticeUpdate::QuizAnswer { text } => self.status = format!("Answer: {}", text),
            PracticeUpdate::QuizNote { pitch, correct } => {
                let mark = if *correct { "✓" } else { "✗" };
                self.status = format!("{} {}", mark, pitch_name(*pitch));
            }
            PracticeUpdate::Ambient { description } => self.status = format!("Ambient: {}", description),
            PracticeUpdate::Error { message } => self.status = format!("Error: {}", message),
        }
    }

    /// Every highlighted key, whatever held it.
    pub fn pressed(&self) -> BTreeSet<u8> {
        self.held.values().flatten().copied().collect()
    }
}

/// Renders a live ASCII dashboard of the practice session.
pub struct ConsoleDisplay {
    rx: Receiver<PracticeUpdate>,
    update_hz: u32,
    span: (u8, u8),
    threshold: u32,
}

impl ConsoleDisplay {
    pub fn new(rx: Receiver<PracticeUpdate>, update_hz: u32, config: &PracticeConfig) -> Self {
        Self {
            rx,
            update_hz,
            span: config.display_span(),
            threshold: config.accuracy_threshold,
        }
    }

    pub fn run(&self) {
        let interval = if self.update_hz == 0 {
            Duration::from_millis(50)
        } else {
            Duration::from_millis((1000 / self.update_hz as u64).max(1))
        };
        let mut view = DisplayState::default();
        let mut last_draw: Option<Instant> = None;
        let mut stdout = io::stdout();

        for update in self.rx.iter() {
            view.apply(&update);
            if last_draw.is_some_and(|t| t.elapsed() < interval) {
                continue;
            }
            last_draw = Some(Instant::now());
            let _ = stdout.write_all(self.render(&view).as_bytes());
            let _ = stdout.flush();
        }
    }

    pub fn render(&self, view: &DisplayState) -> String {
        let mut out = String::new();
        // Clear screen and move cursor home
        out.push_str("\x1b[2J\x1b[H");
        out.push_str("╔══════════════════════════════════════════════════════════╗\n");
        out.push_str("║  PIANO PRACTICE · Live Monitor                           ║\n");
        out.push_str("╠══════════════════════════════════════════════════════════╣\n");

        let state = view.state.map(|s| s.to_string()).unwrap_or_else(|| "---".into());
        out.push_str(&line(&format!("Piece: {}", if view.source.is_empty() { "---" } else { &view.source })));
        out.push_str(&line(&format!(
            "State: {:<10} {:>6.1}s / {:.1}s{}",
            state,
            view.elapsed,
            view.duration,
            if view.recording { "  ● REC" } else { "" }
        )));
        out.push_str(&line(&format!("Progress: {}", make_bar(progress(view), 30))));
        out.push_str(&line(""));

        let target = if view.percentage >= self.threshold as f64 { "✓" } else { " " };
        out.push_str(&line(&format!(
            "Score: {}/{} ({:.1}%) {} target {}%",
            view.score, view.max_score, view.percentage, target, self.threshold
        )));
        out.push_str(&line(""));

        out.push_str(&line(&format!(
            "Keys {}–{}:",
            pitch_name(self.span.0),
            pitch_name(self.span.1)
        )));
        let keys = render_keyboard(self.span, &view.expected, &view.pressed());
        for chunk in keys.chars().collect::<Vec<_>>().chunks(KEYBOARD_WIDTH) {
            out.push_str(&line(&chunk.iter().collect::<String>()));
        }
        let expected: Vec<String> = view.expected.iter().map(|&p| pitch_name(p)).collect();
        out.push_str(&line(&format!("Expected: {}", expected.join(" "))));
        out.push_str(&line(""));
        out.push_str(&line(&view.status));
        out.push_str("╚══════════════════════════════════════════════════════════╝\n");
        out
    }
}

fn progress(view: &DisplayState) -> f64 {
    if view.duration <= 0.0 {
        0.0
    } else {
        (view.elapsed / view.duration).clamp(0.0, 1.0)
    }
}

/// One boxed line, padded by char count so multi-byte glyphs line up.
fn line(text: &str) -> String {
    let body: String = text.chars().take(KEYBOARD_WIDTH + 2).collect();
    let pad = (KEYBOARD_WIDTH + 2).saturating_sub(body.chars().count());
    format!("║  {}{}║\n", body, " ".repeat(pad))
}

fn make_bar(val: f64, width: usize) -> String {
    let filled = (val * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// One cell per key in `span` (inclusive): `█` pressed and expected,
/// `▒` pressed only, `░` expected only, `·` idle.
pub fn render_keyboard(span: (u8, u8), expected: &BTreeSet<u8>, pressed: &BTreeSet<u8>) -> String {
    let (low, high) = span;
    if low > high {
        return String::new();
    }
    (low..=high)
        .map(|p| match (pressed.contains(&p), expected.contains(&p)) {
            (true, true) => '█',
            (true, false) => '▒',
            (false, true) => '░',
            (false, false) => '·',
        })
        .collect()
}
