//! Practice settings: a read-only JSON file with per-field defaults.
//!
//! The file is never written back by the session; `save` exists so a
//! template can be generated from the binary.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeConfig {
    /// Coordinator tick period. 30–50 ms keeps scoring responsive.
    pub tick_ms: u64,
    /// Percent of original speed. Display only.
    pub tempo_scale: u32,
    /// Target percentage shown next to the score. Display only.
    pub accuracy_threshold: u32,
    /// First key of the displayed keyboard span.
    pub lowest_pitch: u8,
    /// Number of keys in the displayed span.
    pub pitch_count: u8,
    /// Echo live input to the output sinks.
    pub midi_thru: bool,
    pub export_ticks_per_quarter: u16,
    /// Microseconds per quarter note written into exported recordings.
    pub export_tempo: u32,
    /// Seconds before a quiz answer is revealed.
    pub quiz_reveal_secs: f64,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            tick_ms: 30,
            tempo_scale: 100,
            accuracy_threshold: 80,
            lowest_pitch: 36,
            pitch_count: 48,
            midi_thru: true,
            export_ticks_per_quarter: 480,
            export_tempo: 500_000,
            quiz_reveal_secs: 10.0,
        }
    }
}

impl PracticeConfig {
    /// Load from a JSON file. Returns None if file is absent or malformed.
    pub fn load(path: &Path) -> Option<Self> {
        let data = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(c) => {
                info!("Loaded config from {:?}", path);
                Some(c)
            }
            Err(e) => {
                warn!("Failed to parse config file {:?}: {}", path, e);
                None
            }
        }
    }

    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Some(c) => c,
            None => {
                if !path.exists() {
                    warn!("Config file {:?} not found, using defaults", path);
                }
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        std::fs::write(path, json)?;
        info!("Config saved to {:?}", path);
        Ok(())
    }

    /// Inclusive pitch range of the displayed keyboard, clipped to 0..=127.
    pub fn display_span(&self) -> (u8, u8) {
        let low = self.lowest_pitch.min(127);
        let count = self.pitch_count.max(1) as u16;
        let high = (low as u16 + count - 1).min(127) as u8;
        (low, high)
    }

    pub fn in_display_span(&self, pitch: u8) -> bool {
        let (low, high) = self.display_span();
        (low..=high).contains(&pitch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let cfg: PracticeConfig = serde_json::from_str(r#"{"tick_ms": 45, "midi_thru": false}"#).unwrap();
        assert_eq!(cfg.tick_ms, 45);
        assert!(!cfg.midi_thru);
        assert_eq!(cfg.export_ticks_per_quarter, 480);
        assert_eq!(cfg.quiz_reveal_secs, 10.0);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("practice.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(PracticeConfig::load(&path).is_none());
        assert_eq!(PracticeConfig::load_or_default(&path), PracticeConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("practice.json");
        let cfg = PracticeConfig { lowest_pitch: 48, pitch_count: 25, ..Default::default() };
        cfg.save(&path).unwrap();
        assert_eq!(PracticeConfig::load(&path), Some(cfg));
    }

    #[test]
    fn test_display_span_clipped() {
        let cfg = PracticeConfig { lowest_pitch: 120, pitch_count: 48, ..Default::default() };
        assert_eq!(cfg.display_span(), (120, 127));
        assert!(PracticeConfig::default().in_display_span(83));
        assert!(!PracticeConfig::default().in_display_span(84));
    }
}
