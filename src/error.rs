use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PracticeError {
    #[error("Invalid MIDI file: {0}")]
    FileFormat(String),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("MIDI device error: {0}")]
    Device(String),

    #[error("Invalid state: {0}")]
    State(&'static str),
}

impl PracticeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PracticeError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PracticeError>;
