use thiserror::Error;

/// Errors raised while loading, saving or editing a session.
///
/// The per-frame pipeline never produces these: mapping, viewport and
/// annotation resolution degrade to identity or empty results instead.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode RON: {0}")]
    Decode(#[from] ron::error::SpannedError),

    #[error("Failed to encode RON: {0}")]
    Encode(#[from] ron::Error),

    #[error("Unknown sync point: {0}")]
    UnknownSyncPoint(String),

    #[error("Unknown annotation: {0}")]
    UnknownAnnotation(String),

    #[error("Unknown track: {0}")]
    UnknownTrack(usize),

    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    #[error("Failed to load score '{name}': {message}")]
    ScoreLoad { name: String, message: String },

    #[error("Invalid project id: '{0}'")]
    InvalidProjectId(String),

    #[error("Media file must be a bare file name: '{0}'")]
    InvalidMediaFile(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
