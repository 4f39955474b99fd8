//! Error types for the capture pipeline.

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, CaptureError>;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The sample source could not be opened or started.
    #[error("Sample source unavailable: {0}")]
    SourceUnavailable(String),

    /// A capture session is already running.
    #[error("Capture already running; stop it first")]
    AlreadyRunning,

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A band table has unordered, empty or overlapping bands.
    #[error("Invalid band table: {0}")]
    InvalidBands(String),

    /// The capture worker could not be spawned.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
