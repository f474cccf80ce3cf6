use thiserror::Error;

/// Custom error types for probe-core.
///
/// Only fatal conditions are represented here. Analyzer tools that are
/// missing, crash, or time out never surface as errors; they are recorded
/// in the per-tool sections of the final record instead.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for probe operations
pub type ProbeResult<T> = std::result::Result<T, ProbeError>;
