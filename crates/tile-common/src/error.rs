//! Error types for the tile pyramid crates.

use std::path::PathBuf;
use thiserror::Error;

use crate::bbox::BboxParseError;

/// Result type alias using TileError.
pub type TileResult<T> = Result<T, TileError>;

/// Primary error type for pyramid generation.
///
/// Per-tile render failures are not represented here; they are reported on
/// the tile's completion record and never abort the run.
#[derive(Debug, Error)]
pub enum TileError {
    // === Input Errors ===
    #[error("Invalid zoom range: max zoom {max} is below min zoom {min}")]
    InvalidZoomRange { min: u32, max: u32 },

    #[error("Zoom level {zoom} outside projection levels 0..{levels}")]
    ZoomOutOfRange { zoom: u32, levels: u32 },

    #[error("Malformed bounding box: {0}")]
    MalformedBoundingBox(#[from] BboxParseError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Storage Errors ===
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Worker Pool Errors ===
    #[error("Worker {worker} failed to start: {message}")]
    WorkerStartup { worker: usize, message: String },

    #[error("Worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("Work queue closed before all jobs were dispatched")]
    QueueClosed,
}

impl TileError {
    /// Whether the error was caused by caller input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            TileError::InvalidZoomRange { .. }
                | TileError::ZoomOutOfRange { .. }
                | TileError::MalformedBoundingBox(_)
                | TileError::InvalidConfig(_)
        )
    }
}
