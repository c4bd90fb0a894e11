//! Error types for Wayward.

use crate::ids::PathId;
use thiserror::Error;

/// Top-level error type for Wayward operations.
#[derive(Debug, Error)]
pub enum WaywardError {
    /// Waypoint path errors
    #[error("Path error: {0}")]
    Path(#[from] PathError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Waypoint path errors.
#[derive(Debug, Error)]
pub enum PathError {
    /// No path registered under this id
    #[error("Unknown {0}")]
    UnknownPath(PathId),

    /// Path has no nodes
    #[error("{0} has no waypoints")]
    EmptyPath(PathId),

    /// Path registered twice in one load
    #[error("Duplicate {0}")]
    Duplicate(PathId),

    /// Path file could not be parsed
    #[error("Failed to parse path file: {0}")]
    Parse(String),

    /// Path file could not be read
    #[error("Failed to read path file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Wayward operations.
pub type WaywardResult<T> = Result<T, WaywardError>;
