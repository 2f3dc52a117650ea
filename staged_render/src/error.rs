//! Error types for the staged renderer
//!
//! This module defines the error types used throughout the pipeline,
//! including backend failures, lookups, range resolution and geometry.

use std::fmt;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (Vulkan, OpenGL, etc.)
    BackendError(String),

    /// Invalid resource (render target, queue, stage, etc.)
    InvalidResource(String),

    /// Initialization failed (stage, target, pipeline)
    InitializationFailed(String),

    /// A named or indexed item does not exist
    NotFound(String),

    /// A queue range could not be resolved
    InvalidRange(String),

    /// Geometry input that has no well-defined result (e.g. a degenerate basis)
    DegenerateGeometry(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::InvalidRange(msg) => write!(f, "Invalid range: {}", msg),
            Error::DegenerateGeometry(msg) => write!(f, "Degenerate geometry: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
