//! Error types for the Tessera mesh core
//!
//! Device failures are surfaced by the `GraphicsDevice` implementation and
//! propagated unchanged. Everything else is a rejected precondition on mesh
//! data (vertex format, bone hierarchy, index ranges).

use std::fmt;

/// Result type for Tessera operations
pub type Result<T> = std::result::Result<T, Error>;

/// Tessera errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error reported by the graphics device
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (buffer size, index range, vertex data, ...)
    InvalidResource(String),

    /// Vertex format without terminator or with too many attributes
    InvalidVertexFormat(String),

    /// Bone parents out of order, bone index out of range, too many bones
    InvalidBoneHierarchy(String),

    /// The graphics device lacks a capability the call needs
    Unsupported(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InvalidVertexFormat(msg) => write!(f, "Invalid vertex format: {}", msg),
            Error::InvalidBoneHierarchy(msg) => write!(f, "Invalid bone hierarchy: {}", msg),
            Error::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
