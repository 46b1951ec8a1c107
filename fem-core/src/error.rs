//! Error types for mesh and element operations.

use thiserror::Error;

/// Result type alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring, ingesting or building a mesh.
///
/// Index-out-of-range access on nodes, coordinates, integration points or
/// local matrices is a contract violation and panics instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown element type, unsupported dimension, malformed condition file.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connectivity index out of range, wrong row length, count mismatch.
    #[error("topology error: {0}")]
    Topology(String),

    /// Mesh lifecycle errors.
    #[error("mesh error: {0}")]
    Mesh(String),

    /// Element-related errors.
    #[error("element error: {0}")]
    Element(String),

    /// Singular Jacobian (degenerate element geometry).
    #[error("singular matrix: {0}")]
    SingularMatrix(String),

    /// I/O errors while reading a condition file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
