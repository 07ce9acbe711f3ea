//! Error types for bezier_qp.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for problem formulation.
#[derive(Debug, Error)]
pub enum OptError {
    /// More boundary constraints than the curve has control points to absorb.
    #[error("too many boundary constraints ({active}) for {control_points} control points")]
    TooManyConstraints {
        active: usize,
        control_points: usize,
    },

    /// A derivative boundary condition is set without the lower-order ones.
    #[error("boundary conditions are not prefix-closed: {0}")]
    BoundaryOrder(String),

    /// Shape mismatch.
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// Index past the end of an indexed collection.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Invalid problem specification.
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// Curve time outside of its domain.
    #[error("time {time} is outside of the curve domain [0, {duration}]")]
    TimeOutOfRange { time: f64, duration: f64 },

    /// Problem file could not be opened or read.
    #[error("cannot read problem file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure on a reader or writer.
    #[error("I/O error: {0}")]
    Stream(#[from] std::io::Error),

    /// Malformed problem file contents.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl OptError {
    pub(crate) fn shape(expected: impl ToString, got: impl ToString) -> Self {
        OptError::ShapeMismatch {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}

/// Result type for bezier_qp operations.
pub type Result<T> = std::result::Result<T, OptError>;
