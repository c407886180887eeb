//! Error types for latfold.
//!
//! Hard failures only: invalid input sequences, corrupted board state, and
//! persistence problems. Rejected Monte Carlo proposals are a normal outcome
//! and never surface here.

use thiserror::Error;

/// Unified error type for board and simulation operations.
#[derive(Error, Debug)]
pub enum LatticeError {
    /// Sequence longer than the x extent of the board.
    #[error("Board is too small for sequence")]
    BoardTooSmall,

    /// Target cell already holds a unit.
    #[error("Cell occupied")]
    CellOccupied,

    /// Character outside the `acgu` alphabet.
    #[error("Sequence is not RNA")]
    NotRna,

    /// Two bases that are neither complementary nor wobble-paired.
    #[error("Not a basepair")]
    NotABasepair,

    /// Board state audit failure (first violation found).
    #[error("Board validation failed: {0}")]
    Validation(String),

    /// I/O errors (board files, matrix output).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LatticeError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        LatticeError::Validation(message.into())
    }
}

/// Result type alias for latfold operations.
pub type Result<T> = std::result::Result<T, LatticeError>;
