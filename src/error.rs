//! Error types for the rules engine and its display collaborators.
//!
//! A draw is not an error: it is reported as [`crate::board::MoveOutcome::Draw`].

use derive_more::{Display, Error, From};

use crate::moves::Move;

/// Failure talking to a display collaborator.
#[derive(Debug, Display, Error, From)]
pub enum DisplayError {
    #[display("display I/O failed: {_0}")]
    Io(std::io::Error),

    #[display("malformed display message: {_0}")]
    Json(serde_json::Error),

    /// The input stream ended before a selection was made.
    #[display("display input closed")]
    #[from(ignore)]
    Closed,

    /// The display cannot collect a move (headless mode).
    #[display("display cannot select moves")]
    #[from(ignore)]
    NoInput,

    #[display("unexpected display message: {reason}")]
    #[from(ignore)]
    Malformed { reason: String },
}

#[derive(Debug, Display, Error, From)]
pub enum GameError {
    /// A player returned a move outside the legal set.
    #[display("illegal move requested: {mv}")]
    #[from(ignore)]
    IllegalMove {
        #[error(not(source))]
        mv: Move,
    },

    /// A player was asked to move with no candidates.
    #[display("no move available")]
    #[from(ignore)]
    NoMoveAvailable,

    #[display("{_0}")]
    Display(DisplayError),
}
