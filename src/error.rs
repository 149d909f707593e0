//! Crate-level error type. Follows the same hand-rolled `Display` +
//! `std::error::Error` idiom as [`crate::board::error`] rather than pulling
//! in `thiserror`.

use std::fmt;

use crate::board::{FenError, Move, MoveParseError};

/// Errors the engine surfaces to its caller.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CoreError {
    /// Malformed FEN or move text.
    Parse(ParseSource),
    /// `mv` does not match any entry of `legal_moves()` for the position it
    /// was played against. The position is left unchanged.
    IllegalMove(Move),
    /// Reserved for a future algebraic-notation layer that can't yet tell
    /// two matching moves apart. The CORE never raises this itself.
    AmbiguousMove(String),
    /// A cached field (hash, occupancy, `their_attacks`, ...) disagreed with
    /// its from-scratch recomputation. Always a logic bug, never raised for
    /// caller-supplied bad input.
    InvariantViolation(String),
    /// Reserved for a future command-loop layer describing a protocol
    /// precondition that didn't hold. The CORE never raises this itself.
    ProtocolAssumption(String),
}

/// Which parser rejected the input.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseSource {
    Fen(FenError),
    Move(MoveParseError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Parse(ParseSource::Fen(e)) => write!(f, "{e}"),
            CoreError::Parse(ParseSource::Move(e)) => write!(f, "{e}"),
            CoreError::IllegalMove(mv) => write!(f, "move {mv} is not legal in this position"),
            CoreError::AmbiguousMove(notation) => {
                write!(f, "'{notation}' does not uniquely identify a move")
            }
            CoreError::InvariantViolation(detail) => {
                write!(f, "internal invariant violated: {detail}")
            }
            CoreError::ProtocolAssumption(detail) => {
                write!(f, "protocol precondition violated: {detail}")
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<FenError> for CoreError {
    fn from(e: FenError) -> Self {
        CoreError::Parse(ParseSource::Fen(e))
    }
}

impl From<MoveParseError> for CoreError {
    fn from(e: MoveParseError) -> Self {
        CoreError::Parse(ParseSource::Move(e))
    }
}
