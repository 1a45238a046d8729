//! Move notation parse errors.

use std::fmt;
use thiserror::Error;

/// Why a piece of move text could not be turned into a move.
///
/// The set is closed: every notation parser in the workspace reports one of
/// these kinds, so callers can match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// The input was empty.
    NoInput,
    /// The input contains characters no notation uses.
    InvalidInput,
    /// The text looked like SAN but matched none of its shapes.
    UnrecognizedAlgebraicNotation,
    /// A piece letter, disambiguator and target did not fit together.
    UnmatchedMovePattern,
    /// No destination square could be read.
    TargetSquareUndefined,
    /// No piece of the moving side can reach the destination.
    TargetSquareUnreachable,
    /// The piece letter names no piece kind.
    MovedPieceUndefined,
    /// More than one piece fits the notation.
    MoreThanOnePossibleMovedPiece,
    /// A five character coordinate move has an invalid promotion letter.
    CannotParseFiveCharacterMove,
    /// A capture names no piece able to take on the target.
    CapturingPieceUndefined,
    /// The disambiguating square of a capture is not a square.
    CannotParseCapturerSquare,
    /// The origin square holds a piece of the other side.
    IncorrectPieceOnSquare,
    /// A capture marker appears where no capture can be read.
    UnableToParseCapture,
    /// No piece of the moving side fits the notation.
    UnableToFindMovablePiece,
    /// The origin square of a coordinate move is not a square.
    UnableToParseSourceSquare,
    /// The destination square of a coordinate move is not a square.
    UnableToParseTargetSquare,
    /// The notation disagrees with the board (capture on an empty square,
    /// quiet move onto an occupied one).
    BoardMismatch,
    /// The origin square of a coordinate move is empty.
    MissingOriginSquare,
    /// The move is well formed but illegal in the position.
    IllegalMove,
    /// Castling was requested but is not allowed.
    InvalidCastle,
    /// The text is neither coordinate notation nor SAN.
    UnknownFormat,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ParseErrorKind::NoInput => "no input",
            ParseErrorKind::InvalidInput => "invalid input",
            ParseErrorKind::UnrecognizedAlgebraicNotation => "unrecognized algebraic notation",
            ParseErrorKind::UnmatchedMovePattern => "unmatched move pattern",
            ParseErrorKind::TargetSquareUndefined => "target square undefined",
            ParseErrorKind::TargetSquareUnreachable => "target square unreachable",
            ParseErrorKind::MovedPieceUndefined => "moved piece undefined",
            ParseErrorKind::MoreThanOnePossibleMovedPiece => "more than one possible moved piece",
            ParseErrorKind::CannotParseFiveCharacterMove => "cannot parse five character move",
            ParseErrorKind::CapturingPieceUndefined => "capturing piece undefined",
            ParseErrorKind::CannotParseCapturerSquare => "cannot parse capturer square",
            ParseErrorKind::IncorrectPieceOnSquare => "incorrect piece on square",
            ParseErrorKind::UnableToParseCapture => "unable to parse capture",
            ParseErrorKind::UnableToFindMovablePiece => "unable to find movable piece",
            ParseErrorKind::UnableToParseSourceSquare => "unable to parse source square",
            ParseErrorKind::UnableToParseTargetSquare => "unable to parse target square",
            ParseErrorKind::BoardMismatch => "notation does not match the board",
            ParseErrorKind::MissingOriginSquare => "no piece on origin square",
            ParseErrorKind::IllegalMove => "illegal move",
            ParseErrorKind::InvalidCastle => "invalid castle",
            ParseErrorKind::UnknownFormat => "unknown move format",
        };
        f.write_str(text)
    }
}

/// A typed parse failure together with the text that caused it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {input:?}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub input: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, input: impl Into<String>) -> Self {
        ParseError {
            kind,
            input: input.into(),
        }
    }
}
