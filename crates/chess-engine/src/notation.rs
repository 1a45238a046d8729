//! Reading move text against a board.
//!
//! Coordinate text (`e2e4`) is checked here; SAN goes through
//! [`crate::san`]. [`parse_move`] picks between them.

use crate::board::{Board, CastleSide};
use crate::record::Candidate;
use crate::san::{self, SanToken};
use chess_core::{EngineMove, ParseError, ParseErrorKind, Piece};
use serde::{Deserialize, Serialize};

/// Which notation move text is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveFormat {
    /// Long-coordinate text such as `e2e4` or `e7e8q`.
    Engine,
    /// Standard Algebraic Notation.
    San,
    /// Coordinate text if it has that shape, SAN otherwise.
    #[default]
    Auto,
}

/// Parses one move for the side to move.
pub fn parse_move(board: &mut Board, text: &str, format: MoveFormat) -> Result<SanToken, ParseError> {
    let text = text.trim();
    match format {
        MoveFormat::Engine => parse_engine(board, text).map(SanToken::Move),
        MoveFormat::San => san::parse_san(board, text),
        MoveFormat::Auto => {
            if EngineMove::looks_like(text) {
                parse_engine(board, text).map(SanToken::Move)
            } else if text.is_empty() || text.chars().all(|c| san::is_san_char(c) || "+#!?/*½".contains(c)) {
                san::parse_san(board, text)
            } else {
                Err(ParseError::new(ParseErrorKind::UnknownFormat, text))
            }
        }
    }
}

/// Parses long-coordinate text for the side to move.
///
/// A king moving two files, or onto its own castling rook, is read as
/// castling.
pub fn parse_engine(board: &mut Board, text: &str) -> Result<Candidate, ParseError> {
    let err = |kind| ParseError::new(kind, text);
    let m = EngineMove::parse(text)?;

    let (piece, color) = board
        .piece_at(m.from)
        .ok_or_else(|| err(ParseErrorKind::MissingOriginSquare))?;
    if color != board.side_to_move() {
        return Err(err(ParseErrorKind::IncorrectPieceOnSquare));
    }

    if piece == Piece::King && m.from.rank() == m.to.rank() {
        if let Some(side) = castle_side(board, &m) {
            if m.promotion.is_some() {
                return Err(err(ParseErrorKind::InvalidCastle));
            }
            return match board.castle_plan(color, side) {
                Some(plan) if plan.from == m.from && !board.exposes_king(&plan) => {
                    Ok(Candidate::castle(plan.from, plan.to, side))
                }
                _ => Err(err(ParseErrorKind::InvalidCastle)),
            };
        }
    }

    if board.piece_at(m.to).is_some_and(|(_, owner)| owner == color) {
        return Err(err(ParseErrorKind::TargetSquareUnreachable));
    }
    let candidate = Candidate::from(m);
    if !board.is_legal(&candidate) {
        return Err(err(ParseErrorKind::IllegalMove));
    }
    Ok(candidate)
}

/// Castling intent of a king move: two files sideways, or onto its own
/// castling rook.
fn castle_side(board: &Board, m: &EngineMove) -> Option<CastleSide> {
    let (_, color) = board.piece_at(m.from)?;
    let df = m.to.file().index() as i8 - m.from.file().index() as i8;
    let side = if df > 0 {
        CastleSide::Kingside
    } else {
        CastleSide::Queenside
    };
    if df.abs() == 2 {
        return Some(side);
    }
    let rook = board.castling_rook_square(m.from, color, side)?;
    (rook == m.to).then_some(side)
}
