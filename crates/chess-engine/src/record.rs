//! Moves as they are requested, applied and recorded.

use crate::board::{CastleSide, PieceId};
use chess_core::{Color, EngineMove, Piece, Square};

/// A requested move: origin, destination and the optional extras that
/// notation can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
    /// Set when the notation said "castle" explicitly. A king moving two
    /// files is read as castling either way.
    pub castle: Option<CastleSide>,
}

impl Candidate {
    pub const fn new(from: Square, to: Square) -> Self {
        Candidate {
            from,
            to,
            promotion: None,
            castle: None,
        }
    }

    pub const fn castle(from: Square, to: Square, side: CastleSide) -> Self {
        Candidate {
            from,
            to,
            promotion: None,
            castle: Some(side),
        }
    }

    #[must_use]
    pub fn with_promotion(mut self, piece: Piece) -> Self {
        self.promotion = Some(piece);
        self
    }

    pub const fn to_engine_move(&self) -> EngineMove {
        EngineMove {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }
}

impl From<EngineMove> for Candidate {
    fn from(m: EngineMove) -> Self {
        Candidate {
            from: m.from,
            to: m.to,
            promotion: m.promotion,
            castle: None,
        }
    }
}

/// A piece taken off the board by a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturedPiece {
    pub id: PieceId,
    pub kind: Piece,
    pub color: Color,
    /// Where it stood; differs from the destination for en passant.
    pub square: Square,
}

/// What [`Board::apply`](crate::Board::apply) did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    pub serial: usize,
    pub mover: PieceId,
    pub piece: Piece,
    pub color: Color,
    pub from: Square,
    pub to: Square,
    pub captured: Option<CapturedPiece>,
    pub en_passant: bool,
    pub castle: Option<CastleSide>,
    /// Promotion piece kind and the id of the new piece.
    pub promotion: Option<(Piece, PieceId)>,
}

/// A committed move in a game's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMove {
    /// 0-based ply index from the start of the game.
    pub serial: usize,
    pub color: Color,
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    pub captured: Option<CapturedPiece>,
    pub check: bool,
    pub mate: bool,
    pub en_passant: bool,
    pub castle: Option<CastleSide>,
    pub promotion: Option<Piece>,
    pub san: String,
    /// Serial of the previous move, if any.
    pub previous: Option<usize>,
    /// How many times the resulting position has now occurred.
    pub repetitions: usize,
}

impl GameMove {
    /// The candidate that reproduces this move.
    pub fn candidate(&self) -> Candidate {
        Candidate {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
            castle: self.castle,
        }
    }

    /// Long-coordinate text of the move.
    pub fn engine_move(&self) -> EngineMove {
        self.candidate().to_engine_move()
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}
