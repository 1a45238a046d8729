//! Conversion between [`Board`] and [`Fen`].

use super::{Board, BoardError, LastMove};
use crate::board::CastleSide;
use chess_core::{CastlingRights, Color, Fen, Piece, Square};

impl Board {
    /// Builds a board from a parsed FEN record.
    ///
    /// FEN has no move history, so piece move counts are inferred: pawns off
    /// their start rank have moved, and kings and rooks without a matching
    /// castling right are treated as moved. An en-passant target becomes the
    /// board's last move.
    pub fn from_fen(fen: &Fen) -> Result<Self, BoardError> {
        let mut board = Board::empty(fen.side_to_move, fen.fullmove_number, fen.halfmove_clock);

        for color in Color::ALL {
            let kings = Square::all()
                .filter(|&sq| fen.piece_at(sq) == Some((Piece::King, color)))
                .count();
            match kings {
                0 => return Err(BoardError::MissingKing(color)),
                1 => {}
                _ => return Err(BoardError::TooManyKings(color)),
            }
        }

        for square in Square::all() {
            if let Some((piece, color)) = fen.piece_at(square) {
                let moved = match piece {
                    Piece::Pawn => square.rank() != color.pawn_rank(),
                    Piece::King | Piece::Rook => true,
                    _ => false,
                };
                board.add_piece(piece, color, square, u32::from(moved));
            }
        }

        for color in Color::ALL {
            for side in CastleSide::ALL {
                let allowed = match side {
                    CastleSide::Kingside => fen.castling.kingside(color),
                    CastleSide::Queenside => fen.castling.queenside(color),
                };
                if !allowed {
                    continue;
                }
                let Some(king) = board.king_square(color).filter(|sq| sq.rank() == color.back_rank())
                else {
                    continue;
                };
                if let Some(rook) = board.castling_rook_square(king, color, side) {
                    for square in [king, rook] {
                        if let Some(id) = board.occupant(square) {
                            board.pieces[id.index()].move_count = 0;
                        }
                    }
                }
            }
        }

        if let Some(target) = fen.en_passant {
            let mover = fen.side_to_move.opposite();
            let dir = mover.pawn_direction();
            let pushed = target.offset(0, dir);
            let origin = target.offset(0, -dir);
            if let (Some(to), Some(from)) = (pushed, origin) {
                if let Some(id) = board.occupant(to) {
                    if board.piece_at(to) == Some((Piece::Pawn, mover)) {
                        board.last_move = Some(LastMove { piece: id, from, to });
                    }
                }
            }
        }

        Ok(board)
    }

    /// Renders the board as a FEN record.
    pub fn to_fen(&self) -> Fen {
        let mut placement = [None; 64];
        for square in Square::all() {
            placement[square.index() as usize] = self.piece_at(square);
        }

        let mut castling = CastlingRights::NONE;
        for color in Color::ALL {
            castling.set_kingside(color, self.has_castling_right(color, CastleSide::Kingside));
            castling.set_queenside(color, self.has_castling_right(color, CastleSide::Queenside));
        }

        Fen {
            placement,
            side_to_move: self.side_to_move(),
            castling,
            en_passant: self.en_passant_target(),
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number(),
        }
    }

    /// The square skipped by a two-square pawn advance on the last move.
    pub fn en_passant_target(&self) -> Option<Square> {
        let last = self.last_move?;
        let record = self.piece(last.piece);
        let double = record.kind == Piece::Pawn
            && last.from.file() == last.to.file()
            && last.from.rank().index().abs_diff(last.to.rank().index()) == 2;
        if !double {
            return None;
        }
        last.from.offset(0, record.color.pawn_direction())
    }

    /// True while the king and the castling rook on `side` are both unmoved.
    pub fn has_castling_right(&self, color: Color, side: CastleSide) -> bool {
        let Some(king) = self.king_square(color) else {
            return false;
        };
        let unmoved = |sq: Square| self.occupant(sq).is_some_and(|id| self.piece(id).is_unmoved());
        king.rank() == color.back_rank()
            && unmoved(king)
            && self
                .castling_rook_square(king, color, side)
                .is_some_and(unmoved)
    }

    /// Finds the castling rook for `side` by scanning inward from the board
    /// edge along the king's rank. The first own rook found is the candidate.
    pub(crate) fn castling_rook_square(&self, king: Square, color: Color, side: CastleSide) -> Option<Square> {
        let king_file = king.file().index() as i8;
        let files: Box<dyn Iterator<Item = i8>> = match side {
            CastleSide::Kingside => Box::new((king_file + 1..8).rev()),
            CastleSide::Queenside => Box::new(0..king_file),
        };
        files
            .filter_map(|file| king.offset(file - king_file, 0))
            .find(|&sq| self.piece_at(sq) == Some((Piece::Rook, color)))
    }
}
