//! Move legality.
//!
//! Moves are checked in two stages. A [`Plan`] describes a move that the
//! piece's movement rules allow on the current board (including castling and
//! en passant). A plan is legal when probing it does not leave the mover's
//! king attacked.

pub mod perft;

use crate::board::{Board, CastleSide, PieceId};
use crate::record::Candidate;
use chess_core::{Color, File, Piece, Square};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CastlePlan {
    pub side: CastleSide,
    pub rook: PieceId,
    pub rook_from: Square,
    pub rook_to: Square,
}

/// A geometrically valid move, before the king-safety check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Plan {
    pub mover: PieceId,
    pub piece: Piece,
    pub color: Color,
    pub from: Square,
    pub to: Square,
    /// Captured piece and the square it stands on (differs from `to` for
    /// en passant).
    pub capture: Option<(PieceId, Square)>,
    pub en_passant: bool,
    pub castle: Option<CastlePlan>,
    pub promotes: bool,
}

impl Board {
    // ========================================================================
    // Attacks
    // ========================================================================

    /// True if any piece of color `by` attacks `target`.
    ///
    /// Uses movement geometry only: pawns attack diagonally forward and kings
    /// attack adjacent squares whether or not the move would be legal.
    pub fn is_attacked(&self, target: Square, by: Color) -> bool {
        let holds = |square: Option<Square>, kinds: &[Piece]| {
            square
                .and_then(|sq| self.piece_at(sq))
                .is_some_and(|(piece, color)| color == by && kinds.contains(&piece))
        };

        let behind = -by.pawn_direction();
        if [-1, 1]
            .into_iter()
            .any(|df| holds(target.offset(df, behind), &[Piece::Pawn]))
        {
            return true;
        }
        if KNIGHT_OFFSETS
            .iter()
            .any(|&(df, dr)| holds(target.offset(df, dr), &[Piece::Knight]))
        {
            return true;
        }
        if KING_OFFSETS
            .iter()
            .any(|&(df, dr)| holds(target.offset(df, dr), &[Piece::King]))
        {
            return true;
        }

        let slides = |directions: &[(i8, i8)], kinds: &[Piece]| {
            directions.iter().any(|&direction| {
                self.first_piece_along(target, direction)
                    .is_some_and(|(piece, color)| color == by && kinds.contains(&piece))
            })
        };
        slides(&ROOK_DIRECTIONS, &[Piece::Rook, Piece::Queen])
            || slides(&BISHOP_DIRECTIONS, &[Piece::Bishop, Piece::Queen])
    }

    /// True if the king of `color` is attacked.
    pub fn is_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|king| self.is_attacked(king, color.opposite()))
    }

    fn first_piece_along(&self, from: Square, (df, dr): (i8, i8)) -> Option<(Piece, Color)> {
        let mut square = from;
        while let Some(next) = square.offset(df, dr) {
            if let Some(found) = self.piece_at(next) {
                return Some(found);
            }
            square = next;
        }
        None
    }

    fn path_clear(&self, from: Square, to: Square) -> bool {
        let df = (to.file().index() as i8 - from.file().index() as i8).signum();
        let dr = (to.rank().index() as i8 - from.rank().index() as i8).signum();
        let mut square = from;
        while let Some(next) = square.offset(df, dr) {
            if next == to {
                return true;
            }
            if self.occupant(next).is_some() {
                return false;
            }
            square = next;
        }
        false
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Plans an ordinary (non-castling) move of the piece on `from`.
    pub(crate) fn step_plan(&self, from: Square, to: Square) -> Option<Plan> {
        if from == to {
            return None;
        }
        let mover = self.occupant(from)?;
        let record = self.piece(mover);
        let (piece, color) = (record.kind, record.color);
        let target = self.occupant(to);
        if target.is_some_and(|id| self.piece(id).color == color) {
            return None;
        }

        let df = to.file().index() as i8 - from.file().index() as i8;
        let dr = to.rank().index() as i8 - from.rank().index() as i8;
        let plan = Plan {
            mover,
            piece,
            color,
            from,
            to,
            capture: target.map(|id| (id, to)),
            en_passant: false,
            castle: None,
            promotes: false,
        };

        let reachable = match piece {
            Piece::Pawn => return self.pawn_plan(plan, df, dr),
            Piece::Knight => matches!((df.abs(), dr.abs()), (1, 2) | (2, 1)),
            Piece::King => df.abs().max(dr.abs()) == 1,
            Piece::Bishop => df.abs() == dr.abs() && self.path_clear(from, to),
            Piece::Rook => (df == 0 || dr == 0) && self.path_clear(from, to),
            Piece::Queen => {
                (df == 0 || dr == 0 || df.abs() == dr.abs()) && self.path_clear(from, to)
            }
        };
        reachable.then_some(plan)
    }

    fn pawn_plan(&self, mut plan: Plan, df: i8, dr: i8) -> Option<Plan> {
        let dir = plan.color.pawn_direction();
        let from = plan.from;

        let valid = if df == 0 {
            plan.capture.is_none()
                && (dr == dir
                    || (dr == 2 * dir
                        && from.rank() == plan.color.pawn_rank()
                        && self.piece(plan.mover).is_unmoved()
                        && from
                            .offset(0, dir)
                            .is_some_and(|mid| self.occupant(mid).is_none())))
        } else if df.abs() == 1 && dr == dir {
            if plan.capture.is_some() {
                true
            } else if let Some(victim) = self.en_passant_victim(plan.color, from, plan.to) {
                plan.capture = Some(victim);
                plan.en_passant = true;
                true
            } else {
                false
            }
        } else {
            false
        };

        plan.promotes = plan.to.rank() == plan.color.promotion_rank();
        valid.then_some(plan)
    }

    /// The pawn that can be taken en passant by a pawn of `color` moving
    /// `from` to `to`: an opposing pawn beside the mover that made a
    /// two-square advance on the previous ply.
    fn en_passant_victim(&self, color: Color, from: Square, to: Square) -> Option<(PieceId, Square)> {
        let square = Square::new(to.file(), from.rank());
        let (id, last_from, last_to) = self.last_move()?;
        let victim = self.piece(id);
        let eligible = last_to == square
            && victim.kind == Piece::Pawn
            && victim.color != color
            && last_from.file() == square.file()
            && last_from.rank().index().abs_diff(square.rank().index()) == 2
            && self.occupant(square) == Some(id);
        eligible.then_some((id, square))
    }

    /// A king move of exactly two files is read as castling.
    pub(crate) fn inferred_castle(&self, from: Square, to: Square) -> Option<Plan> {
        let (piece, color) = self.piece_at(from)?;
        if piece != Piece::King || from.rank() != to.rank() {
            return None;
        }
        let side = match to.file().index() as i8 - from.file().index() as i8 {
            2 => CastleSide::Kingside,
            -2 => CastleSide::Queenside,
            _ => return None,
        };
        self.castle_plan(color, side)
            .filter(|plan| plan.from == from && plan.to == to)
    }

    /// Plans castling for `color` on `side`.
    ///
    /// Requires an unmoved king on its back rank and an unmoved castling rook,
    /// nothing but those two pieces on the squares either one crosses, and a
    /// king that is not in check and does not pass over an attacked square.
    /// The landing square is left to the king-safety probe.
    pub(crate) fn castle_plan(&self, color: Color, side: CastleSide) -> Option<Plan> {
        let king_from = self.king_square(color)?;
        let king = self.occupant(king_from)?;
        if king_from.rank() != color.back_rank() || !self.piece(king).is_unmoved() {
            return None;
        }
        let rook_from = self.castling_rook_square(king_from, color, side)?;
        let rook = self.occupant(rook_from)?;
        if !self.piece(rook).is_unmoved() {
            return None;
        }

        let (king_file, rook_file) = match side {
            CastleSide::Kingside => (File::G, File::F),
            CastleSide::Queenside => (File::C, File::D),
        };
        let king_to = Square::new(king_file, king_from.rank());
        let rook_to = Square::new(rook_file, king_from.rank());

        let blocked = rank_span(king_from, king_to)
            .chain(rank_span(rook_from, rook_to))
            .chain(rank_span(king_from, rook_from))
            .any(|sq| self.occupant(sq).is_some_and(|id| id != king && id != rook));
        if blocked {
            return None;
        }

        let enemy = color.opposite();
        if rank_span(king_from, king_to)
            .filter(|&sq| sq != king_to)
            .any(|sq| self.is_attacked(sq, enemy))
        {
            return None;
        }

        Some(Plan {
            mover: king,
            piece: Piece::King,
            color,
            from: king_from,
            to: king_to,
            capture: None,
            en_passant: false,
            castle: Some(CastlePlan {
                side,
                rook,
                rook_from,
                rook_to,
            }),
            promotes: false,
        })
    }

    // ========================================================================
    // Legality
    // ========================================================================

    /// True if the piece on `from` could legally move to `to`, whichever side
    /// is to move.
    pub fn can_reach(&mut self, from: Square, to: Square) -> bool {
        match self.plan(&Candidate::new(from, to)) {
            Some(plan) => !self.exposes_king(&plan),
            None => false,
        }
    }

    /// True if `candidate` can be played on this board.
    pub fn is_legal(&mut self, candidate: &Candidate) -> bool {
        match self.plan(candidate) {
            Some(plan) => !self.exposes_king(&plan),
            None => false,
        }
    }

    /// Every square the piece on `from` can legally move to.
    pub fn allowed_destinations(&mut self, from: Square) -> Vec<Square> {
        let Some((_, color)) = self.piece_at(from) else {
            return Vec::new();
        };
        let mut destinations: Vec<Square> = Square::all()
            .filter(|&to| self.can_reach(from, to))
            .collect();
        for side in CastleSide::ALL {
            if let Some(plan) = self.castle_plan(color, side) {
                if plan.from == from && !destinations.contains(&plan.to) && !self.exposes_king(&plan) {
                    destinations.push(plan.to);
                }
            }
        }
        destinations
    }

    /// Every legal move for `color`, with one entry per promotion piece.
    pub fn legal_candidates(&mut self, color: Color) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity(64);
        self.visit_legal(color, |candidate| {
            candidates.push(candidate);
            true
        });
        candidates
    }

    /// True if `color` has at least one legal move.
    pub fn has_legal_move(&mut self, color: Color) -> bool {
        let mut found = false;
        self.visit_legal(color, |_| {
            found = true;
            false
        });
        found
    }

    /// Calls `visit` for each legal move until it returns false.
    fn visit_legal(&mut self, color: Color, mut visit: impl FnMut(Candidate) -> bool) {
        let origins: Vec<Square> = self
            .active_pieces()
            .filter(|(_, p)| p.color == color)
            .filter_map(|(_, p)| p.square)
            .collect();

        for from in origins {
            for to in Square::all() {
                let Some(plan) = self.step_plan(from, to) else {
                    continue;
                };
                if self.exposes_king(&plan) {
                    continue;
                }
                let candidate = Candidate::new(from, to);
                if plan.promotes {
                    for piece in Piece::PROMOTIONS {
                        if !visit(candidate.with_promotion(piece)) {
                            return;
                        }
                    }
                } else if !visit(candidate) {
                    return;
                }
            }
        }

        for side in CastleSide::ALL {
            if let Some(plan) = self.castle_plan(color, side) {
                if !self.exposes_king(&plan) && !visit(Candidate::castle(plan.from, plan.to, side)) {
                    return;
                }
            }
        }
    }
}

/// Squares on `a`'s rank from `a`'s file to `b`'s file, inclusive.
fn rank_span(a: Square, b: Square) -> impl Iterator<Item = Square> {
    let (x, y) = (a.file().index(), b.file().index());
    let rank = a.rank();
    (x.min(y)..=x.max(y))
        .filter_map(File::from_index)
        .map(move |file| Square::new(file, rank))
}
