//! Temporary "what if" board edits.
//!
//! A [`Probe`] relocates the pieces of one move in place and puts them back
//! when dropped. Check detection runs against the probed board, so it never
//! needs a copy of the position.

use super::{Board, PieceId};
use crate::movegen::Plan;
use crate::record::Candidate;
use chess_core::{Color, Piece, Square};
use std::ops::Deref;

/// Scoped guard over a board with one move temporarily applied.
///
/// Dereferences to the probed board. Dropping the guard restores every
/// square and piece record it touched.
pub struct Probe<'a> {
    board: &'a mut Board,
    undo: Undo,
}

struct Undo {
    mover: PieceId,
    kind: Piece,
    from: Square,
    to: Square,
    captured: Option<(PieceId, Square)>,
    rook: Option<(PieceId, Square, Square)>,
    probing: Option<Color>,
}

impl Board {
    /// Temporarily applies `candidate`. Returns `None` if the move is not
    /// geometrically possible.
    pub fn probe(&mut self, candidate: &Candidate) -> Option<Probe<'_>> {
        let plan = self.plan(candidate)?;
        Some(self.probe_plan(&plan, candidate.promotion))
    }

    pub(crate) fn probe_plan(&mut self, plan: &Plan, promotion: Option<Piece>) -> Probe<'_> {
        let undo = Undo {
            mover: plan.mover,
            kind: plan.piece,
            from: plan.from,
            to: plan.to,
            captured: plan.capture,
            rook: plan.castle.map(|c| (c.rook, c.rook_from, c.rook_to)),
            probing: self.probing.replace(plan.color),
        };

        if let Some((id, square)) = undo.captured {
            self.squares[square.index() as usize] = None;
            self.pieces[id.index()].square = None;
        }
        self.squares[undo.from.index() as usize] = None;
        if let Some((rook, rook_from, rook_to)) = undo.rook {
            self.squares[rook_from.index() as usize] = None;
            self.squares[rook_to.index() as usize] = Some(rook);
            self.pieces[rook.index()].square = Some(rook_to);
        }
        self.squares[undo.to.index() as usize] = Some(undo.mover);
        let mover = &mut self.pieces[undo.mover.index()];
        mover.square = Some(undo.to);
        if plan.promotes {
            mover.kind = promotion.unwrap_or(Piece::Queen);
        }

        Probe { board: self, undo }
    }

    /// True if playing `plan` would leave the mover's own king attacked.
    ///
    /// A nested query for a side that is already being probed answers
    /// `false`, which keeps check detection from recursing.
    pub(crate) fn exposes_king(&mut self, plan: &Plan) -> bool {
        if self.probing == Some(plan.color) {
            return false;
        }
        let probe = self.probe_plan(plan, None);
        probe.is_check(plan.color)
    }
}

impl Deref for Probe<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl Drop for Probe<'_> {
    fn drop(&mut self) {
        let board = &mut *self.board;
        let undo = &self.undo;

        board.squares[undo.to.index() as usize] = None;
        if let Some((rook, rook_from, rook_to)) = undo.rook {
            board.squares[rook_to.index() as usize] = None;
            board.squares[rook_from.index() as usize] = Some(rook);
            board.pieces[rook.index()].square = Some(rook_from);
        }
        if let Some((id, square)) = undo.captured {
            board.squares[square.index() as usize] = Some(id);
            board.pieces[id.index()].square = Some(square);
        }
        board.squares[undo.from.index() as usize] = Some(undo.mover);
        let mover = &mut board.pieces[undo.mover.index()];
        mover.square = Some(undo.from);
        mover.kind = undo.kind;
        board.probing = undo.probing;
    }
}
