//! Board representation.
//!
//! A [`Board`] is an 8x8 grid of optional piece ids plus an arena that owns
//! every piece record ever created in the game. Captured pieces stay in the
//! arena (listed as removed) and promoted pawns stay behind the piece they
//! became, so any snapshot can be restored without replaying moves.

mod fen;
mod probe;

use crate::movegen::Plan;
use crate::record::{AppliedMove, Candidate, CapturedPiece};
use chess_core::{Color, Fen, FenError, Piece, Square};
use thiserror::Error;

pub use probe::Probe;

/// Stable handle of a piece within its board's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(u16);

impl PieceId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Everything the board knows about one piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceRecord {
    pub kind: Piece,
    pub color: Color,
    /// `None` once captured or promoted away.
    pub square: Option<Square>,
    /// Number of times this piece has moved.
    pub move_count: u32,
    /// Serial of the last move that moved this piece.
    pub last_moved: Option<usize>,
    /// Square the piece started on (or was promoted on).
    pub start: Square,
}

impl PieceRecord {
    #[inline]
    pub fn is_unmoved(&self) -> bool {
        self.move_count == 0
    }
}

/// A pawn that became another piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    pub pawn: PieceId,
    pub piece: PieceId,
    pub serial: usize,
}

/// Which way a king castles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    pub const ALL: [CastleSide; 2] = [CastleSide::Kingside, CastleSide::Queenside];

    /// SAN text for the castle.
    pub const fn san(self) -> &'static str {
        match self {
            CastleSide::Kingside => "O-O",
            CastleSide::Queenside => "O-O-O",
        }
    }
}

/// Read-only view of a single square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareView {
    pub square: Square,
    pub occupant: Option<PieceId>,
    pub piece: Option<(Piece, Color)>,
}

impl SquareView {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LastMove {
    pub piece: PieceId,
    pub from: Square,
    pub to: Square,
}

/// Errors raised while building a board.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("{0} has no king")]
    MissingKing(Color),

    #[error("{0} has more than one king")]
    TooManyKings(Color),
}

/// Reasons [`Board::apply`] refuses a move. The board is unchanged when any
/// of these is returned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ApplyError {
    #[error("no piece on {0}")]
    EmptyOrigin(Square),

    #[error("it is not {0}'s turn")]
    WrongSide(Color),

    #[error("{from}{to} is not a reachable move")]
    Unreachable { from: Square, to: Square },

    #[error("{from}{to} leaves the king in check")]
    ExposesKing { from: Square, to: Square },

    #[error("move to the last rank needs a promotion piece")]
    MissingPromotion,

    #[error("cannot promote to {0}")]
    InvalidPromotion(Piece),

    #[error("only pawns reaching the last rank promote")]
    UnexpectedPromotion,
}

/// The chess board with its piece arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<PieceId>; 64],
    pieces: Vec<PieceRecord>,
    removed: Vec<PieceId>,
    promotions: Vec<Promotion>,
    last_move: Option<LastMove>,
    start_side: Color,
    start_fullmove: u32,
    plies: usize,
    halfmove_clock: u32,
    probing: Option<Color>,
}

/// An immutable copy of a board, restorable with [`Board::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    board: Board,
}

impl BoardSnapshot {
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_fen(&self) -> Fen {
        self.board.to_fen()
    }
}

impl Board {
    /// The standard starting position.
    pub fn standard() -> Self {
        Self::from_fen_str(Fen::STARTPOS).expect("STARTPOS is valid")
    }

    /// Builds a board from FEN text.
    pub fn from_fen_str(fen: &str) -> Result<Self, BoardError> {
        let fen = Fen::parse(fen)?;
        Self::from_fen(&fen)
    }

    fn empty(start_side: Color, start_fullmove: u32, halfmove_clock: u32) -> Self {
        Board {
            squares: [None; 64],
            pieces: Vec::with_capacity(40),
            removed: Vec::new(),
            promotions: Vec::new(),
            last_move: None,
            start_side,
            start_fullmove,
            plies: 0,
            halfmove_clock,
            probing: None,
        }
    }

    fn add_piece(&mut self, kind: Piece, color: Color, square: Square, move_count: u32) -> PieceId {
        let id = PieceId(self.pieces.len() as u16);
        self.pieces.push(PieceRecord {
            kind,
            color,
            square: Some(square),
            move_count,
            last_moved: None,
            start: square,
        });
        self.squares[square.index() as usize] = Some(id);
        id
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    pub fn occupant(&self, square: Square) -> Option<PieceId> {
        self.squares[square.index() as usize]
    }

    /// Returns the piece and color on `square`.
    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<(Piece, Color)> {
        self.occupant(square).map(|id| {
            let record = &self.pieces[id.index()];
            (record.kind, record.color)
        })
    }

    /// Looks up a piece record by id.
    #[inline]
    pub fn piece(&self, id: PieceId) -> &PieceRecord {
        &self.pieces[id.index()]
    }

    pub fn square(&self, square: Square) -> SquareView {
        SquareView {
            square,
            occupant: self.occupant(square),
            piece: self.piece_at(square),
        }
    }

    /// Looks up a square by its 0..64 index. Out-of-range indices are off
    /// the board.
    pub fn square_at(&self, index: usize) -> Option<SquareView> {
        let square = Square::from_index(u8::try_from(index).ok()?)?;
        Some(self.square(square))
    }

    /// All 64 squares, a1 first.
    pub fn squares(&self) -> impl Iterator<Item = SquareView> + '_ {
        Square::all().map(|sq| self.square(sq))
    }

    /// Pieces currently on the board.
    pub fn active_pieces(&self) -> impl Iterator<Item = (PieceId, &PieceRecord)> + '_ {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, record)| record.square.is_some())
            .map(|(i, record)| (PieceId(i as u16), record))
    }

    /// Captured pieces, in capture order.
    pub fn removed_pieces(&self) -> impl Iterator<Item = (PieceId, &PieceRecord)> + '_ {
        self.removed.iter().map(|&id| (id, self.piece(id)))
    }

    pub fn promotions(&self) -> &[Promotion] {
        &self.promotions
    }

    /// The king of `color`.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.active_pieces()
            .find(|(_, p)| p.kind == Piece::King && p.color == color)
            .and_then(|(_, p)| p.square)
    }

    /// Piece, origin and destination of the last applied move.
    pub fn last_move(&self) -> Option<(PieceId, Square, Square)> {
        self.last_move.map(|m| (m.piece, m.from, m.to))
    }

    /// Side to move, derived from the starting side and the number of plies
    /// played since.
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.start_side.after_plies(self.plies)
    }

    /// Side to move when the board was set up.
    pub fn start_side(&self) -> Color {
        self.start_side
    }

    pub fn start_fullmove(&self) -> u32 {
        self.start_fullmove
    }

    /// Plies applied since the board was set up; also the serial of the next
    /// move.
    #[inline]
    pub fn plies(&self) -> usize {
        self.plies
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        let black_first = usize::from(self.start_side == Color::Black);
        let played = u32::try_from((self.plies + black_first) / 2).unwrap_or(u32::MAX);
        self.start_fullmove.saturating_add(played)
    }

    /// True if neither side can possibly deliver mate.
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors = Vec::new();
        for (_, p) in self.active_pieces() {
            match p.kind {
                Piece::King => {}
                Piece::Knight | Piece::Bishop => minors.push(p),
                _ => return false,
            }
        }
        match minors.as_slice() {
            [] | [_] => true,
            many => many.iter().all(|p| p.kind == Piece::Bishop) && {
                let shade = |p: &PieceRecord| {
                    p.square
                        .map(|sq| (sq.file().index() + sq.rank().index()) % 2)
                };
                let first = shade(many[0]);
                many.iter().all(|p| shade(*p) == first)
            },
        }
    }

    /// Repetition key: placement, side, castling and en passant. The
    /// en-passant square only counts while a capture onto it is legal.
    pub fn position_key(&mut self) -> String {
        let mut fen = self.to_fen();
        if fen
            .en_passant
            .is_some_and(|target| !self.can_capture_en_passant(target))
        {
            fen.en_passant = None;
        }
        fen.position_key()
    }

    fn can_capture_en_passant(&mut self, target: Square) -> bool {
        let side = self.side_to_move();
        let Some(pushed) = target.offset(0, -side.pawn_direction()) else {
            return false;
        };
        [-1, 1]
            .into_iter()
            .filter_map(|files| pushed.offset(files, 0))
            .any(|from| {
                self.piece_at(from) == Some((Piece::Pawn, side))
                    && self.is_legal(&Candidate::new(from, target))
            })
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            board: self.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &BoardSnapshot) {
        self.clone_from(&snapshot.board);
    }

    // ========================================================================
    // Moves
    // ========================================================================

    /// True if the piece on `from` moves to `to` by promoting.
    pub fn is_promotion(&self, from: Square, to: Square) -> bool {
        self.piece_at(from)
            .is_some_and(|(piece, color)| piece == Piece::Pawn && to.rank() == color.promotion_rank())
    }

    /// Applies a move for the side to move.
    ///
    /// Either the whole move lands (mover, capture, castling rook and
    /// promotion) or nothing changes.
    pub fn apply(&mut self, candidate: &Candidate) -> Result<AppliedMove, ApplyError> {
        let (from, to) = (candidate.from, candidate.to);
        let (_, color) = self.piece_at(from).ok_or(ApplyError::EmptyOrigin(from))?;
        if color != self.side_to_move() {
            return Err(ApplyError::WrongSide(color));
        }
        let plan = self
            .plan(candidate)
            .ok_or(ApplyError::Unreachable { from, to })?;

        match (plan.promotes, candidate.promotion) {
            (true, None) => return Err(ApplyError::MissingPromotion),
            (true, Some(kind)) if !kind.is_promotion_target() => {
                return Err(ApplyError::InvalidPromotion(kind))
            }
            (false, Some(_)) => return Err(ApplyError::UnexpectedPromotion),
            _ => {}
        }
        if self.exposes_king(&plan) {
            return Err(ApplyError::ExposesKing { from, to });
        }

        let serial = self.plies;
        let captured = plan.capture.map(|(id, square)| {
            self.squares[square.index() as usize] = None;
            self.pieces[id.index()].square = None;
            self.removed.push(id);
            let record = &self.pieces[id.index()];
            CapturedPiece {
                id,
                kind: record.kind,
                color: record.color,
                square,
            }
        });

        self.squares[from.index() as usize] = None;
        if let Some(castle) = plan.castle {
            self.squares[castle.rook_from.index() as usize] = None;
            self.squares[castle.rook_to.index() as usize] = Some(castle.rook);
            let rook = &mut self.pieces[castle.rook.index()];
            rook.square = Some(castle.rook_to);
            rook.move_count += 1;
            rook.last_moved = Some(serial);
        }
        self.squares[to.index() as usize] = Some(plan.mover);
        let mover = &mut self.pieces[plan.mover.index()];
        mover.square = Some(to);
        mover.move_count += 1;
        mover.last_moved = Some(serial);

        let promotion = match candidate.promotion {
            Some(kind) if plan.promotes => {
                self.pieces[plan.mover.index()].square = None;
                let id = self.add_piece(kind, color, to, 1);
                self.pieces[id.index()].last_moved = Some(serial);
                self.promotions.push(Promotion {
                    pawn: plan.mover,
                    piece: id,
                    serial,
                });
                Some((kind, id))
            }
            _ => None,
        };

        if plan.piece == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        self.last_move = Some(LastMove {
            piece: plan.mover,
            from,
            to,
        });
        self.plies += 1;

        Ok(AppliedMove {
            serial,
            mover: plan.mover,
            piece: plan.piece,
            color,
            from,
            to,
            captured,
            en_passant: plan.en_passant,
            castle: plan.castle.map(|c| c.side),
            promotion,
        })
    }

    /// The plan for `candidate`, if the move is geometrically possible.
    pub(crate) fn plan(&self, candidate: &Candidate) -> Option<Plan> {
        match candidate.castle {
            Some(side) => self
                .castle_plan(self.piece_at(candidate.from)?.1, side)
                .filter(|plan| plan.from == candidate.from),
            None => self
                .inferred_castle(candidate.from, candidate.to)
                .or_else(|| self.step_plan(candidate.from, candidate.to)),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
