//! Full game management with history tracking.
//!
//! The [`Game`] struct provides:
//! - Move attempts in coordinate or SAN text, checked for the right side
//! - A snapshot per ply, so [`Game::seek`] never replays moves
//! - Undo at the end of an interactive game
//! - Repetition counting and end-of-game detection
//! - PGN import and export (see [`pgn`])

pub mod pgn;

use crate::board::{ApplyError, Board, BoardError, BoardSnapshot};
use crate::notation::{parse_move, MoveFormat};
use crate::player::Player;
use crate::record::{Candidate, GameMove};
use crate::san::{self, SanToken};
use chess_core::pgn::{Comment, Tags};
use chess_core::{Color, EngineMove, Fen, GameResult, ParseError, Piece, Square};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Why a move attempt was refused. The game is unchanged in every case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveFailure {
    #[error("could not read move: {0}")]
    NotParsed(#[from] ParseError),

    #[error("it is {expected}'s turn")]
    WrongPlayer { expected: Color },

    #[error("game is read-only")]
    GameIsReadOnly,

    #[error("game is not at the end of its history")]
    GameIsNotAtEnd,

    #[error("missing or invalid promotion piece")]
    InvalidPromotion,

    #[error("board rejected the move: {0}")]
    UnableToApplyToBoard(#[source] ApplyError),
}

/// Error type for [`Game::seek`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("ply {requested} is past the end of the game ({len} plies)")]
pub struct SeekError {
    pub requested: usize,
    pub len: usize,
}

/// What a successful move attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// A move was committed.
    Moved(GameMove),
    /// A termination token (`1-0`, `1/2-1/2`, ...) was entered.
    Ended(GameResult),
}

/// Passed to the promotion hook when a pawn reaches the last rank without a
/// promotion piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionRequest {
    pub color: Color,
    pub from: Square,
    pub to: Square,
    /// Serial the move will get.
    pub serial: usize,
}

/// The board after a given ply.
#[derive(Debug, Clone)]
pub struct GameState {
    pub serial: usize,
    /// Number of moves of history that lead to this state.
    pub history_len: usize,
    board: Arc<BoardSnapshot>,
}

impl GameState {
    pub fn board(&self) -> &Board {
        self.board.board()
    }

    pub fn snapshot(&self) -> Arc<BoardSnapshot> {
        Arc::clone(&self.board)
    }
}

enum Prepared {
    Move(Candidate),
    End(GameResult),
}

/// A chess game: two players, a live board and the full move history.
///
/// The history pointer ([`Game::position`]) may be moved back with
/// [`Game::seek`]; new moves are only accepted at the end of the history.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    initial: Arc<BoardSnapshot>,
    players: [Player; 2],
    moves: Vec<GameMove>,
    /// `states[n]` is the board after move serial `n`.
    states: Vec<GameState>,
    position: usize,
    /// Occurrences of each position key over the whole history.
    repetitions: HashMap<String, usize>,
    result: Option<GameResult>,
    read_only: bool,
    tags: Tags,
    comments: Vec<Comment>,
    format: MoveFormat,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game with the standard starting position.
    pub fn new() -> Self {
        Self::from_board(Board::standard())
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        Ok(Self::from_board(Board::from_fen_str(fen)?))
    }

    /// Creates a game starting from `board`.
    pub fn from_board(mut board: Board) -> Self {
        let mut repetitions = HashMap::new();
        repetitions.insert(board.position_key(), 1);
        let result = Self::end_of_game(&mut board);
        Game {
            initial: Arc::new(board.snapshot()),
            board,
            players: [
                Player::new(Color::White, false),
                Player::new(Color::Black, false),
            ],
            moves: Vec::new(),
            states: Vec::new(),
            position: 0,
            repetitions,
            result,
            read_only: false,
            tags: Tags::new(),
            comments: Vec::new(),
            format: MoveFormat::Auto,
        }
    }

    /// Sets the notation move text is read in.
    #[must_use]
    pub fn with_format(mut self, format: MoveFormat) -> Self {
        self.format = format;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The board at the current history position.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The board before the first move.
    pub fn initial_board(&self) -> &Board {
        self.initial.board()
    }

    pub fn player(&self, color: Color) -> &Player {
        &self.players[color.index()]
    }

    /// Every move of the game, including any past the current position.
    pub fn moves(&self) -> &[GameMove] {
        &self.moves
    }

    /// Number of moves in the history.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Current history position: the number of moves applied to
    /// [`Game::board`].
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position == self.moves.len()
    }

    /// The state after move `serial`.
    pub fn state(&self, serial: usize) -> Option<&GameState> {
        self.states.get(serial)
    }

    /// Side to move at the current position.
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Freezes or unfreezes the game for both players.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        for player in &mut self.players {
            player.set_read_only(read_only);
        }
    }

    /// Returns the game result if the game is over.
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Returns true if the game has a decided result.
    pub fn is_finished(&self) -> bool {
        self.result.is_some_and(GameResult::is_decided)
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.board.is_check(self.side_to_move())
    }

    /// Returns all legal moves at the current position.
    pub fn legal_moves(&mut self) -> Vec<Candidate> {
        let side = self.side_to_move();
        self.board.legal_candidates(side)
    }

    /// Squares the piece on `from` can move to at the current position.
    pub fn allowed_destinations(&mut self, from: Square) -> Vec<Square> {
        self.board.allowed_destinations(from)
    }

    /// Counts how many times the current position occurs in the history.
    pub fn position_count(&mut self) -> usize {
        self.repetitions
            .get(&self.board.position_key())
            .copied()
            .unwrap_or(0)
    }

    pub fn to_fen(&self) -> Fen {
        self.board.to_fen()
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut Tags {
        &mut self.tags
    }

    /// Comments read from PGN, anchored to the ply they follow.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// The SAN of every move, in order.
    pub fn san_moves(&self) -> Vec<&str> {
        self.moves.iter().map(|m| m.san.as_str()).collect()
    }

    /// The whole game as a delimiter-free coordinate string (`e2e4e7e5`).
    pub fn engine_moves(&self) -> String {
        let moves: Vec<EngineMove> = self.moves.iter().map(GameMove::engine_move).collect();
        EngineMove::join(&moves)
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Moves the history pointer to after `ply` moves. Restores the stored
    /// snapshot; nothing is replayed.
    pub fn seek(&mut self, ply: usize) -> Result<(), SeekError> {
        if ply > self.moves.len() {
            return Err(SeekError {
                requested: ply,
                len: self.moves.len(),
            });
        }
        self.restore_position(ply);
        trace!(ply, "seek");
        Ok(())
    }

    pub fn seek_to_end(&mut self) {
        self.restore_position(self.moves.len());
    }

    fn restore_position(&mut self, ply: usize) {
        let snapshot = match ply.checked_sub(1) {
            None => Arc::clone(&self.initial),
            Some(serial) => Arc::clone(&self.states[serial].board),
        };
        self.board.restore(&snapshot);
        self.position = ply;
    }

    /// Takes back the last move. Only interactive games at the end of their
    /// history can undo. Returns `Ok(None)` when there is nothing to undo.
    ///
    /// Any result is cleared along with the move, including one declared by
    /// a result token after it. A game whose only entry is such a token
    /// keeps its result; use [`Game::branch`] to drop it without losing a
    /// move.
    pub fn undo(&mut self) -> Result<Option<GameMove>, MoveFailure> {
        if self.read_only {
            return Err(MoveFailure::GameIsReadOnly);
        }
        if !self.is_at_end() {
            return Err(MoveFailure::GameIsNotAtEnd);
        }
        let Some(last) = self.moves.pop() else {
            return Ok(None);
        };
        self.states.pop();

        let key = self.board.position_key();
        if let Some(count) = self.repetitions.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.repetitions.remove(&key);
            }
        }
        self.players[last.color.index()].forget(last.serial);
        self.restore_position(self.moves.len());
        self.result = None;

        debug!(serial = last.serial, san = %last.san, "move undone");
        Ok(Some(last))
    }

    /// A new interactive game with the moves up to the current position.
    pub fn branch(&self) -> Result<Game, MoveFailure> {
        let mut game = Game::from_board(self.initial.board().clone());
        game.format = self.format;
        game.tags = self.tags.clone();
        game.tags.remove("Result");
        for m in &self.moves[..self.position] {
            game.commit(m.candidate())?;
        }
        game.comments = self
            .comments
            .iter()
            .filter(|c| c.ply <= self.position)
            .cloned()
            .collect();
        Ok(game)
    }

    // ========================================================================
    // Moves
    // ========================================================================

    /// Tries to play `text` for `side`.
    ///
    /// A pawn move to the last rank must name its promotion piece; use
    /// [`Game::attempt_move_with`] to ask for it instead.
    pub fn attempt_move(&mut self, side: Color, text: &str) -> Result<MoveOutcome, MoveFailure> {
        match self.prepare(side, text)? {
            Prepared::End(result) => Ok(self.finish(result)),
            Prepared::Move(candidate) if self.needs_promotion(&candidate) => {
                Err(MoveFailure::InvalidPromotion)
            }
            Prepared::Move(candidate) => self.commit(candidate).map(MoveOutcome::Moved),
        }
    }

    /// Plays `text` for whichever side is to move.
    pub fn play(&mut self, text: &str) -> Result<MoveOutcome, MoveFailure> {
        self.attempt_move(self.side_to_move(), text)
    }

    /// Like [`Game::attempt_move`], but awaits `hook` for the promotion piece
    /// when the text leaves it out. The hook runs at most once, after the
    /// move has been found legal.
    pub async fn attempt_move_with<F, Fut>(
        &mut self,
        side: Color,
        text: &str,
        hook: F,
    ) -> Result<MoveOutcome, MoveFailure>
    where
        F: FnOnce(PromotionRequest) -> Fut,
        Fut: Future<Output = Piece>,
    {
        let mut candidate = match self.prepare(side, text)? {
            Prepared::End(result) => return Ok(self.finish(result)),
            Prepared::Move(candidate) => candidate,
        };
        if self.needs_promotion(&candidate) {
            let request = PromotionRequest {
                color: side,
                from: candidate.from,
                to: candidate.to,
                serial: self.board.plies(),
            };
            let piece = hook(request).await;
            if !piece.is_promotion_target() {
                return Err(MoveFailure::InvalidPromotion);
            }
            candidate.promotion = Some(piece);
        }
        self.commit(candidate).map(MoveOutcome::Moved)
    }

    fn prepare(&mut self, side: Color, text: &str) -> Result<Prepared, MoveFailure> {
        if self.read_only {
            return Err(MoveFailure::GameIsReadOnly);
        }
        if !self.is_at_end() {
            return Err(MoveFailure::GameIsNotAtEnd);
        }
        // a mate may still be followed by its own result token
        if let Some(result) = GameResult::from_token(text.trim()) {
            return match self.result {
                Some(current) if current.is_decided() && current != result => {
                    Err(MoveFailure::GameIsReadOnly)
                }
                _ => Ok(Prepared::End(result)),
            };
        }
        if self.is_finished() {
            return Err(MoveFailure::GameIsReadOnly);
        }
        let expected = self.side_to_move();
        if side != expected {
            return Err(MoveFailure::WrongPlayer { expected });
        }

        match parse_move(&mut self.board, text, self.format)? {
            SanToken::GameEnd(result) => Ok(Prepared::End(result)),
            SanToken::Move(candidate) => {
                let promotes = self.board.is_promotion(candidate.from, candidate.to);
                match candidate.promotion {
                    Some(_) if !promotes => Err(MoveFailure::InvalidPromotion),
                    Some(piece) if !piece.is_promotion_target() => Err(MoveFailure::InvalidPromotion),
                    _ => Ok(Prepared::Move(candidate)),
                }
            }
        }
    }

    fn needs_promotion(&self, candidate: &Candidate) -> bool {
        candidate.promotion.is_none() && self.board.is_promotion(candidate.from, candidate.to)
    }

    fn finish(&mut self, result: GameResult) -> MoveOutcome {
        if result.is_decided() {
            self.result = Some(result);
            debug!(%result, "game ended by result token");
        }
        MoveOutcome::Ended(result)
    }

    /// Applies a parsed move and records it.
    fn commit(&mut self, candidate: Candidate) -> Result<GameMove, MoveFailure> {
        let body = san::san_body(&mut self.board, &candidate);
        let applied = self.board.apply(&candidate).map_err(|e| {
            warn!(error = %e, from = %candidate.from, to = %candidate.to, "board rejected a parsed move");
            MoveFailure::UnableToApplyToBoard(e)
        })?;

        let opponent = applied.color.opposite();
        let check = self.board.is_check(opponent);
        let can_move = self.board.has_legal_move(opponent);
        let mate = check && !can_move;

        let mut san = body.unwrap_or_else(|| candidate.to_engine_move().to_string());
        san.push_str(match (check, mate) {
            (_, true) => "#",
            (true, false) => "+",
            _ => "",
        });

        let count = self.repetitions.entry(self.board.position_key()).or_insert(0);
        *count += 1;

        let game_move = GameMove {
            serial: applied.serial,
            color: applied.color,
            piece: applied.piece,
            from: applied.from,
            to: applied.to,
            captured: applied.captured,
            check,
            mate,
            en_passant: applied.en_passant,
            castle: applied.castle,
            promotion: applied.promotion.map(|(piece, _)| piece),
            san,
            previous: applied.serial.checked_sub(1),
            repetitions: *count,
        };

        self.states.push(GameState {
            serial: applied.serial,
            history_len: applied.serial + 1,
            board: Arc::new(self.board.snapshot()),
        });
        self.moves.push(game_move.clone());
        self.players[applied.color.index()].record(applied.serial);
        self.position = self.moves.len();

        self.result = if mate {
            Some(GameResult::win_for(applied.color))
        } else if !can_move || self.board.is_insufficient_material() {
            Some(GameResult::Draw)
        } else {
            None
        };

        debug!(serial = game_move.serial, san = %game_move.san, "move committed");
        Ok(game_move)
    }

    /// Result implied by the position alone, if any.
    fn end_of_game(board: &mut Board) -> Option<GameResult> {
        let side = board.side_to_move();
        if !board.has_legal_move(side) {
            Some(if board.is_check(side) {
                GameResult::win_for(side.opposite())
            } else {
                GameResult::Draw
            })
        } else if board.is_insufficient_material() {
            Some(GameResult::Draw)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::ParseErrorKind;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn play_all(game: &mut Game, moves: &[&str]) {
        for text in moves {
            game.play(text).unwrap_or_else(|e| panic!("{text}: {e}"));
        }
    }

    fn moved(outcome: MoveOutcome) -> GameMove {
        match outcome {
            MoveOutcome::Moved(m) => m,
            MoveOutcome::Ended(r) => panic!("unexpected result {r}"),
        }
    }

    #[test]
    fn new_game() {
        let mut game = Game::new();
        assert_eq!(game.to_fen().to_string(), Fen::STARTPOS);
        assert_eq!(game.len(), 0);
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.result(), None);
        assert!(!game.is_check());
        assert_eq!(game.position_count(), 1);
    }

    #[test]
    fn first_move_is_recorded() {
        let mut game = Game::new();
        let m = moved(game.attempt_move(Color::White, "e2e4").unwrap());
        assert_eq!(m.serial, 0);
        assert_eq!(m.san, "e4");
        assert_eq!(m.color, Color::White);
        assert_eq!(m.previous, None);
        assert_eq!(m.repetitions, 1);
        assert_eq!(game.player(Color::White).moves(), &[0]);
        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(
            game.to_fen().to_string(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn wrong_player_changes_nothing() {
        let mut game = Game::new();
        let before = game.to_fen();
        assert_eq!(
            game.attempt_move(Color::Black, "e7e5"),
            Err(MoveFailure::WrongPlayer {
                expected: Color::White
            })
        );
        assert_eq!(game.to_fen(), before);
        assert_eq!(game.len(), 0);
    }

    #[test]
    fn parse_failures_are_wrapped() {
        let mut game = Game::new();
        let err = game.play("e2e5").unwrap_err();
        match err {
            MoveFailure::NotParsed(e) => assert_eq!(e.kind, ParseErrorKind::IllegalMove),
            other => panic!("unexpected {other:?}"),
        }
        assert!(game.is_empty());
    }

    #[test]
    fn en_passant_capture() {
        let mut game = Game::new();
        play_all(&mut game, &["d2d4", "c7c5", "d4d5", "e7e5"]);
        let m = moved(game.play("d5e6").unwrap());
        assert!(m.en_passant);
        assert_eq!(m.san, "dxe6");
        let captured = m.captured.unwrap();
        assert_eq!(captured.square, sq("e5"));
        assert_eq!(game.board().piece_at(sq("e5")), None);
        assert_eq!(game.board().removed_pieces().count(), 1);
    }

    #[test]
    fn scholars_mate_ends_the_game() {
        let mut game = Game::new();
        play_all(&mut game, &["e4", "e5", "Qh5", "Nc6", "Bc4", "Nf6"]);
        let m = moved(game.play("Qxf7#").unwrap());
        assert!(m.check && m.mate);
        assert_eq!(m.san, "Qxf7#");
        assert_eq!(game.result(), Some(GameResult::WhiteWins));
        assert_eq!(game.play("Ke7"), Err(MoveFailure::GameIsReadOnly));

        assert_eq!(game.play("0-1"), Err(MoveFailure::GameIsReadOnly));
        assert_eq!(game.play("1/2-1/2"), Err(MoveFailure::GameIsReadOnly));
        assert_eq!(game.play("*"), Err(MoveFailure::GameIsReadOnly));
        assert_eq!(game.result(), Some(GameResult::WhiteWins));
        assert_eq!(
            game.play("1-0"),
            Ok(MoveOutcome::Ended(GameResult::WhiteWins))
        );
        assert_eq!(game.result(), Some(GameResult::WhiteWins));
    }

    #[test]
    fn check_suffix_in_history() {
        let mut game = Game::new();
        play_all(&mut game, &["e4", "f5", "Qh5"]);
        assert_eq!(game.moves()[2].san, "Qh5+");
        assert!(game.is_check());
    }

    #[test]
    fn seek_restores_snapshots() {
        let mut game = Game::new();
        play_all(&mut game, &["e4", "e5", "Nf3", "Nc6"]);
        let end = game.to_fen();

        game.seek(2).unwrap();
        assert_eq!(game.position(), 2);
        assert_eq!(game.to_fen(), game.state(1).unwrap().board().to_fen());
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.play("Nf3"), Err(MoveFailure::GameIsNotAtEnd));
        assert_eq!(game.undo(), Err(MoveFailure::GameIsNotAtEnd));

        game.seek(0).unwrap();
        assert_eq!(game.to_fen().to_string(), Fen::STARTPOS);
        assert_eq!(game.seek(5), Err(SeekError { requested: 5, len: 4 }));

        game.seek_to_end();
        assert_eq!(game.to_fen(), end);
    }

    #[test]
    fn undo_restores_previous_state() {
        let mut game = Game::new();
        play_all(&mut game, &["e4", "e5"]);
        let before = game.board().clone();
        let fen = game.to_fen();
        play_all(&mut game, &["Nf3"]);

        let undone = game.undo().unwrap().unwrap();
        assert_eq!(undone.san, "Nf3");
        assert_eq!(game.board(), &before);
        assert_eq!(game.to_fen(), fen);
        assert_eq!(game.len(), 2);
        assert!(game.state(2).is_none());
        assert_eq!(game.player(Color::White).moves(), &[0]);

        game.undo().unwrap();
        game.undo().unwrap();
        assert_eq!(game.undo(), Ok(None));
    }

    #[test]
    fn repetitions_are_counted() {
        let mut game = Game::new();
        let shuffle = ["Nf3", "Nf6", "Ng1", "Ng8"];
        play_all(&mut game, &shuffle);
        assert_eq!(game.moves()[3].repetitions, 2);
        play_all(&mut game, &shuffle);
        assert_eq!(game.moves()[7].repetitions, 3);
        assert_eq!(game.position_count(), 3);

        game.undo().unwrap();
        play_all(&mut game, &["Ng8"]);
        assert_eq!(game.moves()[7].repetitions, 3);
    }

    #[test]
    fn repetitions_ignore_en_passant_without_a_capture() {
        let mut game = Game::new();
        play_all(&mut game, &["e4", "Nf6", "Nf3", "Ng8", "Ng1"]);
        assert_eq!(game.moves()[4].repetitions, 2);
        assert_eq!(game.position_count(), 2);
        assert_eq!(game.to_fen().en_passant, None);
    }

    #[test]
    fn undo_after_result_token_takes_the_move_too() {
        let mut game = Game::new();
        play_all(&mut game, &["e4", "1/2-1/2"]);
        assert_eq!(game.result(), Some(GameResult::Draw));

        let branch = game.branch().unwrap();
        assert_eq!(branch.san_moves(), ["e4"]);
        assert_eq!(branch.result(), None);

        let undone = game.undo().unwrap().unwrap();
        assert_eq!(undone.san, "e4");
        assert!(game.is_empty());
        assert_eq!(game.result(), None);
    }

    #[test]
    fn extreme_clocks_do_not_overflow() {
        let mut game =
            Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 4294967295 4294967295").unwrap();
        moved(game.play("Ra2").unwrap());
        assert_eq!(game.board().halfmove_clock(), u32::MAX);
        assert_eq!(game.to_fen().fullmove_number, u32::MAX);
    }

    #[test]
    fn promotion_requires_a_piece() {
        let mut game = Game::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        assert_eq!(game.play("e7e8"), Err(MoveFailure::InvalidPromotion));
        assert_eq!(game.play("e1e2q"), Err(MoveFailure::InvalidPromotion));
        let m = moved(game.play("e7e8q").unwrap());
        assert_eq!(m.promotion, Some(Piece::Queen));
        assert_eq!(m.san, "e8=Q");
        assert_eq!(game.board().promotions().len(), 1);
    }

    #[test]
    fn result_token_ends_game() {
        let mut game = Game::new();
        play_all(&mut game, &["e4"]);
        assert_eq!(
            game.play("1/2-1/2"),
            Ok(MoveOutcome::Ended(GameResult::Draw))
        );
        assert!(game.is_finished());
        assert_eq!(game.play("e5"), Err(MoveFailure::GameIsReadOnly));

        let branch = game.branch().unwrap();
        assert_eq!(branch.len(), 1);
        assert_eq!(branch.result(), None);
    }

    #[test]
    fn read_only_game_refuses_moves() {
        let mut game = Game::new();
        game.set_read_only(true);
        assert!(game.player(Color::White).is_read_only());
        assert_eq!(game.play("e4"), Err(MoveFailure::GameIsReadOnly));
        assert_eq!(game.undo(), Err(MoveFailure::GameIsReadOnly));
    }

    #[test]
    fn branch_from_middle_of_history() {
        let mut game = Game::new();
        play_all(&mut game, &["e4", "e5", "Nf3", "Nc6"]);
        game.seek(2).unwrap();
        let mut branch = game.branch().unwrap();
        assert_eq!(branch.len(), 2);
        play_all(&mut branch, &["d4"]);
        assert_eq!(branch.san_moves(), ["e4", "e5", "d4"]);
        assert_eq!(game.len(), 4);
    }

    #[test]
    fn stalemate_is_a_draw() {
        let mut game = Game::from_fen("7k/8/5QK1/8/8/8/8/8 w - - 0 1").unwrap();
        let m = moved(game.play("Qf7").unwrap());
        assert!(!m.check);
        assert_eq!(game.result(), Some(GameResult::Draw));
    }

    #[test]
    fn insufficient_material_is_a_draw() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1").unwrap();
        play_all(&mut game, &["Kxd2"]);
        assert_eq!(game.result(), Some(GameResult::Draw));
    }

    #[test]
    fn engine_moves_export() {
        let mut game = Game::new();
        play_all(&mut game, &["e4", "e5", "Nf3"]);
        assert_eq!(game.engine_moves(), "e2e4e7e5g1f3");
    }

    #[test]
    fn castling_through_game() {
        let mut game = Game::new();
        play_all(&mut game, &["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"]);
        let m = moved(game.play("e1g1").unwrap());
        assert_eq!(m.san, "O-O");
        assert_eq!(m.castle, Some(crate::CastleSide::Kingside));
        play_all(&mut game, &["Nf6", "d3"]);
        let m = moved(game.play("O-O").unwrap());
        assert_eq!(m.from, Square::E8);
        assert_eq!(m.to, Square::G8);
        assert_eq!(game.to_fen().castling.to_string(), "-");
    }
}
