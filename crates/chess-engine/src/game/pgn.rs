//! Reading games from PGN and writing them back.

use super::{Game, MoveFailure};
use crate::board::{Board, BoardError};
use crate::notation::MoveFormat;
use chess_core::pgn::{MoveText, PgnError, PgnGame, PgnWriteOptions};
use chess_core::{Fen, GameResult};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when importing a PGN game.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PgnImportError {
    #[error("invalid PGN: {0}")]
    Pgn(#[from] PgnError),

    #[error("invalid FEN tag: {0}")]
    Board(#[from] BoardError),

    #[error("move {ply} ({text}) could not be played")]
    Move {
        /// 0-based ply index within the move text.
        ply: usize,
        text: String,
        #[source]
        source: MoveFailure,
    },
}

impl Game {
    /// Imports a single PGN game.
    ///
    /// Every move is replayed as SAN. A decided result token makes the game
    /// read-only; [`Game::branch`] continues it.
    pub fn from_pgn(text: &str) -> Result<Game, PgnImportError> {
        Self::from_pgn_game(&PgnGame::parse(text)?)
    }

    /// Imports every game of a multi-game PGN file.
    pub fn from_pgn_many(text: &str) -> Result<Vec<Game>, PgnImportError> {
        PgnGame::parse_many(text)?
            .iter()
            .map(Self::from_pgn_game)
            .collect()
    }

    /// Replays already tokenized PGN.
    pub fn from_pgn_game(pgn: &PgnGame) -> Result<Game, PgnImportError> {
        let board = match pgn.tags.get("FEN") {
            Some(fen) => Board::from_fen_str(fen)?,
            None => Board::standard(),
        };
        let mut game = Game::from_board(board).with_format(MoveFormat::San);

        for (ply, san) in pgn.movetext.moves().enumerate() {
            game.play(san).map_err(|source| PgnImportError::Move {
                ply,
                text: san.to_string(),
                source,
            })?;
        }

        if let Some(result) = pgn.movetext.result.filter(|r| r.is_decided()) {
            game.result = Some(result);
        }
        game.tags = pgn.tags.clone();
        game.comments = pgn.movetext.comments.clone();
        if game.is_finished() {
            game.set_read_only(true);
        }

        debug!(plies = game.len(), result = ?game.result, "imported PGN game");
        Ok(game)
    }

    /// The game as tags and move text. Every move of the history is
    /// included, wherever the current position is.
    pub fn to_pgn_game(&self) -> PgnGame {
        let initial = self.initial_board();
        let mut tags = self.tags.clone();
        let fen = initial.to_fen().to_string();
        if fen != Fen::STARTPOS {
            tags.set("SetUp", "1");
            tags.set("FEN", fen);
        } else {
            tags.remove("SetUp");
            tags.remove("FEN");
        }

        let result = self.result.unwrap_or(GameResult::Ongoing);
        tags.set("Result", result.as_token());

        let mut movetext = MoveText::from_moves(
            &self.san_moves(),
            initial.fullmove_number(),
            initial.side_to_move(),
            Some(result),
        );
        movetext.comments = self.comments.clone();
        PgnGame { tags, movetext }
    }

    /// Renders the game as PGN text.
    pub fn to_pgn(&self, options: &PgnWriteOptions) -> String {
        self.to_pgn_game().write(options)
    }
}
