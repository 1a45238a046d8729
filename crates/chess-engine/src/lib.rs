//! Chess rules engine with full move history.
//!
//! This crate provides:
//! - [`Board`] - Square grid plus an arena of every piece in the game
//! - [`Game`] - Move attempts, history snapshots, seek and undo
//! - [`Player`] - The two sides and the moves each has made
//! - Move legality, including a king-safety probe
//! - Long-coordinate and SAN parsing, SAN generation
//! - PGN import and export
//!
//! # Architecture
//!
//! Legality is decided in two steps: the piece's movement rules produce a
//! plan, then the plan is probed on the board and rejected if it leaves the
//! mover's king attacked. The game stores a board snapshot after every ply,
//! so seeking to any point of the history is a single restore.
//!
//! # Example
//!
//! ```
//! use chess_engine::{Color, Game, MoveOutcome};
//!
//! let mut game = Game::new();
//! game.attempt_move(Color::White, "e2e4").unwrap();
//! game.attempt_move(Color::Black, "e5").unwrap();
//! let outcome = game.play("Nf3").unwrap();
//! assert!(matches!(outcome, MoveOutcome::Moved(ref m) if m.san == "Nf3"));
//! println!("Position after 1.e4 e5 2.Nf3: {}", game.to_fen());
//! ```

mod board;
mod game;
pub mod movegen;
mod notation;
mod player;
mod record;
pub mod san;

pub use board::{
    ApplyError, Board, BoardError, BoardSnapshot, CastleSide, PieceId, PieceRecord, Probe,
    Promotion, SquareView,
};
pub use chess_core::{Color, EngineMove, Fen, GameResult, ParseError, ParseErrorKind, Piece, Square};
pub use game::pgn::PgnImportError;
pub use game::{Game, GameState, MoveFailure, MoveOutcome, PromotionRequest, SeekError};
pub use movegen::perft::{perft, perft_divide};
pub use notation::{parse_engine, parse_move, MoveFormat};
pub use player::Player;
pub use record::{AppliedMove, Candidate, CapturedPiece, GameMove};
pub use san::{move_to_san, parse_san, SanToken};
