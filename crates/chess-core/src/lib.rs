//! Core types for chess notation.
//!
//! This crate provides the board-independent pieces of the rules engine:
//! - [`Piece`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`EngineMove`] for long-coordinate move text (`e2e4`, `e7e8q`)
//! - [`Fen`] parsing and serialization
//! - [`pgn`] tag pairs, move text tokenizing and wrapping
//! - [`ParseError`], the typed error every move parser reports

mod color;
mod error;
mod fen;
mod mov;
pub mod pgn;
mod piece;
mod result;
mod square;

pub use color::Color;
pub use error::{ParseError, ParseErrorKind};
pub use fen::{CastlingRights, Fen, FenError};
pub use mov::EngineMove;
pub use piece::Piece;
pub use result::GameResult;
pub use square::{File, Rank, Square};
