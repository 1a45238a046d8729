//! PGN (Portable Game Notation) text codec.
//!
//! This module only deals with text: tag pairs, move text tokens, comments
//! and line wrapping. Turning SAN tokens into moves needs a board and lives in
//! the engine.

mod movetext;
mod tags;

pub use movetext::{extract_comments, Comment, MoveText, Turn};
pub use tags::{Tags, REQUIRED_TAGS};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when reading PGN text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PgnError {
    #[error("malformed tag line: {0}")]
    MalformedTag(String),

    #[error("comment opened at byte {0} is never closed")]
    UnterminatedComment(usize),

    #[error("unbalanced variation parenthesis at byte {0}")]
    UnbalancedVariation(usize),

    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("token after game result: {0}")]
    TokenAfterResult(String),
}

/// Output settings for PGN export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgnWriteOptions {
    /// Column at which move text wraps.
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,
    /// Fill missing Seven Tag Roster entries with placeholders.
    #[serde(default = "default_true")]
    pub fill_required_tags: bool,
}

fn default_wrap_width() -> usize {
    50
}

fn default_true() -> bool {
    true
}

impl Default for PgnWriteOptions {
    fn default() -> Self {
        PgnWriteOptions {
            wrap_width: default_wrap_width(),
            fill_required_tags: true,
        }
    }
}

/// A single game: tags followed by move text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgnGame {
    pub tags: Tags,
    pub movetext: MoveText,
}

impl PgnGame {
    /// Parses one game.
    pub fn parse(text: &str) -> Result<Self, PgnError> {
        let (tags, rest) = Tags::parse(text)?;
        let movetext = MoveText::parse(rest)?;
        Ok(PgnGame { tags, movetext })
    }

    /// Parses every game in a multi-game file.
    ///
    /// A game ends where a tag line follows move text.
    pub fn parse_many(text: &str) -> Result<Vec<Self>, PgnError> {
        let mut games = Vec::new();
        let mut start = 0usize;
        let mut seen_moves = false;
        let mut offset = 0usize;
        for line in text.split_inclusive('\n') {
            let trimmed = line.trim_start();
            if trimmed.starts_with('[') {
                if seen_moves {
                    games.push(Self::parse(&text[start..offset])?);
                    start = offset;
                    seen_moves = false;
                }
            } else if !trimmed.trim().is_empty() {
                seen_moves = true;
            }
            offset += line.len();
        }
        if !text[start..].trim().is_empty() {
            games.push(Self::parse(&text[start..])?);
        }
        Ok(games)
    }

    /// Renders the game: tag lines, a blank line, then wrapped move text.
    pub fn write(&self, options: &PgnWriteOptions) -> String {
        let mut tags = self.tags.clone();
        if options.fill_required_tags {
            tags.fill_required();
        }
        if let Some(result) = self.movetext.result {
            tags.set("Result", result.as_token());
        }
        format!("{}\n{}\n", tags, self.movetext.write(options.wrap_width))
    }
}
