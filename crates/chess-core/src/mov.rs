//! Long-coordinate ("engine") move text.
//!
//! A move is written as origin and destination squares plus an optional
//! promotion letter: `e2e4`, `e7e8q`. Whole games may be written as the
//! delimiter-free concatenation of such moves.

use crate::{ParseError, ParseErrorKind, Piece, Rank, Square};
use std::fmt;

/// A move in long-coordinate notation, not yet checked against a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl EngineMove {
    /// Creates a move without promotion.
    pub const fn new(from: Square, to: Square) -> Self {
        EngineMove {
            from,
            to,
            promotion: None,
        }
    }

    /// Parses a single 4 or 5 character token.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let err = |kind| ParseError::new(kind, s);

        if s.is_empty() {
            return Err(err(ParseErrorKind::NoInput));
        }
        if !s.is_ascii() {
            return Err(err(ParseErrorKind::InvalidInput));
        }
        if s.len() != 4 && s.len() != 5 {
            return Err(err(ParseErrorKind::UnknownFormat));
        }

        let from = Square::from_algebraic(&s[0..2])
            .ok_or_else(|| err(ParseErrorKind::UnableToParseSourceSquare))?;
        let to = Square::from_algebraic(&s[2..4])
            .ok_or_else(|| err(ParseErrorKind::UnableToParseTargetSquare))?;

        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => Some(
                Piece::from_promotion_char(c)
                    .ok_or_else(|| err(ParseErrorKind::CannotParseFiveCharacterMove))?,
            ),
        };

        Ok(EngineMove {
            from,
            to,
            promotion,
        })
    }

    /// Returns true if `s` has the shape of a coordinate move, which is how
    /// callers tell it apart from SAN.
    pub fn looks_like(s: &str) -> bool {
        let bytes = s.as_bytes();
        (bytes.len() == 4 || bytes.len() == 5)
            && bytes[..4]
                .chunks(2)
                .all(|sq| (b'a'..=b'h').contains(&sq[0]) && (b'1'..=b'8').contains(&sq[1]))
    }

    /// Splits a delimiter-free sequence (`e2e4e7e5g1f3`) into moves.
    ///
    /// Tokens are read in 4 character windows. A window grows to 5 characters
    /// when the next character is a promotion letter; a lowercase `b`
    /// followed by a rank digit is the file of the next move instead.
    pub fn parse_sequence(text: &str) -> Result<Vec<EngineMove>, ParseError> {
        let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if text.is_empty() {
            return Err(ParseError::new(ParseErrorKind::NoInput, text));
        }
        if !text.is_ascii() {
            return Err(ParseError::new(ParseErrorKind::InvalidInput, text));
        }

        let bytes = text.as_bytes();
        let mut moves = Vec::with_capacity(bytes.len() / 4);
        let mut start = 0;
        while start < bytes.len() {
            let mut end = (start + 4).min(bytes.len());
            if end < bytes.len() && Self::is_promotion_suffix(bytes, end) {
                end += 1;
            }
            moves.push(Self::parse(&text[start..end])?);
            start = end;
        }
        Ok(moves)
    }

    fn is_promotion_suffix(bytes: &[u8], at: usize) -> bool {
        let c = bytes[at] as char;
        if Piece::from_promotion_char(c).is_none() {
            return false;
        }
        if c != 'b' {
            return true;
        }
        !bytes
            .get(at + 1)
            .is_some_and(|&next| Rank::from_char(next as char).is_some())
    }

    /// Renders a sequence back into the delimiter-free form.
    pub fn join(moves: &[EngineMove]) -> String {
        moves.iter().map(EngineMove::to_string).collect()
    }
}

impl fmt::Display for EngineMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.to_fen_char(crate::Color::Black))?;
        }
        Ok(())
    }
}
