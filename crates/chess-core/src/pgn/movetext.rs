//! PGN move text: tokenizing, comment extraction, and wrapped output.

use super::PgnError;
use crate::{Color, GameResult};

/// A `{...}` or `;` comment lifted out of the move text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment body without braces, trimmed.
    pub text: String,
    /// Byte offset of the opening delimiter in the original text.
    pub offset: usize,
    /// Number of plies played before the comment.
    pub ply: usize,
}

/// One move number with the moves of each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub number: u32,
    pub white: Option<String>,
    pub black: Option<String>,
}

/// Tokenized move text of a single game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveText {
    pub turns: Vec<Turn>,
    pub result: Option<GameResult>,
    pub comments: Vec<Comment>,
}

impl MoveText {
    /// Builds move text from a list of SAN moves.
    ///
    /// `first_number` and `first_side` describe the first ply, so games that
    /// start from a position with Black to move are numbered `n...`.
    pub fn from_moves<S: AsRef<str>>(
        moves: &[S],
        first_number: u32,
        first_side: Color,
        result: Option<GameResult>,
    ) -> Self {
        let mut text = MoveText {
            result,
            ..MoveText::default()
        };
        let mut number = first_number;
        let mut side = first_side;
        for san in moves {
            let san = san.as_ref().to_string();
            match side {
                Color::White => text.turns.push(Turn {
                    number,
                    white: Some(san),
                    black: None,
                }),
                Color::Black => {
                    match text.turns.last_mut() {
                        Some(turn) if turn.black.is_none() && turn.number == number => {
                            turn.black = Some(san)
                        }
                        _ => text.turns.push(Turn {
                            number,
                            white: None,
                            black: Some(san),
                        }),
                    }
                    number += 1;
                }
            }
            side = side.opposite();
        }
        text
    }

    /// Parses move text (everything after the tag section).
    pub fn parse(text: &str) -> Result<Self, PgnError> {
        let (stripped, mut comments) = extract_comments(text)?;
        let stripped = strip_variations(&stripped)?;

        let mut out = MoveText::default();
        let mut expect_black = false;
        let mut plies_before: Vec<usize> = Vec::new();
        let mut ply = 0usize;

        for (offset, token) in tokens(&stripped) {
            if out.result.is_some() {
                return Err(PgnError::TokenAfterResult(token.to_string()));
            }
            if let Some(result) = GameResult::from_token(token) {
                out.result = Some(result);
                continue;
            }
            if token.starts_with('$') {
                continue;
            }

            let mut san = token;
            let digits = token.trim_start_matches(|c: char| c.is_ascii_digit());
            if digits.is_empty() {
                return Err(PgnError::UnexpectedToken(token.to_string()));
            }
            // `0-0` castling also starts with a digit; only `n.` and `n...` are numbers
            if digits.len() < token.len() && digits.starts_with('.') {
                let dots = digits.trim_start_matches('.');
                let number: u32 = token[..token.len() - digits.len()]
                    .parse()
                    .map_err(|_| PgnError::UnexpectedToken(token.to_string()))?;
                expect_black = digits.len() - dots.len() >= 3;
                out.turns.push(Turn {
                    number,
                    white: None,
                    black: None,
                });
                if dots.is_empty() {
                    continue;
                }
                san = dots;
            }

            out.place(san, &mut expect_black);
            plies_before.push(offset);
            ply += 1;
        }
        debug_assert_eq!(ply, plies_before.len());

        for comment in &mut comments {
            comment.ply = plies_before.partition_point(|&o| o < comment.offset);
        }
        out.comments = comments;
        Ok(out)
    }

    fn place(&mut self, san: &str, expect_black: &mut bool) {
        let san = Some(san.to_string());
        match self.turns.last_mut() {
            Some(turn) if !*expect_black && turn.white.is_none() && turn.black.is_none() => {
                turn.white = san;
                *expect_black = true;
            }
            Some(turn) if *expect_black && turn.black.is_none() => {
                turn.black = san;
                *expect_black = false;
            }
            last => {
                let number = last.map(|t| t.number + 1).unwrap_or(1);
                self.turns.push(Turn {
                    number,
                    white: san,
                    black: None,
                });
                *expect_black = true;
            }
        }
    }

    /// Moves in play order.
    pub fn moves(&self) -> impl Iterator<Item = &str> + '_ {
        self.turns
            .iter()
            .flat_map(|t| t.white.iter().chain(t.black.iter()))
            .map(String::as_str)
    }

    /// Number of plies in the text.
    pub fn ply_count(&self) -> usize {
        self.moves().count()
    }

    /// Renders the move text, wrapping lines at `width` columns.
    ///
    /// Lines only break before a move number, so a turn is never split. A
    /// turn longer than `width` gets a line of its own.
    pub fn write(&self, width: usize) -> String {
        let mut groups: Vec<String> = Vec::new();
        let mut ply = 0usize;
        let mut comments = self.comments.iter().peekable();
        let mut leading = String::new();
        while let Some(c) = comments.next_if(|c| c.ply == 0) {
            push_word(&mut leading, &format!("{{{}}}", c.text));
        }

        for turn in &self.turns {
            let mut group = std::mem::take(&mut leading);
            match (&turn.white, &turn.black) {
                (Some(_), _) => push_word(&mut group, &format!("{}.", turn.number)),
                (None, _) => push_word(&mut group, &format!("{}...", turn.number)),
            }
            for san in turn.white.iter().chain(turn.black.iter()) {
                push_word(&mut group, san);
                ply += 1;
                while let Some(c) = comments.next_if(|c| c.ply == ply) {
                    push_word(&mut group, &format!("{{{}}}", c.text));
                }
            }
            groups.push(group);
        }

        if let Some(result) = self.result {
            match groups.last_mut() {
                Some(last) => push_word(last, result.as_token()),
                None => {
                    push_word(&mut leading, result.as_token());
                    groups.push(leading);
                }
            }
        }

        wrap(&groups, width)
    }
}

fn push_word(line: &mut String, word: &str) {
    if !line.is_empty() {
        line.push(' ');
    }
    line.push_str(word);
}

fn wrap(groups: &[String], width: usize) -> String {
    let mut out = String::new();
    let mut line_len = 0usize;
    for group in groups {
        if line_len > 0 && line_len + 1 + group.len() > width {
            out.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(group);
        line_len += group.len();
    }
    out
}

/// Removes `{...}` and `;...` comments.
///
/// Comment bytes are replaced by spaces so offsets in the returned text line
/// up with offsets in `text`.
pub fn extract_comments(text: &str) -> Result<(String, Vec<Comment>), PgnError> {
    let mut stripped = String::with_capacity(text.len());
    let mut comments = Vec::new();
    let mut rest = text.char_indices().peekable();

    while let Some((offset, c)) = rest.next() {
        let close = match c {
            '{' => '}',
            ';' => '\n',
            _ => {
                stripped.push(c);
                continue;
            }
        };
        let mut body = String::new();
        let mut closed = false;
        for (_, inner) in rest.by_ref() {
            if inner == close {
                closed = true;
                break;
            }
            body.push(inner);
        }
        if !closed && close == '}' {
            return Err(PgnError::UnterminatedComment(offset));
        }
        let consumed = 2 + body.len() - usize::from(!closed);
        stripped.extend(std::iter::repeat(' ').take(consumed));
        comments.push(Comment {
            text: body.trim().to_string(),
            offset,
            ply: 0,
        });
    }
    Ok((stripped, comments))
}

/// Blanks out recursive annotation variations, keeping offsets intact.
fn strip_variations(text: &str) -> Result<String, PgnError> {
    let mut depth = 0usize;
    let mut out = String::with_capacity(text.len());
    for (offset, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(PgnError::UnbalancedVariation(offset))?;
                out.push(' ');
                continue;
            }
            _ => {}
        }
        if depth > 0 {
            out.extend(std::iter::repeat(' ').take(c.len_utf8()));
        } else {
            out.push(c);
        }
    }
    if depth != 0 {
        return Err(PgnError::UnbalancedVariation(text.len()));
    }
    Ok(out)
}

/// Whitespace separated tokens with their byte offsets.
fn tokens(text: &str) -> impl Iterator<Item = (usize, &str)> + '_ {
    text.split_ascii_whitespace()
        .map(move |t| (t.as_ptr() as usize - text.as_ptr() as usize, t))
}
