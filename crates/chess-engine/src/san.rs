//! Standard Algebraic Notation (SAN) parsing and generation.
//!
//! SAN is the standard way to record chess moves in human-readable form.
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1"

use crate::board::{Board, CastleSide};
use crate::movegen::Plan;
use crate::record::Candidate;
use chess_core::{File, GameResult, ParseError, ParseErrorKind, Piece, Rank, Square};

/// What a SAN token means on the board it was read against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanToken {
    Move(Candidate),
    /// A termination token such as `1-0`.
    GameEnd(GameResult),
}

/// Converts a move to SAN given the board before the move, including the
/// `+`/`#` suffix. Returns `None` if the move is not legal.
pub fn move_to_san(board: &Board, candidate: &Candidate) -> Option<String> {
    let mut board = board.clone();
    let mut san = san_body(&mut board, candidate)?;
    board.apply(candidate).ok()?;
    san.push_str(check_suffix(&mut board));
    Some(san)
}

/// SAN for `candidate` without the check suffix, which only the board after
/// the move can tell. Returns `None` if the move is not legal.
pub fn san_body(board: &mut Board, candidate: &Candidate) -> Option<String> {
    let plan = board.plan(candidate)?;
    if board.exposes_king(&plan) {
        return None;
    }
    if let Some(castle) = plan.castle {
        return Some(castle.side.san().to_string());
    }

    let mut san = String::new();
    if plan.piece != Piece::Pawn {
        san.push(plan.piece.to_san_char());
        san.push_str(&get_disambiguation(board, &plan));
    }

    if plan.capture.is_some() {
        if plan.piece == Piece::Pawn {
            // Pawn captures include the source file
            san.push(plan.from.file().to_char());
        }
        san.push('x');
    }

    san.push_str(&plan.to.to_algebraic());

    if plan.promotes {
        if let Some(piece) = candidate.promotion {
            san.push('=');
            san.push(piece.to_san_char());
        }
    }
    Some(san)
}

/// `#` if the side to move is mated, `+` if it is in check, else empty.
pub fn check_suffix(board: &mut Board) -> &'static str {
    let side = board.side_to_move();
    if !board.is_check(side) {
        ""
    } else if board.has_legal_move(side) {
        "+"
    } else {
        "#"
    }
}

/// Parses SAN for the side to move on `board`.
///
/// The board is only probed, never changed.
pub fn parse_san(board: &mut Board, text: &str) -> Result<SanToken, ParseError> {
    let input = text.trim();
    let err = |kind| ParseError::new(kind, input);

    if input.is_empty() {
        return Err(err(ParseErrorKind::NoInput));
    }
    if let Some(result) = GameResult::from_token(input) {
        return Ok(SanToken::GameEnd(result));
    }

    // Remove annotation and check suffixes for parsing
    let san = input
        .trim_end_matches(|c: char| matches!(c, '!' | '?'))
        .trim_end_matches(|c: char| matches!(c, '+' | '#'));
    if san.is_empty() || !san.chars().all(is_san_char) {
        return Err(err(ParseErrorKind::InvalidInput));
    }

    match san {
        "O-O" | "0-0" => return find_castling_move(board, CastleSide::Kingside).map_err(err),
        "O-O-O" | "0-0-0" => return find_castling_move(board, CastleSide::Queenside).map_err(err),
        _ => {}
    }

    let parsed = parse_san_components(san).map_err(err)?;
    find_matching_move(board, &parsed)
        .map(SanToken::Move)
        .map_err(err)
}

/// Characters that can appear in a SAN move once suffixes are removed.
pub fn is_san_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '=' | ':')
}

/// Parsed components of a SAN string.
#[derive(Debug)]
struct ParsedSan {
    piece: Piece,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to_square: Square,
    promotion: Option<Piece>,
    is_capture: bool,
}

fn parse_san_components(san: &str) -> Result<ParsedSan, ParseErrorKind> {
    let (body, promotion) = split_promotion(san)?;

    let first = body
        .chars()
        .next()
        .ok_or(ParseErrorKind::UnrecognizedAlgebraicNotation)?;
    let (piece, rest) = if first.is_ascii_uppercase() {
        let piece = Piece::from_san_char(first).ok_or(ParseErrorKind::MovedPieceUndefined)?;
        (piece, &body[1..])
    } else {
        (Piece::Pawn, body)
    };

    // The last two characters are the destination square
    if rest.len() < 2 {
        return Err(ParseErrorKind::TargetSquareUndefined);
    }
    let (prefix, target) = rest.split_at(rest.len() - 2);
    let to_square = Square::from_algebraic(target).ok_or(ParseErrorKind::TargetSquareUndefined)?;

    let (prefix, is_capture) = match prefix.strip_suffix(|c: char| matches!(c, 'x' | ':')) {
        Some(prefix) => (prefix, true),
        None => (prefix.strip_suffix('-').unwrap_or(prefix), false),
    };
    if prefix.contains(|c: char| matches!(c, 'x' | ':')) {
        return Err(ParseErrorKind::UnableToParseCapture);
    }

    // Any characters before the destination are disambiguation
    let (from_file, from_rank) = parse_disambiguation(prefix).ok_or(if is_capture {
        ParseErrorKind::CannotParseCapturerSquare
    } else {
        ParseErrorKind::UnmatchedMovePattern
    })?;

    if piece == Piece::Pawn && is_capture && from_file.is_none() {
        return Err(ParseErrorKind::CapturingPieceUndefined);
    }
    if promotion.is_some() && piece != Piece::Pawn {
        return Err(ParseErrorKind::UnmatchedMovePattern);
    }

    Ok(ParsedSan {
        piece,
        from_file,
        from_rank,
        to_square,
        promotion,
        is_capture,
    })
}

/// Splits `e8=Q` (or the older `e8Q`) into body and promotion piece.
fn split_promotion(san: &str) -> Result<(&str, Option<Piece>), ParseErrorKind> {
    if let Some((body, piece)) = san.split_once('=') {
        let mut chars = piece.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_uppercase() => Piece::from_promotion_char(c)
                .map(|piece| (body, Some(piece)))
                .ok_or(ParseErrorKind::UnrecognizedAlgebraicNotation),
            _ => Err(ParseErrorKind::UnrecognizedAlgebraicNotation),
        };
    }

    let bytes = san.as_bytes();
    if let [.., rank, last] = bytes {
        let last = *last as char;
        if matches!(*rank, b'1' | b'8') && last.is_ascii_uppercase() {
            if let Some(piece) = Piece::from_promotion_char(last) {
                return Ok((&san[..san.len() - 1], Some(piece)));
            }
        }
    }
    Ok((san, None))
}

fn parse_disambiguation(s: &str) -> Option<(Option<File>, Option<Rank>)> {
    let chars: Vec<char> = s.chars().collect();

    match chars.as_slice() {
        [] => Some((None, None)),
        [c] => match (File::from_char(*c), Rank::from_char(*c)) {
            (Some(file), _) => Some((Some(file), None)),
            (None, Some(rank)) => Some((None, Some(rank))),
            (None, None) => None,
        },
        [f, r] => Some((Some(File::from_char(*f)?), Some(Rank::from_char(*r)?))),
        _ => None,
    }
}

fn find_castling_move(board: &mut Board, side: CastleSide) -> Result<SanToken, ParseErrorKind> {
    let color = board.side_to_move();
    match board.castle_plan(color, side) {
        Some(plan) if !board.exposes_king(&plan) => {
            Ok(SanToken::Move(Candidate::castle(plan.from, plan.to, side)))
        }
        _ => Err(ParseErrorKind::InvalidCastle),
    }
}

fn find_matching_move(board: &mut Board, parsed: &ParsedSan) -> Result<Candidate, ParseErrorKind> {
    let color = board.side_to_move();
    let to = parsed.to_square;

    match board.piece_at(to) {
        Some((_, owner)) if owner == color => return Err(ParseErrorKind::TargetSquareUnreachable),
        Some(_) if !parsed.is_capture => return Err(ParseErrorKind::BoardMismatch),
        _ => {}
    }

    let origins: Vec<Square> = board
        .active_pieces()
        .filter(|(_, p)| p.color == color && p.kind == parsed.piece)
        .filter_map(|(_, p)| p.square)
        .filter(|sq| parsed.from_file.map_or(true, |file| sq.file() == file))
        .filter(|sq| parsed.from_rank.map_or(true, |rank| sq.rank() == rank))
        .collect();
    if origins.is_empty() {
        return Err(ParseErrorKind::UnableToFindMovablePiece);
    }

    let geometric: Vec<Plan> = origins
        .iter()
        .filter_map(|&from| board.step_plan(from, to))
        .collect();
    if parsed.is_capture
        && board.occupant(to).is_none()
        && !geometric.iter().any(|plan| plan.en_passant)
    {
        return Err(ParseErrorKind::BoardMismatch);
    }
    if geometric.is_empty() {
        return Err(if parsed.is_capture {
            ParseErrorKind::CapturingPieceUndefined
        } else {
            ParseErrorKind::TargetSquareUnreachable
        });
    }
    if !parsed.is_capture && geometric.iter().all(|plan| plan.en_passant) {
        return Err(ParseErrorKind::BoardMismatch);
    }

    let legal: Vec<Plan> = geometric
        .into_iter()
        .filter(|plan| !board.exposes_king(plan))
        .collect();

    match legal.as_slice() {
        [] => Err(ParseErrorKind::IllegalMove),
        [plan] => {
            if parsed.promotion.is_some() && !plan.promotes {
                return Err(ParseErrorKind::UnmatchedMovePattern);
            }
            Ok(Candidate {
                from: plan.from,
                to,
                promotion: parsed.promotion,
                castle: None,
            })
        }
        _ => Err(ParseErrorKind::MoreThanOnePossibleMovedPiece),
    }
}

fn get_disambiguation(board: &mut Board, plan: &Plan) -> String {
    let from = plan.from;
    let rivals: Vec<Square> = board
        .active_pieces()
        .filter(|(id, p)| *id != plan.mover && p.kind == plan.piece && p.color == plan.color)
        .filter_map(|(_, p)| p.square)
        .collect();

    // Other pieces of the same kind that can legally reach the same square
    let rivals: Vec<Square> = rivals
        .into_iter()
        .filter(|&other| {
            board
                .step_plan(other, plan.to)
                .is_some_and(|p| !board.exposes_king(&p))
        })
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|o| o.file() != from.file()) {
        return from.file().to_char().to_string();
    }
    if rivals.iter().all(|o| o.rank() != from.rank()) {
        return from.rank().to_char().to_string();
    }

    // Need both file and rank
    from.to_algebraic()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn san(fen: &str, from: &str, to: &str) -> String {
        let board = Board::from_fen_str(fen).unwrap();
        move_to_san(&board, &Candidate::new(sq(from), sq(to))).unwrap()
    }

    fn parse(fen: &str, text: &str) -> Result<Candidate, ParseErrorKind> {
        let mut board = Board::from_fen_str(fen).unwrap();
        match parse_san(&mut board, text) {
            Ok(SanToken::Move(candidate)) => Ok(candidate),
            Ok(SanToken::GameEnd(result)) => panic!("unexpected result {result}"),
            Err(e) => Err(e.kind),
        }
    }

    const START: &str = chess_core::Fen::STARTPOS;

    #[test]
    fn san_pawn_push() {
        assert_eq!(san(START, "e2", "e4"), "e4");
    }

    #[test]
    fn san_knight_move() {
        assert_eq!(san(START, "g1", "f3"), "Nf3");
    }

    #[test]
    fn san_pawn_capture() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2";
        assert_eq!(san(fen, "e4", "d5"), "exd5");
    }

    #[test]
    fn san_castling() {
        let fen = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";
        assert_eq!(san(fen, "e1", "g1"), "O-O");
        assert_eq!(san(fen, "e1", "c1"), "O-O-O");
    }

    #[test]
    fn san_promotion() {
        let board = Board::from_fen_str("8/P7/8/8/8/8/8/4K1k1 w - - 0 1").unwrap();
        let candidate = Candidate::new(sq("a7"), sq("a8")).with_promotion(Piece::Queen);
        assert_eq!(move_to_san(&board, &candidate).unwrap(), "a8=Q");
    }

    #[test]
    fn san_knight_disambiguation_file() {
        assert_eq!(san("8/8/8/8/8/8/8/1N1K1N1k w - - 0 1", "b1", "d2"), "Nbd2");
    }

    #[test]
    fn san_rook_disambiguation() {
        let fen = "4k3/8/8/8/8/8/6K1/R6R w - - 0 1";
        assert_eq!(san(fen, "a1", "d1"), "Rad1");
        assert_eq!(san("4k3/8/8/8/8/8/8/R3K2R w - - 0 1", "a1", "d1"), "Rd1");
        let fen = "k7/8/8/8/4R3/8/8/4RK2 w - - 0 1";
        assert_eq!(san(fen, "e1", "e2"), "R1e2");
        assert_eq!(san(fen, "e4", "e2"), "R4e2");
    }

    #[test]
    fn san_disambiguation_ignores_pinned_rival() {
        // The c3 knight is pinned, so Ne2 needs no disambiguation.
        let fen = "4k3/8/8/b7/8/2N5/8/4K1N1 w - - 0 1";
        assert_eq!(san(fen, "g1", "e2"), "Ne2");
    }

    #[test]
    fn san_check() {
        assert_eq!(san("8/8/8/8/8/8/8/4K1Qk w - - 0 1", "g1", "h2"), "Qh2+");
    }

    #[test]
    fn san_checkmate() {
        assert_eq!(san("6k1/5ppp/8/8/8/8/8/R3K3 w Q - 0 1", "a1", "a8"), "Ra8#");
    }

    #[test]
    fn illegal_move_has_no_san() {
        let board = Board::standard();
        assert_eq!(move_to_san(&board, &Candidate::new(sq("e2"), sq("e5"))), None);
    }

    #[test]
    fn parse_san_basic_moves() {
        assert_eq!(parse(START, "e4"), Ok(Candidate::new(sq("e2"), sq("e4"))));
        assert_eq!(parse(START, "Nf3"), Ok(Candidate::new(sq("g1"), sq("f3"))));
        assert_eq!(parse(START, "Nf3!?"), Ok(Candidate::new(sq("g1"), sq("f3"))));
    }

    #[test]
    fn parse_san_castling() {
        let fen = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";
        assert_eq!(
            parse(fen, "O-O"),
            Ok(Candidate::castle(Square::E1, Square::G1, CastleSide::Kingside))
        );
        assert_eq!(
            parse(fen, "0-0-0"),
            Ok(Candidate::castle(Square::E1, Square::C1, CastleSide::Queenside))
        );
        assert_eq!(parse(START, "O-O"), Err(ParseErrorKind::InvalidCastle));
    }

    #[test]
    fn parse_san_with_check_suffix() {
        let parsed = parse("8/8/8/8/8/8/8/4K1Qk w - - 0 1", "Qh2+").unwrap();
        assert_eq!(parsed.to, sq("h2"));
    }

    #[test]
    fn parse_san_promotion_forms() {
        let fen = "8/P7/8/8/8/8/8/4K1k1 w - - 0 1";
        assert_eq!(parse(fen, "a8=Q").unwrap().promotion, Some(Piece::Queen));
        assert_eq!(parse(fen, "a8N").unwrap().promotion, Some(Piece::Knight));
        assert_eq!(parse(fen, "a8").unwrap().promotion, None);
        assert_eq!(parse(fen, "a8=K"), Err(ParseErrorKind::UnrecognizedAlgebraicNotation));
    }

    #[test]
    fn parse_san_disambiguation() {
        // Knights on b8 and f6 can both reach d7.
        let fen = "rn2kb1r/ppp2ppp/5n2/8/8/8/PPP2PPP/RNB1KBNR b KQkq - 0 1";
        assert_eq!(parse(fen, "Nbd7"), Ok(Candidate::new(sq("b8"), sq("d7"))));
        assert_eq!(parse(fen, "Nfd7"), Ok(Candidate::new(sq("f6"), sq("d7"))));
        assert_eq!(parse(fen, "Nd7"), Err(ParseErrorKind::MoreThanOnePossibleMovedPiece));

        // Rooks on a1 and f1 reach e1; rooks on e1 and e5 reach e3.
        let fen = "4k3/8/8/8/8/8/8/R4RK1 w - - 0 1";
        assert_eq!(parse(fen, "Rae1"), Ok(Candidate::new(sq("a1"), sq("e1"))));
        assert_eq!(parse(fen, "Re1"), Err(ParseErrorKind::MoreThanOnePossibleMovedPiece));
        let fen = "4k3/8/8/4R3/8/8/8/4R1K1 w - - 0 1";
        assert_eq!(parse(fen, "R1e3"), Ok(Candidate::new(sq("e1"), sq("e3"))));
        assert_eq!(parse(fen, "R5e3"), Ok(Candidate::new(sq("e5"), sq("e3"))));
    }

    #[test]
    fn parse_san_en_passant() {
        let fen = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        assert_eq!(parse(fen, "exf6"), Ok(Candidate::new(sq("e5"), sq("f6"))));
        assert_eq!(parse(fen, "exd6"), Err(ParseErrorKind::BoardMismatch));
    }

    #[test]
    fn parse_san_game_end() {
        let mut board = Board::standard();
        assert_eq!(
            parse_san(&mut board, "1-0"),
            Ok(SanToken::GameEnd(GameResult::WhiteWins))
        );
        assert_eq!(
            parse_san(&mut board, "1/2-1/2"),
            Ok(SanToken::GameEnd(GameResult::Draw))
        );
    }

    #[test]
    fn parse_san_error_kinds() {
        assert_eq!(parse(START, ""), Err(ParseErrorKind::NoInput));
        assert_eq!(parse(START, "e4 e5"), Err(ParseErrorKind::InvalidInput));
        assert_eq!(parse(START, "Ze4"), Err(ParseErrorKind::MovedPieceUndefined));
        assert_eq!(parse(START, "N"), Err(ParseErrorKind::TargetSquareUndefined));
        assert_eq!(parse(START, "Nf9"), Err(ParseErrorKind::TargetSquareUndefined));
        assert_eq!(parse(START, "Nf2"), Err(ParseErrorKind::TargetSquareUnreachable));
        assert_eq!(parse(START, "Ke4"), Err(ParseErrorKind::TargetSquareUnreachable));
        assert_eq!(parse(START, "xe3"), Err(ParseErrorKind::CapturingPieceUndefined));
        assert_eq!(parse(START, "Nxe7"), Err(ParseErrorKind::CapturingPieceUndefined));
        assert_eq!(parse(START, "Nxe5"), Err(ParseErrorKind::BoardMismatch));
        assert_eq!(parse(START, "Nxf3"), Err(ParseErrorKind::BoardMismatch));
        assert_eq!(parse(START, "Nx1xf3"), Err(ParseErrorKind::UnableToParseCapture));
        assert_eq!(parse(START, "N%xf3"), Err(ParseErrorKind::InvalidInput));
        assert_eq!(parse(START, "Nzxf3"), Err(ParseErrorKind::CannotParseCapturerSquare));
        assert_eq!(parse(START, "Nzf3"), Err(ParseErrorKind::UnmatchedMovePattern));
        assert_eq!(parse(START, "Qe2"), Err(ParseErrorKind::TargetSquareUnreachable));
        assert_eq!(
            parse("4k3/8/8/8/8/8/8/4K3 w - - 0 1", "Nf3"),
            Err(ParseErrorKind::UnableToFindMovablePiece)
        );
        assert_eq!(
            parse("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1", "Nc3"),
            Err(ParseErrorKind::IllegalMove)
        );
    }

    #[test]
    fn san_roundtrip() {
        for fen in [
            START,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        ] {
            let mut board = Board::from_fen_str(fen).unwrap();
            for candidate in board.legal_candidates(board.side_to_move()) {
                let text = move_to_san(&board, &candidate).unwrap();
                let parsed = parse_san(&mut board, &text).unwrap();
                assert_eq!(parsed, SanToken::Move(candidate), "roundtrip failed for {text}");
            }
        }
    }
}
