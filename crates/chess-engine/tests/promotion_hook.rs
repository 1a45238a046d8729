//! The async promotion hook of `Game::attempt_move_with`.

use chess_engine::{Color, Game, MoveFailure, MoveOutcome, Piece, PromotionRequest, Square};
use std::cell::Cell;

const PAWN_ON_SEVENTH: &str = "8/4P3/8/8/8/8/k7/4K3 w - - 0 1";

#[tokio::test]
async fn hook_chooses_the_piece() {
    let mut game = Game::from_fen(PAWN_ON_SEVENTH).unwrap();
    let outcome = game
        .attempt_move_with(Color::White, "e7e8", |request: PromotionRequest| async move {
            assert_eq!(request.color, Color::White);
            assert_eq!(request.from, Square::from_algebraic("e7").unwrap());
            assert_eq!(request.to, Square::E8);
            assert_eq!(request.serial, 0);
            Piece::Knight
        })
        .await
        .unwrap();

    let MoveOutcome::Moved(m) = outcome else {
        panic!("expected a move");
    };
    assert_eq!(m.promotion, Some(Piece::Knight));
    assert_eq!(m.san, "e8=N");
    assert_eq!(
        game.board().piece_at(Square::E8),
        Some((Piece::Knight, Color::White))
    );
}

#[tokio::test]
async fn hook_is_skipped_when_the_text_names_the_piece() {
    let mut game = Game::from_fen(PAWN_ON_SEVENTH).unwrap();
    let called = Cell::new(false);
    game.attempt_move_with(Color::White, "e8=R", |_| {
        called.set(true);
        async { Piece::Queen }
    })
    .await
    .unwrap();
    assert!(!called.get());
    assert_eq!(game.moves()[0].promotion, Some(Piece::Rook));
}

#[tokio::test]
async fn hook_is_skipped_for_ordinary_moves() {
    let mut game = Game::new();
    let called = Cell::new(false);
    game.attempt_move_with(Color::White, "e4", |_| {
        called.set(true);
        async { Piece::Queen }
    })
    .await
    .unwrap();
    assert!(!called.get());
}

#[tokio::test]
async fn illegal_move_never_reaches_the_hook() {
    let mut game = Game::from_fen(PAWN_ON_SEVENTH).unwrap();
    let called = Cell::new(false);
    let err = game
        .attempt_move_with(Color::Black, "e7e8", |_| {
            called.set(true);
            async { Piece::Queen }
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        MoveFailure::WrongPlayer {
            expected: Color::White
        }
    );
    assert!(!called.get());
}

#[tokio::test]
async fn invalid_choice_leaves_the_game_unchanged() {
    let mut game = Game::from_fen(PAWN_ON_SEVENTH).unwrap();
    let fen = game.to_fen();
    let err = game
        .attempt_move_with(Color::White, "e7e8", |_| async { Piece::King })
        .await
        .unwrap_err();
    assert_eq!(err, MoveFailure::InvalidPromotion);
    assert_eq!(game.to_fen(), fen);
    assert!(game.is_empty());
}
