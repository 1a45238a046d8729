//! Random legal walks checked against the history and notation invariants.

use chess_engine::{move_to_san, parse_san, Board, Game, MoveOutcome, SanToken};
use proptest::prelude::*;

/// Plays up to `choices.len()` moves, picking each by index into the legal
/// move list. Stops early when the game ends.
fn walk(choices: &[usize]) -> Game {
    let mut game = Game::new();
    for &choice in choices {
        if game.result().is_some() {
            break;
        }
        let legal = game.legal_moves();
        if legal.is_empty() {
            break;
        }
        let candidate = legal[choice % legal.len()];
        let text = candidate.to_engine_move().to_string();
        let outcome = game.play(&text).unwrap_or_else(|e| panic!("{text}: {e}"));
        assert!(matches!(outcome, MoveOutcome::Moved(_)));
    }
    game
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn legal_moves_apply_without_exposing_the_king(choices in prop::collection::vec(any::<usize>(), 0..40)) {
        let mut game = walk(&choices);
        let side = game.side_to_move();
        for candidate in game.legal_moves() {
            let mut board = game.board().clone();
            prop_assert!(board.apply(&candidate).is_ok(), "{:?}", candidate);
            prop_assert!(!board.is_check(side));
        }
    }

    #[test]
    fn fen_round_trips_at_every_ply(choices in prop::collection::vec(any::<usize>(), 0..40)) {
        let game = walk(&choices);
        for serial in 0..game.len() {
            let fen = game.state(serial).unwrap().board().to_fen();
            let board = Board::from_fen_str(&fen.to_string()).unwrap();
            prop_assert_eq!(board.to_fen(), fen);
        }
    }

    #[test]
    fn seek_is_idempotent(choices in prop::collection::vec(any::<usize>(), 1..40), target in any::<usize>()) {
        let mut game = walk(&choices);
        let ply = target % (game.len() + 1);
        game.seek(ply).unwrap();
        let first = (game.to_fen(), game.side_to_move());
        game.seek_to_end();
        game.seek(ply).unwrap();
        prop_assert_eq!((game.to_fen(), game.side_to_move()), first);
    }

    #[test]
    fn undo_restores_the_previous_position(choices in prop::collection::vec(any::<usize>(), 1..40)) {
        let mut game = walk(&choices);
        prop_assume!(game.len() > 0);
        game.seek(game.len() - 1).unwrap();
        let (fen, side, board) = (game.to_fen(), game.side_to_move(), game.board().clone());
        game.seek_to_end();

        let undone = game.undo().unwrap();
        prop_assert!(undone.is_some());
        prop_assert_eq!(game.to_fen(), fen);
        prop_assert_eq!(game.side_to_move(), side);
        prop_assert_eq!(game.board(), &board);
        prop_assert_eq!(game.result(), None);
    }

    #[test]
    fn pgn_round_trip_keeps_the_moves(choices in prop::collection::vec(any::<usize>(), 0..40)) {
        let game = walk(&choices);
        let text = game.to_pgn(&Default::default());
        let again = Game::from_pgn(&text).unwrap();
        prop_assert_eq!(again.san_moves(), game.san_moves());
        prop_assert_eq!(again.to_fen(), game.to_fen());
    }

    #[test]
    fn san_parses_back_to_the_same_move(choices in prop::collection::vec(any::<usize>(), 0..30)) {
        let mut game = walk(&choices);
        let mut board = game.board().clone();
        for candidate in game.legal_moves() {
            let san = move_to_san(&board, &candidate).unwrap();
            let parsed = parse_san(&mut board, &san).unwrap();
            prop_assert_eq!(parsed, SanToken::Move(candidate));
        }
    }
}

