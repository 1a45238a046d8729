//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of leaf nodes at a given depth, which can be
//! compared against known-correct values to validate the legality rules.

use crate::Board;

/// Counts the number of leaf nodes at the given depth.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let candidates = board.legal_candidates(board.side_to_move());

    if depth == 1 {
        return candidates.len() as u64;
    }

    let snapshot = board.snapshot();
    let mut nodes = 0u64;
    for candidate in &candidates {
        if board.apply(candidate).is_ok() {
            nodes += perft(board, depth - 1);
        }
        board.restore(&snapshot);
    }
    nodes
}

/// Perft with divide: node count below each root move, keyed by its
/// coordinate text. Useful to find which move has a wrong count.
pub fn perft_divide(board: &mut Board, depth: u32) -> Vec<(String, u64)> {
    let candidates = board.legal_candidates(board.side_to_move());
    let snapshot = board.snapshot();
    let mut results = Vec::with_capacity(candidates.len());

    for candidate in &candidates {
        if board.apply(candidate).is_err() {
            continue;
        }
        let nodes = if depth > 1 {
            perft(board, depth - 1)
        } else {
            1
        };
        results.push((candidate.to_engine_move().to_string(), nodes));
        board.restore(&snapshot);
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

    fn count(fen: &str, depth: u32) -> u64 {
        let mut board = Board::from_fen_str(fen).unwrap();
        perft(&mut board, depth)
    }

    #[test]
    fn perft_startpos_depth_1() {
        assert_eq!(perft(&mut Board::standard(), 1), 20);
    }

    #[test]
    fn perft_startpos_depth_2() {
        assert_eq!(perft(&mut Board::standard(), 2), 400);
    }

    #[test]
    fn perft_startpos_depth_3() {
        assert_eq!(perft(&mut Board::standard(), 3), 8902);
    }

    #[test]
    #[ignore]
    fn perft_startpos_depth_4() {
        assert_eq!(perft(&mut Board::standard(), 4), 197281);
    }

    // Kiwipete - a position with lots of special moves
    #[test]
    fn perft_kiwipete_depth_1() {
        assert_eq!(count(KIWIPETE, 1), 48);
    }

    #[test]
    fn perft_kiwipete_depth_2() {
        assert_eq!(count(KIWIPETE, 2), 2039);
    }

    #[test]
    #[ignore]
    fn perft_kiwipete_depth_3() {
        assert_eq!(count(KIWIPETE, 3), 97862);
    }

    // Position 3: Check evasion, en passant, promotion
    #[test]
    fn perft_position3_depth_1() {
        assert_eq!(count(POSITION3, 1), 14);
    }

    #[test]
    fn perft_position3_depth_2() {
        assert_eq!(count(POSITION3, 2), 191);
    }

    #[test]
    fn perft_position3_depth_3() {
        assert_eq!(count(POSITION3, 3), 2812);
    }

    // Position 4: Lots of promotions and captures
    #[test]
    fn perft_position4_depth_1() {
        assert_eq!(count(POSITION4, 1), 6);
    }

    #[test]
    fn perft_position4_depth_2() {
        assert_eq!(count(POSITION4, 2), 264);
    }

    // Position 5: promotion with capture, discovered checks
    #[test]
    fn perft_position5_depth_1() {
        assert_eq!(count(POSITION5, 1), 44);
    }

    #[test]
    fn perft_position5_depth_2() {
        assert_eq!(count(POSITION5, 2), 1486);
    }

    #[test]
    fn perft_restores_board() {
        let mut board = Board::from_fen_str(KIWIPETE).unwrap();
        let before = board.clone();
        perft(&mut board, 2);
        assert_eq!(board, before);
    }

    #[test]
    fn divide_sums_to_perft() {
        let mut board = Board::standard();
        let divide = perft_divide(&mut board, 2);
        assert_eq!(divide.len(), 20);
        assert_eq!(divide.iter().map(|(_, n)| n).sum::<u64>(), 400);
        assert_eq!(divide[0].0, "a2a3");
    }
}
