//! The two sides of a game.

use chess_core::Color;

/// One side of a [`Game`](crate::Game) and the moves it has made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    side: Color,
    read_only: bool,
    /// Serials of this side's moves, oldest first.
    moves: Vec<usize>,
}

impl Player {
    pub(crate) fn new(side: Color, read_only: bool) -> Self {
        Player {
            side,
            read_only,
            moves: Vec::new(),
        }
    }

    pub fn side(&self) -> Color {
        self.side
    }

    /// A read-only player belongs to an imported or frozen game and cannot
    /// move.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn moves(&self) -> &[usize] {
        &self.moves
    }

    pub fn last_move(&self) -> Option<usize> {
        self.moves.last().copied()
    }

    pub(crate) fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub(crate) fn record(&mut self, serial: usize) {
        self.moves.push(serial);
    }

    pub(crate) fn forget(&mut self, serial: usize) {
        if self.moves.last() == Some(&serial) {
            self.moves.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_forget() {
        let mut player = Player::new(Color::Black, false);
        player.record(1);
        player.record(3);
        assert_eq!(player.moves(), &[1, 3]);
        player.forget(1);
        assert_eq!(player.last_move(), Some(3));
        player.forget(3);
        assert_eq!(player.moves(), &[1]);
        assert_eq!(player.side(), Color::Black);
        assert!(!player.is_read_only());
    }
}
