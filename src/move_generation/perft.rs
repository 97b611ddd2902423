use std::thread;

use crate::board::board_state::Board;
use crate::board::board_types::Coordinate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub passes: usize,
    pub terminals: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.passes += rhs.passes;
        self.terminals += rhs.terminals;
    }
}

/// Counts leaf positions `depth` plies below `board`.
///
/// A pass counts as a ply. A position where neither side can move is a leaf
/// even when depth remains.
pub fn perft(board: &Board, depth: u8) -> PerftCounts {
    let mut scratch = board.clone();
    let mut total = PerftCounts::default();
    perft_recurse(&mut scratch, depth, &mut total);
    total
}

/// Same as `perft`, with one scoped worker per root move.
pub fn perft_multi_threaded(board: &Board, depth: u8) -> PerftCounts {
    if depth == 0 {
        return perft(board, depth);
    }

    let root_moves = board.legal_moves();
    if root_moves == [Coordinate::PASS] && board.bitboard().swapped().mobility() == 0 {
        return perft(board, depth);
    }

    let mut total = PerftCounts::default();
    thread::scope(|scope| {
        let handles: Vec<_> = root_moves
            .iter()
            .map(|&mv| {
                scope.spawn(move || {
                    let mut child = board.clone();
                    let mut local = PerftCounts::default();
                    if child.apply(mv) {
                        if mv == Coordinate::PASS && depth == 1 {
                            local.passes += 1;
                        }
                        perft_recurse(&mut child, depth - 1, &mut local);
                    }
                    local
                })
            })
            .collect();

        for handle in handles {
            // A panicking worker is a bug in the kernel; surface it.
            match handle.join() {
                Ok(local) => total.merge(local),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
    });
    total
}

fn perft_recurse(board: &mut Board, depth: u8, counts: &mut PerftCounts) {
    if depth == 0 {
        counts.nodes += 1;
        return;
    }

    let mobility = board.mobility();
    if mobility == 0 {
        if board.bitboard().swapped().mobility() == 0 {
            counts.nodes += 1;
            counts.terminals += 1;
            return;
        }
        if depth == 1 {
            counts.passes += 1;
        }
        if board.apply(Coordinate::PASS) {
            perft_recurse(board, depth - 1, counts);
            board.undo();
        }
        return;
    }

    for mv in Coordinate::iter_mask(mobility) {
        if board.apply(mv) {
            perft_recurse(board, depth - 1, counts);
            board.undo();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{perft, perft_multi_threaded};
    use crate::board::board_state::Board;

    const START_NODES: [usize; 7] = [4, 12, 56, 244, 1396, 8200, 55_092];

    #[test]
    fn perft_from_start_matches_known_counts() {
        let board = Board::cross();
        for (idx, expected) in START_NODES.iter().enumerate() {
            let depth = (idx + 1) as u8;
            let counts = perft(&board, depth);
            assert_eq!(counts.nodes, *expected, "depth {depth}");
        }
    }

    #[test]
    fn multi_threaded_matches_single_threaded() {
        let board = Board::cross();
        assert_eq!(perft_multi_threaded(&board, 6), perft(&board, 6));
        assert_eq!(perft_multi_threaded(&board, 0).nodes, 1);
    }

    #[test]
    fn perft_leaves_board_untouched() {
        let board = Board::cross();
        let _ = perft(&board, 4);
        assert!(board.same_position(&Board::cross()));
        assert_eq!(board.ply(), 0);
    }
}
