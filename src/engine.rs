// =============================================================================
// Checkers AI Engine
//
// Minimax search with alpha-beta pruning over disposable board copies. A
// capture chain keeps the same side to move, so whether a node maximizes or
// minimizes is decided by whose turn it is on the board, not by the parity
// of the recursion depth.
//
// Candidate moves are shuffled with the engine's own seeded generator before
// being searched. That only changes which of several equally scored moves is
// returned; the score of the root is the same for any ordering.
//
// The evaluation is deliberately simple: material balance with kings worth
// two men, plus an optional piece-count term. It can be replaced without
// touching the search.
// =============================================================================

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::board::{Board, MoveOutcome};
use crate::moves::Move;
use crate::piece::Color;

// =============================================================================
// Configuration
// =============================================================================

/// Controls the search depth and evaluation mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Search depth in plies. Each jump of a chain consumes one ply.
    pub depth: u32,
    /// Add the total number of pieces on the board to the score, which
    /// makes the engine reluctant to trade.
    pub conservative: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AiConfig {
    pub fn new() -> Self {
        AiConfig {
            depth: 4,
            conservative: false,
        }
    }
}

// =============================================================================
// Constants
// =============================================================================

/// Score of a position where the opponent has no legal move.
pub const WIN_SCORE: i32 = 10_000;
/// Score of a position where the engine has no legal move.
pub const LOSE_SCORE: i32 = -10_000;
/// Score of a drawn position. Better than losing, worse than winning.
pub const DRAW_SCORE: i32 = 0;

/// The result of a search: the chosen move (if any), its score from the
/// engine's point of view and the number of static evaluations performed.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub mv: Option<Move>,
    pub score: i32,
    pub evals: u64,
}

// =============================================================================
// Evaluation
// =============================================================================

/// Material balance from `side`'s perspective: men count one, kings two.
/// In conservative mode the total number of pieces is added.
pub fn evaluate(board: &Board, side: Color, conservative: bool) -> i32 {
    let mut balance = 0;
    let mut pieces = 0;
    for sq in board.squares.iter().flatten() {
        if let Some(color) = sq.color() {
            let value = sq.material();
            if color == side {
                balance += value;
            } else {
                balance -= value;
            }
            pieces += 1;
        }
    }
    if conservative {
        balance + pieces
    } else {
        balance
    }
}

// =============================================================================
// Search
// =============================================================================

pub struct SearchEngine {
    side: Color,
    config: AiConfig,
    rng: StdRng,
}

impl SearchEngine {
    pub fn new(side: Color, config: AiConfig, seed: u64) -> Self {
        SearchEngine {
            side,
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn side(&self) -> Color {
        self.side
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Search from `board`, which must have `self.side` to move and whose
    /// legal moves are `moves`. The board itself is never modified. At least
    /// one ply is always searched so that a move is found whenever one exists.
    #[instrument(skip_all, fields(side = ?self.side, depth = self.config.depth, candidates = moves.len()))]
    pub fn search(&mut self, board: &Board, moves: &[Move]) -> SearchResult {
        let mut evals = 0;
        let (score, mv) = self.minimax(
            board,
            moves.to_vec(),
            self.config.depth.max(1),
            i32::MIN,
            i32::MAX,
            &mut evals,
        );
        debug!(score, evals, chosen = ?mv, "search finished");
        SearchResult { mv, score, evals }
    }

    fn terminal_score(&self, board: &Board, moves: &[Move], evals: &mut u64) -> i32 {
        *evals += 1;
        if moves.is_empty() {
            if board.current_turn == self.side {
                LOSE_SCORE
            } else {
                WIN_SCORE
            }
        } else {
            evaluate(board, self.side, self.config.conservative)
        }
    }

    fn minimax(
        &mut self,
        board: &Board,
        mut moves: Vec<Move>,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        evals: &mut u64,
    ) -> (i32, Option<Move>) {
        if depth == 0 || moves.is_empty() {
            return (self.terminal_score(board, &moves, evals), None);
        }

        let maximizing = board.current_turn == self.side;
        moves.shuffle(&mut self.rng);

        let mut best: Option<(i32, Move)> = None;
        for mv in moves {
            let mut next = board.clone();
            let score = match next.apply_move(&mv) {
                MoveOutcome::Draw => {
                    *evals += 1;
                    DRAW_SCORE
                }
                MoveOutcome::Continue(chain) => {
                    self.minimax(&next, chain, depth - 1, alpha, beta, evals).0
                }
                MoveOutcome::TurnPassed => {
                    let replies = next.legal_moves();
                    self.minimax(&next, replies, depth - 1, alpha, beta, evals).0
                }
            };

            let improves = match best {
                None => true,
                Some((best_score, _)) if maximizing => score > best_score,
                Some((best_score, _)) => score < best_score,
            };
            if improves {
                best = Some((score, mv));
            }

            if let Some((best_score, _)) = best {
                if maximizing {
                    alpha = alpha.max(best_score);
                } else {
                    beta = beta.min(best_score);
                }
            }
            if alpha >= beta {
                break;
            }
        }

        match best {
            Some((score, mv)) => (score, Some(mv)),
            None => (self.terminal_score(board, &[], evals), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Square;

    fn config(depth: u32) -> AiConfig {
        AiConfig {
            depth,
            conservative: false,
        }
    }

    #[test]
    fn material_eval_counts_kings_double() {
        let mut board = Board::empty();
        board.set((0, 0), Square::WhiteKing);
        board.set((2, 2), Square::WhiteMan);
        board.set((7, 7), Square::BlackMan);
        assert_eq!(evaluate(&board, Color::White, false), 2);
        assert_eq!(evaluate(&board, Color::Black, false), -2);
        assert_eq!(evaluate(&board, Color::White, true), 5);
        assert_eq!(evaluate(&Board::new(), Color::Black, false), 0);
    }

    /// White can start a double jump with (0,0) or make a single jump with
    /// (4,0). Black's spare king keeps the game alive afterwards.
    fn two_captures() -> Board {
        let mut board = Board::empty();
        board.set((0, 0), Square::WhiteMan);
        board.set((4, 0), Square::WhiteMan);
        board.set((1, 1), Square::BlackMan);
        board.set((3, 3), Square::BlackMan);
        board.set((5, 1), Square::BlackMan);
        board.set((7, 7), Square::BlackKing);
        board.reset_history();
        board
    }

    #[test]
    fn chain_is_searched_as_one_turn() {
        // Two plies are exactly enough to see both jumps of the chain. Had
        // the first jump handed the move to Black, the double jump would
        // look no better than the single one.
        let board = two_captures();
        let moves = board.legal_moves();
        assert_eq!(moves.len(), 2);
        for seed in 0..8 {
            let mut engine = SearchEngine::new(Color::White, config(2), seed);
            let result = engine.search(&board, &moves);
            assert_eq!(result.mv, Some(Move::new((0, 0), (2, 2))), "seed {seed}");
            assert_eq!(result.score, -1);
        }
    }

    #[test]
    fn prefers_the_longer_capture() {
        let board = two_captures();
        let mut engine = SearchEngine::new(Color::White, config(3), 7);
        let result = engine.search(&board, &board.legal_moves());
        assert_eq!(result.mv, Some(Move::new((0, 0), (2, 2))));
        assert!(result.evals > 0);
    }

    #[test]
    fn wiping_out_the_opponent_is_a_win() {
        // The forced capture removes Black's last piece.
        let mut board = Board::empty();
        board.set((0, 0), Square::WhiteMan);
        board.set((5, 7), Square::WhiteMan);
        board.set((6, 6), Square::BlackMan);
        board.reset_history();

        let moves = board.legal_moves();
        assert_eq!(moves, vec![Move::new((5, 7), (7, 5))]);
        let mut engine = SearchEngine::new(Color::White, config(2), 1);
        let result = engine.search(&board, &moves);
        assert_eq!(result.score, WIN_SCORE);
    }

    #[test]
    fn no_moves_is_a_loss() {
        let mut board = Board::empty();
        board.set((7, 7), Square::WhiteMan);
        board.set((0, 0), Square::BlackMan);
        board.reset_history();

        let mut engine = SearchEngine::new(Color::White, config(3), 1);
        let result = engine.search(&board, &board.legal_moves());
        assert_eq!(result.mv, None);
        assert_eq!(result.score, LOSE_SCORE);
    }

    #[test]
    fn draw_sits_between_win_and_loss() {
        assert!(LOSE_SCORE < DRAW_SCORE && DRAW_SCORE < WIN_SCORE);
    }

    #[test]
    fn search_never_touches_the_live_board() {
        let board = Board::new();
        let before = board.squares;
        let mut engine = SearchEngine::new(Color::White, config(4), 3);
        engine.search(&board, &board.legal_moves());
        assert_eq!(board.squares, before);
        assert_eq!(board.position_history.len(), 1);
    }

    #[test]
    fn same_seed_same_move() {
        let mut board = Board::new();
        board.apply_move(&Move::new((2, 2), (3, 3)));
        let moves = board.legal_moves();
        let picks: Vec<_> = (0..3)
            .map(|_| {
                let mut engine = SearchEngine::new(Color::Black, config(4), 42);
                engine.search(&board, &moves).mv
            })
            .collect();
        assert!(picks[0].is_some());
        assert!(picks.iter().all(|p| *p == picks[0]));
    }

    #[test]
    fn shuffle_changes_tie_break_not_score() {
        let board = Board::new();
        let moves = board.legal_moves();
        let scores: Vec<i32> = (0..6)
            .map(|seed| {
                let mut engine = SearchEngine::new(Color::White, config(4), seed);
                engine.search(&board, &moves).score
            })
            .collect();
        assert!(scores.iter().all(|&s| s == scores[0]), "{scores:?}");
    }

    #[test]
    fn prefers_draw_over_losing_position() {
        // Black is a man down. Moving the king to (6,6) produces a grid
        // already seen twice, which draws on the spot.
        let mut board = Board::empty();
        board.set((0, 0), Square::WhiteKing);
        board.set((0, 2), Square::WhiteMan);
        board.set((0, 4), Square::WhiteMan);
        board.set((7, 7), Square::BlackKing);
        board.set((5, 1), Square::BlackMan);
        board.current_turn = Color::Black;
        board.reset_history();

        let drawing = Move::new((7, 7), (6, 6));
        let mut after = board.clone();
        after.apply_move(&drawing);
        board.position_history.push(after.squares);
        board.position_history.push(after.squares);

        let moves = board.legal_moves();
        assert_eq!(moves.len(), 3);
        let mut engine = SearchEngine::new(Color::Black, config(2), 5);
        let result = engine.search(&board, &moves);
        assert_eq!(result.mv, Some(drawing));
        assert_eq!(result.score, DRAW_SCORE);
    }
}
