//! Fixed-depth alpha-beta search.
//!
//! [`SearchEngine`] runs a negamax search with alpha-beta pruning to a fixed
//! depth and scores leaves with a [`GenomeEvaluator`]. There is no
//! transposition table, quiescence search or iterative deepening; the search
//! is a plain baseline whose strength comes entirely from the genome.
//!
//! # Node Evaluation
//!
//! Each node is resolved in this order:
//!
//! 1. A finished game is scored as [`Board::terminal_state`] adjudicates it:
//!    checkmate scores `-(MATE_SCORE - ply)`, every draw scores `0`. Mate
//!    takes precedence over rule-based draws, so a mate delivered on the
//!    fiftieth move still counts. Preferring the smaller ply makes the engine
//!    mate as fast as possible and delay being mated.
//! 2. At depth `0` the evaluator score is returned from the mover's
//!    perspective.
//!
//! # Determinism
//!
//! Moves are searched captures-first, otherwise in generation order, and a
//! move replaces the current best only if it scores strictly higher. The same
//! board and genome therefore always yield the same move.

use evochess_engine::{Board, Move};

use crate::{
    evaluator::{Evaluator as _, GenomeEvaluator},
    genome::Genome,
};

/// Score of being checkmated at the root; mates further away score less.
pub const MATE_SCORE: f32 = 100_000.0;

/// Mate scores lie within this many plies of [`MATE_SCORE`].
const MAX_MATE_PLY: f32 = 1_000.0;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("search depth must be at least 1, got {depth}")]
pub struct SearchDepthError {
    pub depth: u32,
}

/// Anything that can choose a move in a position.
pub trait Player {
    /// Returns the move to play, or `None` if there is no legal move.
    fn choose_move(&self, board: &Board) -> Option<Move>;
}

/// Outcome of a root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    pub best_move: Move,
    /// Score of `best_move` from the perspective of the side to move.
    pub score: f32,
    /// Number of nodes visited, including leaves.
    pub nodes: u64,
}

impl SearchResult {
    /// Whether the score announces a forced mate for either side.
    #[must_use]
    pub fn is_mate_score(&self) -> bool {
        self.score.abs() >= MATE_SCORE - MAX_MATE_PLY
    }
}

/// Alpha-beta searcher playing with one genome at a fixed depth.
///
/// # Example
///
/// ```
/// use evochess_engine::{Board, UciMove};
/// use evochess_evaluator::{genome::Genome, search::SearchEngine};
///
/// let mut board = Board::initial();
/// for uci in ["f2f3", "e7e5", "g2g4"] {
///     board = board.apply_uci(uci.parse().unwrap()).unwrap().1;
/// }
/// let engine = SearchEngine::new(Genome::default(), 2).unwrap();
/// let result = engine.best_move(&board).unwrap();
/// assert_eq!(result.best_move.to_string(), "d8h4");
/// assert!(result.is_mate_score());
/// ```
#[derive(Debug, Clone)]
pub struct SearchEngine {
    evaluator: GenomeEvaluator,
    depth: u32,
}

impl SearchEngine {
    pub fn new(genome: Genome, depth: u32) -> Result<Self, SearchDepthError> {
        if depth == 0 {
            return Err(SearchDepthError { depth });
        }
        Ok(Self {
            evaluator: GenomeEvaluator::new(genome),
            depth,
        })
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[must_use]
    pub fn evaluator(&self) -> &GenomeEvaluator {
        &self.evaluator
    }

    /// Searches `board` and returns the best move for the side to move.
    ///
    /// Returns `None` if the side to move has no legal move.
    #[must_use]
    pub fn best_move(&self, board: &Board) -> Option<SearchResult> {
        let children = ordered_children(board);
        let mut nodes = 1;
        let mut alpha = f32::NEG_INFINITY;
        let beta = f32::INFINITY;
        let mut best: Option<(Move, f32)> = None;
        for (mv, child) in &children {
            let score = -self.negamax(child, self.depth - 1, 1, -beta, -alpha, &mut nodes);
            log::trace!("root move {mv}: {score}");
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((*mv, score));
            }
            alpha = alpha.max(score);
        }
        let (best_move, score) = best?;
        Some(SearchResult {
            best_move,
            score,
            nodes,
        })
    }

    fn negamax(
        &self,
        board: &Board,
        depth: u32,
        ply: u32,
        mut alpha: f32,
        beta: f32,
        nodes: &mut u64,
    ) -> f32 {
        *nodes += 1;
        if let Some(score) = terminal_score(board, ply) {
            return score;
        }
        if depth == 0 {
            return self.evaluator.score(board) * board.side_to_move().sign();
        }

        let children = ordered_children(board);
        let mut best = f32::NEG_INFINITY;
        for (_, child) in &children {
            let score = -self.negamax(child, depth - 1, ply + 1, -beta, -alpha, nodes);
            best = best.max(score);
            alpha = alpha.max(best);
            if alpha >= beta {
                break;
            }
        }
        best
    }
}

impl Player for SearchEngine {
    fn choose_move(&self, board: &Board) -> Option<Move> {
        self.best_move(board).map(|r| r.best_move)
    }
}

#[expect(clippy::cast_precision_loss)]
fn terminal_score(board: &Board, ply: u32) -> Option<f32> {
    let termination = board.terminal_state()?;
    if termination.is_checkmate() {
        Some(-(MATE_SCORE - ply as f32))
    } else {
        Some(0.0)
    }
}

fn is_capture(board: &Board, mv: Move) -> bool {
    mv.kind().is_en_passant() || board.piece_at(mv.to()).is_some()
}

/// Legal successors with captures moved to the front, otherwise in
/// generation order.
fn ordered_children(board: &Board) -> Vec<(Move, Board)> {
    let mut children = board.children();
    children.sort_by_key(|(mv, _)| !is_capture(board, *mv));
    children
}

#[cfg(test)]
mod tests {
    use evochess_engine::{Color, Termination, UciMove};

    use super::*;
    use crate::evaluator::Evaluator;

    fn play(moves: &[&str]) -> Board {
        moves.iter().fold(Board::initial(), |b, uci| {
            b.apply_uci(uci.parse().unwrap()).unwrap().1
        })
    }

    /// Negamax without pruning, searching the same move order.
    fn minimax(engine: &SearchEngine, board: &Board, depth: u32, ply: u32) -> f32 {
        if let Some(score) = terminal_score(board, ply) {
            return score;
        }
        if depth == 0 {
            return engine.evaluator.score(board) * board.side_to_move().sign();
        }
        ordered_children(board)
            .iter()
            .map(|(_, child)| -minimax(engine, child, depth - 1, ply + 1))
            .fold(f32::NEG_INFINITY, f32::max)
    }

    fn minimax_root(engine: &SearchEngine, board: &Board) -> (Move, f32) {
        let mut best: Option<(Move, f32)> = None;
        for (mv, child) in ordered_children(board) {
            let score = -minimax(engine, &child, engine.depth - 1, 1);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((mv, score));
            }
        }
        best.unwrap()
    }

    #[test]
    fn test_rejects_zero_depth() {
        let err = SearchEngine::new(Genome::default(), 0).unwrap_err();
        assert_eq!(err, SearchDepthError { depth: 0 });
        assert!(SearchEngine::new(Genome::default(), 1).is_ok());
    }

    #[test]
    fn test_depth_one_maximizes_evaluation() {
        for board in [
            Board::initial(),
            play(&["e2e4", "d7d5"]),
            play(&["e2e4", "d7d5", "b1c3"]),
        ] {
            let engine = SearchEngine::new(Genome::default(), 1).unwrap();
            let result = engine.best_move(&board).unwrap();
            let sign = board.side_to_move().sign();
            let best_eval = board
                .children()
                .iter()
                .map(|(_, child)| engine.evaluator().score(child) * sign)
                .fold(f32::NEG_INFINITY, f32::max);
            let chosen = board.apply(result.best_move).unwrap();
            assert_eq!(engine.evaluator().score(&chosen) * sign, best_eval);
            assert_eq!(result.score, best_eval);
        }
    }

    #[test]
    fn test_alpha_beta_matches_minimax() {
        let genome = Genome::new([1.0, 3.1, 3.3, 5.2, 9.5, 1.0, 0.12, 0.35, 0.25, 0.15]);
        for depth in 1..=3 {
            let engine = SearchEngine::new(genome, depth).unwrap();
            for board in [
                play(&["e2e4", "e7e5", "g1f3"]),
                play(&["d2d4", "d7d5", "c2c4", "d5c4"]),
            ] {
                let result = engine.best_move(&board).unwrap();
                let (mv, score) = minimax_root(&engine, &board);
                assert_eq!(result.best_move, mv, "depth {depth}");
                assert_eq!(result.score, score, "depth {depth}");
            }
        }
    }

    #[test]
    fn test_finds_mate_in_one_at_depth_two() {
        let board = play(&["f2f3", "e7e5", "g2g4"]);
        let engine = SearchEngine::new(Genome::default(), 2).unwrap();
        let result = engine.best_move(&board).unwrap();
        assert_eq!(result.best_move.to_uci(), "d8h4".parse::<UciMove>().unwrap());
        assert_eq!(result.score, MATE_SCORE - 1.0);
    }

    #[test]
    fn test_finds_mate_in_two_at_depth_three() {
        // rook ladder: no mate in one, mate in two
        let board = Board::from_fen("7k/8/8/8/8/8/1R6/R6K w - - 0 1").unwrap();
        let engine = SearchEngine::new(Genome::default(), 3).unwrap();
        let result = engine.best_move(&board).unwrap();
        assert!(result.is_mate_score());
        assert_eq!(result.score, MATE_SCORE - 3.0);

        let after = board.apply(result.best_move).unwrap();
        assert_eq!(after.side_to_move(), Color::Black);
        let finisher = SearchEngine::new(Genome::default(), 1).unwrap();
        for (_, reply) in after.children() {
            let mate = finisher.best_move(&reply).unwrap();
            assert_eq!(mate.score, MATE_SCORE - 1.0);
            let mated = reply.apply(mate.best_move).unwrap();
            assert!(mated.legal_moves().is_empty());
            assert!(mated.in_check(Color::Black));
        }
    }

    #[test]
    fn test_mate_outranks_fifty_move_rule() {
        // Rb8 is mate and also the hundredth quiet half-move
        let board = Board::from_fen("7k/R7/8/8/8/8/8/1R5K w - - 99 80").unwrap();
        let engine = SearchEngine::new(Genome::default(), 1).unwrap();
        let result = engine.best_move(&board).unwrap();
        assert_eq!(result.best_move.to_string(), "b1b8");
        assert_eq!(result.score, MATE_SCORE - 1.0);

        let mated = board.apply(result.best_move).unwrap();
        assert!(mated.draw_reason().is_some());
        assert_eq!(mated.terminal_state(), Some(Termination::Checkmate));
    }

    #[test]
    fn test_no_move_when_game_is_over() {
        let board = play(&["f2f3", "e7e5", "g2g4", "d8h4"]);
        let engine = SearchEngine::new(Genome::default(), 2).unwrap();
        assert!(engine.best_move(&board).is_none());
        assert!(engine.choose_move(&board).is_none());
    }

    #[test]
    fn test_search_is_deterministic() {
        let board = play(&["e2e4", "c7c5"]);
        let engine = SearchEngine::new(Genome::default(), 2).unwrap();
        let first = engine.best_move(&board).unwrap();
        let second = engine.best_move(&board).unwrap();
        assert_eq!(first, second);
        assert!(first.nodes > 1);
    }

    #[test]
    fn test_prefers_winning_material() {
        // white queen can take an undefended rook
        let board = Board::from_fen("4k3/8/8/3r4/8/8/3Q4/4K3 w - - 0 1").unwrap();
        let engine = SearchEngine::new(Genome::default(), 2).unwrap();
        let result = engine.best_move(&board).unwrap();
        assert_eq!(result.best_move.to_string(), "d2d5");
    }
}
