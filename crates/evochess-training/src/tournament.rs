//! Games between genomes and round-robin tournaments.
//!
//! A tournament turns a population of genomes into fitness scores. Every
//! unordered pair of genomes plays exactly one game, the genome with the lower
//! index taking White, and each game awards points to both players.
//!
//! # Scoring
//!
//! | result | winner                      | loser | each on a draw |
//! |--------|-----------------------------|-------|----------------|
//! | points | [`WIN_POINTS`] + speed bonus | 0     | [`DRAW_POINTS`] |
//!
//! The speed bonus is `0.5 · max(0, max_moves − plies) / max_moves`. It lies in
//! `[0, 0.5]` and rewards winning quickly. It never closes the two-point gap
//! between a win and a draw.
//!
//! # Game Termination
//!
//! A game ends on checkmate, stalemate, threefold repetition, the fifty-move
//! rule, insufficient material, or when `max_moves` plies have been played
//! ([`Termination::MoveLimit`], scored as a draw). The move limit guarantees
//! every game terminates.
//!
//! # Parallelization
//!
//! Games are independent, so [`run_round_robin`] can play them on scoped
//! threads, at most [`std::thread::available_parallelism`] at a time. Results
//! are collected in pair order, which makes parallel and sequential runs
//! produce identical outcomes.

use std::{num::NonZeroUsize, thread};

use evochess_engine::{Board, Color, IllegalMoveError, Termination, UciMove, Winner};
use evochess_evaluator::{
    evaluator::Evaluator as _,
    genome::Genome,
    search::{SearchDepthError, SearchEngine},
};
use serde::{Deserialize, Serialize};

/// Points for winning a game, before the speed bonus.
pub const WIN_POINTS: f32 = 3.0;

/// Points each player receives for a drawn game.
pub const DRAW_POINTS: f32 = 1.0;

/// Largest possible speed bonus (approached by a win in zero plies).
pub const MAX_SPEED_BONUS: f32 = 0.5;

/// Plies between two evaluation snapshots.
pub const SNAPSHOT_INTERVAL: usize = 10;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TournamentError {
    #[display("invalid search depth: {_0}")]
    Search(SearchDepthError),
    #[display("search returned a move the board rejected: {_0}")]
    IllegalMove(IllegalMoveError),
    #[display("game between genome {white} (white) and genome {black} (black) panicked")]
    WorkerPanicked { white: usize, black: usize },
}

/// Settings for a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Search depth in plies for both players.
    pub depth: u32,
    /// Plies after which the game is stopped as a draw.
    pub max_moves: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            depth: 2,
            max_moves: 100,
        }
    }
}

/// Both players' view of the position after `ply` half-moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSnapshot {
    pub ply: usize,
    /// Static score by White's genome (positive favors White).
    pub white_eval: f32,
    /// Static score by Black's genome (positive favors White).
    pub black_eval: f32,
    pub fen: String,
}

/// How a single game went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub winner: Winner,
    pub termination: Termination,
    /// Number of half-moves played.
    pub plies: usize,
    /// All moves in order, starting from the initial position.
    pub moves: Vec<UciMove>,
    /// Evaluations of the position after every [`SNAPSHOT_INTERVAL`]-th ply.
    pub snapshots: Vec<EvalSnapshot>,
}

/// A tournament game: the result plus who played it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Population index of the genome playing White.
    pub white: usize,
    /// Population index of the genome playing Black.
    pub black: usize,
    #[serde(flatten)]
    pub result: GameResult,
}

/// Plays one game from the initial position.
///
/// Both sides search at `config.depth`. The game is deterministic: the same
/// genomes and configuration always produce the same moves.
///
/// # Errors
///
/// Returns [`TournamentError::Search`] if `config.depth` is zero.
///
/// # Examples
///
/// ```
/// use evochess_engine::Winner;
/// use evochess_evaluator::genome::Genome;
/// use evochess_training::tournament::{self, GameConfig};
///
/// let config = GameConfig { depth: 1, max_moves: 6 };
/// let result = tournament::play_game(&Genome::default(), &Genome::default(), &config).unwrap();
/// assert!(result.plies <= 6);
/// assert_eq!(result.moves.len(), result.plies);
/// ```
pub fn play_game(
    white: &Genome,
    black: &Genome,
    config: &GameConfig,
) -> Result<GameResult, TournamentError> {
    let white = SearchEngine::new(*white, config.depth).map_err(TournamentError::Search)?;
    let black = SearchEngine::new(*black, config.depth).map_err(TournamentError::Search)?;

    let mut board = Board::initial();
    let mut moves = vec![];
    let mut snapshots = vec![];
    let termination = loop {
        let plies = moves.len();
        if let Some(termination) = board.terminal_state() {
            break termination;
        }
        if plies >= config.max_moves {
            break Termination::MoveLimit;
        }

        let engine = match board.side_to_move() {
            Color::White => &white,
            Color::Black => &black,
        };
        let Some(result) = engine.best_move(&board) else {
            unreachable!("non-terminal position without legal moves: {}", board.to_fen());
        };
        log::trace!("ply {plies}: {} ({:.3})", result.best_move, result.score);
        board = board
            .apply(result.best_move)
            .map_err(TournamentError::IllegalMove)?;
        moves.push(result.best_move.to_uci());

        if moves.len() % SNAPSHOT_INTERVAL == 0 {
            snapshots.push(EvalSnapshot {
                ply: moves.len(),
                white_eval: white.evaluator().score(&board),
                black_eval: black.evaluator().score(&board),
                fen: board.to_fen(),
            });
        }
    };

    let winner = Winner::from_termination(termination, board.side_to_move());
    Ok(GameResult {
        winner,
        termination,
        plies: moves.len(),
        moves,
        snapshots,
    })
}

/// Bonus for the winner of a decisive game of `plies` half-moves.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn speed_bonus(plies: usize, max_moves: usize) -> f32 {
    if max_moves == 0 {
        return 0.0;
    }
    let remaining = max_moves.saturating_sub(plies);
    MAX_SPEED_BONUS * remaining as f32 / max_moves as f32
}

/// Points earned by White and Black in `result`.
///
/// # Examples
///
/// ```
/// use evochess_engine::{Termination, Winner};
/// use evochess_training::tournament::{self, GameResult};
///
/// let result = GameResult {
///     winner: Winner::Draw,
///     termination: Termination::Stalemate,
///     plies: 40,
///     moves: vec![],
///     snapshots: vec![],
/// };
/// assert_eq!(tournament::score_game(&result, 100), (1.0, 1.0));
/// ```
#[must_use]
pub fn score_game(result: &GameResult, max_moves: usize) -> (f32, f32) {
    let win = WIN_POINTS + speed_bonus(result.plies, max_moves);
    match result.winner {
        Winner::White => (win, 0.0),
        Winner::Black => (0.0, win),
        Winner::Draw => (DRAW_POINTS, DRAW_POINTS),
    }
}

/// Settings for a round-robin tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TournamentConfig {
    pub game: GameConfig,
    /// Play games on worker threads.
    pub parallel: bool,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            parallel: true,
        }
    }
}

/// Scores and games of a round-robin tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentOutcome {
    /// Accumulated points, indexed like the input genomes.
    pub scores: Vec<f32>,
    /// All games, in pair order `(0, 1), (0, 2), ..., (n - 2, n - 1)`.
    pub games: Vec<GameRecord>,
}

/// Pairings of a round robin over `count` players, lower index first.
///
/// ```
/// use evochess_training::tournament;
///
/// assert_eq!(tournament::pairings(3), [(0, 1), (0, 2), (1, 2)]);
/// assert!(tournament::pairings(1).is_empty());
/// ```
#[must_use]
pub fn pairings(count: usize) -> Vec<(usize, usize)> {
    (0..count)
        .flat_map(|i| (i + 1..count).map(move |j| (i, j)))
        .collect()
}

/// Plays every pair of `genomes` once and accumulates their scores.
///
/// The genome with the lower index plays White. With fewer than two genomes
/// no games are played and all scores are zero.
///
/// # Errors
///
/// Fails on the first game (in pair order) that fails. Remaining games of the
/// round are discarded.
pub fn run_round_robin(
    genomes: &[Genome],
    config: &TournamentConfig,
) -> Result<TournamentOutcome, TournamentError> {
    let pairs = pairings(genomes.len());
    let results = if config.parallel {
        play_parallel(genomes, &pairs, &config.game)
    } else {
        pairs
            .iter()
            .map(|&(white, black)| play_game(&genomes[white], &genomes[black], &config.game))
            .collect()
    };

    let mut scores = vec![0.0; genomes.len()];
    let mut games = Vec::with_capacity(pairs.len());
    for (&(white, black), result) in pairs.iter().zip(results) {
        let result = result?;
        let (white_points, black_points) = score_game(&result, config.game.max_moves);
        log::debug!(
            "game {white} vs {black}: {} by {} after {} plies",
            result.winner,
            result.termination,
            result.plies
        );
        scores[white] += white_points;
        scores[black] += black_points;
        games.push(GameRecord {
            white,
            black,
            result,
        });
    }
    Ok(TournamentOutcome { scores, games })
}

fn play_parallel(
    genomes: &[Genome],
    pairs: &[(usize, usize)],
    config: &GameConfig,
) -> Vec<Result<GameResult, TournamentError>> {
    let workers = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    let mut results = Vec::with_capacity(pairs.len());
    for chunk in pairs.chunks(workers) {
        thread::scope(|s| {
            let handles = chunk
                .iter()
                .map(|&(white, black)| {
                    let handle =
                        s.spawn(move || play_game(&genomes[white], &genomes[black], config));
                    (white, black, handle)
                })
                .collect::<Vec<_>>();
            for (white, black, handle) in handles {
                let result = handle
                    .join()
                    .unwrap_or(Err(TournamentError::WorkerPanicked { white, black }));
                results.push(result);
            }
        });
    }
    results
}
