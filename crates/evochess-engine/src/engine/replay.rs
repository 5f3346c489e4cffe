use serde::Serialize;

use crate::{IllegalMoveError, core::UciMove};

use super::{board::Board, outcome::Termination};

/// One step of a replayed game.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayFrame {
    /// Number of half-moves played so far; `0` is the starting position.
    pub ply: usize,
    /// The move that produced this frame, `None` for the starting position.
    pub last_move: Option<UciMove>,
    pub fen: String,
    #[serde(skip)]
    pub board: Board,
}

/// A recorded game expanded into the sequence of boards it passed through.
///
/// # Example
///
/// ```
/// use evochess_engine::{ReplayLog, UciMove};
///
/// let moves: Vec<UciMove> = ["e2e4", "e7e5"].iter().map(|m| m.parse().unwrap()).collect();
/// let log = ReplayLog::from_moves(&moves).unwrap();
/// assert_eq!(log.frames().len(), 3);
/// assert_eq!(log.frames()[2].last_move, Some(moves[1]));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ReplayLog {
    frames: Vec<ReplayFrame>,
}

impl ReplayLog {
    /// Replays `moves` from the standard starting position.
    pub fn from_moves(moves: &[UciMove]) -> Result<Self, IllegalMoveError> {
        Self::from_board(Board::initial(), moves)
    }

    /// Replays `moves` starting from `start`.
    pub fn from_board(start: Board, moves: &[UciMove]) -> Result<Self, IllegalMoveError> {
        let mut frames = Vec::with_capacity(moves.len() + 1);
        frames.push(ReplayFrame {
            ply: 0,
            last_move: None,
            fen: start.to_fen(),
            board: start,
        });
        for (i, &uci) in moves.iter().enumerate() {
            let (_, board) = frames[i].board.apply_uci(uci)?;
            frames.push(ReplayFrame {
                ply: i + 1,
                last_move: Some(uci),
                fen: board.to_fen(),
                board,
            });
        }
        Ok(Self { frames })
    }

    #[must_use]
    pub fn frames(&self) -> &[ReplayFrame] {
        &self.frames
    }

    /// Number of half-moves in the game.
    #[must_use]
    pub fn plies(&self) -> usize {
        self.frames.len() - 1
    }

    #[must_use]
    pub fn final_board(&self) -> &Board {
        &self.frames[self.frames.len() - 1].board
    }

    /// How the replayed game ended on the board, if it did.
    #[must_use]
    pub fn termination(&self) -> Option<Termination> {
        self.final_board().terminal_state()
    }
}
