use std::fmt;

use crate::{
    IllegalMoveError,
    core::{CastlingRights, Color, Move, Piece, Square, UciMove},
};

use super::{
    fen::FenError,
    movegen::MoveList,
    outcome::{Termination, Winner},
    position::Position,
};

/// Half-moves without capture or pawn move after which the game is drawn.
pub const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Number of occurrences of a position that draws the game.
pub const REPETITION_LIMIT: usize = 3;

/// A position together with the history needed for repetition draws.
///
/// Boards are immutable: [`Board::apply`] returns a new board and leaves the
/// original untouched, so a search can branch from any node freely.
///
/// # Example
///
/// ```
/// use evochess_engine::{Board, Termination, UciMove};
///
/// let mut board = Board::initial();
/// for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
///     let mv: UciMove = uci.parse().unwrap();
///     board = board.apply_uci(mv).unwrap().1;
/// }
/// assert_eq!(board.terminal_state(), Some(Termination::Checkmate));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    position: Position,
    /// Hashes of earlier positions since the last capture or pawn move.
    history: Vec<u64>,
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("fen", &self.to_fen())
            .field("history_len", &self.history.len())
            .finish()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.position.fmt(f)
    }
}

impl From<Position> for Board {
    fn from(position: Position) -> Self {
        Self {
            position,
            history: vec![],
        }
    }
}

impl Board {
    #[must_use]
    pub fn initial() -> Self {
        Self::from(Position::initial())
    }

    /// Parses a board from FEN; the board starts with an empty history.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Position::from_fen(fen).map(Self::from)
    }

    #[must_use]
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    #[must_use]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.piece_at(square)
    }

    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    #[must_use]
    pub fn castling(&self) -> CastlingRights {
        self.position.castling()
    }

    #[must_use]
    pub fn en_passant(&self) -> Option<Square> {
        self.position.en_passant()
    }

    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.position.halfmove_clock()
    }

    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.position.fullmove_number()
    }

    #[must_use]
    pub fn hash(&self) -> u64 {
        self.position.hash()
    }

    #[must_use]
    pub fn in_check(&self, color: Color) -> bool {
        self.position.in_check(color)
    }

    #[must_use]
    pub fn legal_moves(&self) -> MoveList {
        self.position.legal_moves()
    }

    /// Legal moves paired with the boards they lead to, in generation order.
    #[must_use]
    pub fn children(&self) -> Vec<(Move, Board)> {
        self.position
            .pseudo_legal_moves()
            .into_iter()
            .filter_map(|mv| {
                let next = self.position.make_move(mv);
                (!next.in_check(self.side_to_move())).then(|| (mv, self.successor(next)))
            })
            .collect()
    }

    /// Applies a legal move and returns the resulting board.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMoveError`] if `mv` is not among [`Board::legal_moves`].
    pub fn apply(&self, mv: Move) -> Result<Board, IllegalMoveError> {
        if !self.legal_moves().contains(&mv) {
            return Err(IllegalMoveError { uci: mv.to_uci() });
        }
        Ok(self.successor(self.position.make_move(mv)))
    }

    /// Resolves a textual move against the legal moves and applies it.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMoveError`] if no legal move matches `uci`.
    pub fn apply_uci(&self, uci: UciMove) -> Result<(Move, Board), IllegalMoveError> {
        let mv = self
            .legal_moves()
            .into_iter()
            .find(|mv| mv.to_uci() == uci)
            .ok_or(IllegalMoveError { uci })?;
        Ok((mv, self.successor(self.position.make_move(mv))))
    }

    fn successor(&self, position: Position) -> Board {
        let history = if position.halfmove_clock() == 0 {
            vec![]
        } else {
            let mut history = Vec::with_capacity(self.history.len() + 1);
            history.extend_from_slice(&self.history);
            history.push(self.position.hash());
            history
        };
        Board { position, history }
    }

    /// How many times the current position has occurred, including now.
    #[must_use]
    pub fn repetition_count(&self) -> usize {
        let hash = self.hash();
        1 + self.history.iter().filter(|h| **h == hash).count()
    }

    /// Draw conditions that hold regardless of the moves available.
    #[must_use]
    pub fn draw_reason(&self) -> Option<Termination> {
        if self.position.is_insufficient_material() {
            Some(Termination::InsufficientMaterial)
        } else if self.repetition_count() >= REPETITION_LIMIT {
            Some(Termination::Repetition)
        } else if self.halfmove_clock() >= FIFTY_MOVE_HALFMOVES {
            Some(Termination::FiftyMove)
        } else {
            None
        }
    }

    /// Returns how the game ended, or `None` if it continues.
    ///
    /// Checkmate and stalemate take precedence over rule-based draws.
    #[must_use]
    pub fn terminal_state(&self) -> Option<Termination> {
        if self.position.has_legal_move() {
            self.draw_reason()
        } else if self.in_check(self.side_to_move()) {
            Some(Termination::Checkmate)
        } else {
            Some(Termination::Stalemate)
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal_state().is_some()
    }

    /// Winner of a finished game, or `None` if the game continues.
    #[must_use]
    pub fn winner(&self) -> Option<Winner> {
        self.terminal_state()
            .map(|t| Winner::from_termination(t, self.side_to_move()))
    }
}
