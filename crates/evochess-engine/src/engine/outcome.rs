use serde::{Deserialize, Serialize};

use crate::core::Color;

/// Why a game ended.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum Termination {
    Checkmate,
    Stalemate,
    /// The same position occurred for the third time.
    Repetition,
    /// 100 half-moves without a capture or pawn move.
    FiftyMove,
    InsufficientMaterial,
    /// The game was stopped after a fixed number of plies.
    MoveLimit,
}

impl Termination {
    /// Whether the game ends without a winner.
    #[must_use]
    pub fn is_draw(self) -> bool {
        !self.is_checkmate()
    }
}

/// Result of a finished game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Winner {
    White,
    Black,
    Draw,
}

impl Winner {
    /// Derives the winner from how the game ended and who was to move in the
    /// final position.
    #[must_use]
    pub fn from_termination(termination: Termination, side_to_move: Color) -> Self {
        match (termination, side_to_move) {
            (Termination::Checkmate, Color::White) => Winner::Black,
            (Termination::Checkmate, Color::Black) => Winner::White,
            _ => Winner::Draw,
        }
    }

    #[must_use]
    pub fn color(self) -> Option<Color> {
        match self {
            Winner::White => Some(Color::White),
            Winner::Black => Some(Color::Black),
            Winner::Draw => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkmated_side_loses() {
        assert_eq!(
            Winner::from_termination(Termination::Checkmate, Color::White),
            Winner::Black
        );
        assert_eq!(
            Winner::from_termination(Termination::Checkmate, Color::Black),
            Winner::White
        );
        for t in [
            Termination::Stalemate,
            Termination::Repetition,
            Termination::FiftyMove,
            Termination::InsufficientMaterial,
            Termination::MoveLimit,
        ] {
            assert!(t.is_draw());
            assert_eq!(Winner::from_termination(t, Color::White), Winner::Draw);
        }
    }

    #[test]
    fn test_serialize_as_variant_name() {
        let json = serde_json::to_string(&Termination::FiftyMove).unwrap();
        assert_eq!(json, "\"FiftyMove\"");
        assert_eq!(Winner::Draw.color(), None);
    }
}
