use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{
    piece::PieceKind,
    square::{ParseSquareError, Square},
};

/// Special-move flag carried by a [`Move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::IsVariant)]
pub enum MoveKind {
    #[default]
    Normal,
    /// Pawn advancing two squares from its start rank.
    DoublePawnPush,
    /// Pawn capturing onto the en-passant target square.
    EnPassant,
    /// King moving two squares; the rook is relocated as well.
    Castle,
}

/// A move produced by move generation.
///
/// Moves are only meaningful for the position they were generated from.
/// Use [`UciMove`] to store or transmit moves independently of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
    promotion: Option<PieceKind>,
    kind: MoveKind,
}

impl Move {
    #[must_use]
    pub(crate) const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Self {
            from,
            to,
            promotion: None,
            kind,
        }
    }

    #[must_use]
    pub(crate) const fn promotion(from: Square, to: Square, promotion: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
            kind: MoveKind::Normal,
        }
    }

    #[must_use]
    pub const fn from(&self) -> Square {
        self.from
    }

    #[must_use]
    pub const fn to(&self) -> Square {
        self.to
    }

    #[must_use]
    pub const fn promotion_kind(&self) -> Option<PieceKind> {
        self.promotion
    }

    #[must_use]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    /// Returns the position-independent notation of this move.
    #[must_use]
    pub const fn to_uci(&self) -> UciMove {
        UciMove {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_uci().fmt(f)
    }
}

impl Serialize for Move {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_uci().serialize(serializer)
    }
}

/// A move in UCI long algebraic notation (`e2e4`, `e7e8q`).
///
/// Unlike [`Move`], a `UciMove` carries no special-move flags; it is resolved
/// against the legal moves of a board before it can be applied (see
/// [`Board::apply_uci`](crate::Board::apply_uci)).
///
/// # Example
///
/// ```
/// use evochess_engine::{Square, UciMove};
///
/// let mv: UciMove = "e7e8q".parse().unwrap();
/// assert_eq!(mv.from, Square::new(4, 6));
/// assert_eq!(mv.to, Square::E8);
/// assert_eq!(mv.to_string(), "e7e8q");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseMoveError {
    #[display("invalid move length: {_0:?}")]
    InvalidLength(#[error(not(source))] String),
    #[display("invalid square in move: {_0}")]
    InvalidSquare(ParseSquareError),
    #[display("invalid promotion piece: {_0:?}")]
    InvalidPromotion(#[error(not(source))] char),
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for UciMove {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(ParseMoveError::InvalidLength(s.to_owned()));
        }
        let from = s[0..2].parse().map_err(ParseMoveError::InvalidSquare)?;
        let to = s[2..4].parse().map_err(ParseMoveError::InvalidSquare)?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_char(c) {
                Some(kind) if PieceKind::PROMOTIONS.contains(&kind) => Some(kind),
                _ => return Err(ParseMoveError::InvalidPromotion(c)),
            },
        };
        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

impl Serialize for UciMove {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UciMove {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_move() {
        let mv: UciMove = "g1f3".parse().unwrap();
        assert_eq!(mv.from, Square::G1);
        assert_eq!(mv.to, Square::new(5, 2));
        assert_eq!(mv.promotion, None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "e2".parse::<UciMove>(),
            Err(ParseMoveError::InvalidLength(_))
        ));
        assert!(matches!(
            "z2e4".parse::<UciMove>(),
            Err(ParseMoveError::InvalidSquare(_))
        ));
        assert!(matches!(
            "e7e8k".parse::<UciMove>(),
            Err(ParseMoveError::InvalidPromotion('k'))
        ));
    }

    #[test]
    fn test_serialize_as_string() {
        let mv: UciMove = "a7a8n".parse().unwrap();
        let json = serde_json::to_string(&mv).unwrap();
        assert_eq!(json, "\"a7a8n\"");
        let back: UciMove = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mv);
    }

    #[test]
    fn test_move_display_matches_uci() {
        let mv = Move::promotion(Square::new(1, 6), Square::B8, PieceKind::Queen);
        assert_eq!(mv.to_string(), "b7b8q");
        let castle = Move::new(Square::E1, Square::G1, MoveKind::Castle);
        assert_eq!(castle.to_string(), "e1g1");
        assert!(castle.kind().is_castle());
    }
}
