use serde::{Deserialize, Serialize};

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const ALL: [Self; 2] = [Color::White, Color::Black];

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// `+1.0` for White, `-1.0` for Black.
    ///
    /// Converts White-relative scores to the perspective of this color.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Color::White => 1.0,
            Color::Black => -1.0,
        }
    }

    /// Rank delta of a single pawn push.
    #[must_use]
    pub const fn pawn_forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank on which this color's pawns start.
    #[must_use]
    pub const fn pawn_start_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Rank on which this color's pawns promote.
    #[must_use]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Back rank of this color (where king and rooks start).
    #[must_use]
    pub const fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

/// Kind of a chess piece, independent of its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    /// Number of piece kinds (6).
    pub const LEN: usize = 6;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Kinds a pawn may promote to, in generation order.
    pub const PROMOTIONS: [Self; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the lowercase letter used by FEN and UCI notation.
    ///
    /// # Examples
    ///
    /// ```
    /// use evochess_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::Knight.as_char(), 'n');
    /// assert_eq!(PieceKind::Queen.as_char(), 'q');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    /// Parses a piece kind from its letter, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use evochess_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('R'), Some(PieceKind::Rook));
    /// assert_eq!(PieceKind::from_char('k'), Some(PieceKind::King));
    /// assert_eq!(PieceKind::from_char('x'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// A colored piece occupying a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    #[must_use]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    #[must_use]
    pub const fn as_fen_char(self) -> char {
        let c = self.kind.as_char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    #[must_use]
    pub const fn from_fen_char(c: char) -> Option<Self> {
        let Some(kind) = PieceKind::from_char(c) else {
            return None;
        };
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Self { kind, color })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fen_char_roundtrip() {
        for color in Color::ALL {
            for kind in PieceKind::ALL {
                let piece = Piece::new(kind, color);
                assert_eq!(Piece::from_fen_char(piece.as_fen_char()), Some(piece));
            }
        }
        assert_eq!(Piece::new(PieceKind::King, Color::White).as_fen_char(), 'K');
        assert_eq!(Piece::new(PieceKind::Pawn, Color::Black).as_fen_char(), 'p');
    }

    #[test]
    fn test_color_helpers() {
        assert_eq!(Color::White.opponent(), Color::Black);
        assert_eq!(Color::Black.opponent(), Color::White);
        assert!((Color::White.sign() - 1.0).abs() < f32::EPSILON);
        assert!((Color::Black.sign() + 1.0).abs() < f32::EPSILON);
        assert_eq!(Color::White.pawn_forward(), 1);
        assert_eq!(Color::Black.promotion_rank(), 0);
    }
}
