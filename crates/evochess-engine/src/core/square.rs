use std::{fmt, str::FromStr};

/// One of the 64 board squares.
///
/// Squares are indexed `0..64` with `a1 = 0`, `h1 = 7` and `h8 = 63`, so
/// `index = rank * 8 + file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid square: {input:?}")]
pub struct ParseSquareError {
    input: String,
}

impl Square {
    pub const COUNT: usize = 64;

    pub const A1: Self = Self::new(0, 0);
    pub const B1: Self = Self::new(1, 0);
    pub const C1: Self = Self::new(2, 0);
    pub const D1: Self = Self::new(3, 0);
    pub const E1: Self = Self::new(4, 0);
    pub const F1: Self = Self::new(5, 0);
    pub const G1: Self = Self::new(6, 0);
    pub const H1: Self = Self::new(7, 0);
    pub const D4: Self = Self::new(3, 3);
    pub const E4: Self = Self::new(4, 3);
    pub const D5: Self = Self::new(3, 4);
    pub const E5: Self = Self::new(4, 4);
    pub const A8: Self = Self::new(0, 7);
    pub const B8: Self = Self::new(1, 7);
    pub const C8: Self = Self::new(2, 7);
    pub const D8: Self = Self::new(3, 7);
    pub const E8: Self = Self::new(4, 7);
    pub const F8: Self = Self::new(5, 7);
    pub const G8: Self = Self::new(6, 7);
    pub const H8: Self = Self::new(7, 7);

    /// Creates a square from file (`0` = a) and rank (`0` = 1).
    ///
    /// # Panics
    ///
    /// Panics if `file` or `rank` is not in `0..8`.
    #[must_use]
    pub const fn new(file: u8, rank: u8) -> Self {
        assert!(file < 8 && rank < 8);
        Self(rank * 8 + file)
    }

    /// Iterates all squares from a1 to h8.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..64).map(Self)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    #[must_use]
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    /// Returns the square shifted by the given file and rank deltas, or `None`
    /// if it falls off the board.
    ///
    /// # Examples
    ///
    /// ```
    /// use evochess_engine::Square;
    ///
    /// assert_eq!(Square::E4.offset(0, 1), Some(Square::E5));
    /// assert_eq!(Square::H1.offset(1, 0), None);
    /// ```
    #[expect(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    #[must_use]
    pub const fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = self.file() as i8 + file_delta;
        let rank = self.rank() as i8 + rank_delta;
        if file < 0 || file >= 8 || rank < 0 || rank >= 8 {
            return None;
        }
        Some(Self::new(file as u8, rank as u8))
    }

    /// King-move distance between two squares.
    #[must_use]
    pub const fn chebyshev_distance(self, other: Self) -> u8 {
        let df = self.file().abs_diff(other.file());
        let dr = self.rank().abs_diff(other.rank());
        if df > dr { df } else { dr }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = char::from(b'a' + self.file());
        let rank = char::from(b'1' + self.rank());
        write!(f, "{file}{rank}")
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSquareError {
            input: s.to_owned(),
        };
        let &[file, rank] = s.as_bytes() else {
            return Err(err());
        };
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(err());
        }
        Ok(Self::new(file - b'a', rank - b'1'))
    }
}
