use super::{piece::Color, square::Square};

/// Which wing a castling move goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    pub const ALL: [Self; 2] = [CastleSide::Kingside, CastleSide::Queenside];

    /// File of the king after castling.
    #[must_use]
    pub const fn king_to_file(self) -> u8 {
        match self {
            CastleSide::Kingside => 6,
            CastleSide::Queenside => 2,
        }
    }

    /// Files of the rook before and after castling.
    #[must_use]
    pub const fn rook_files(self) -> (u8, u8) {
        match self {
            CastleSide::Kingside => (7, 5),
            CastleSide::Queenside => (0, 3),
        }
    }

    /// Files that must be empty between king and rook.
    #[must_use]
    pub const fn empty_files(self) -> &'static [u8] {
        match self {
            CastleSide::Kingside => &[5, 6],
            CastleSide::Queenside => &[1, 2, 3],
        }
    }

    /// Files the king crosses or lands on; none of them may be attacked.
    #[must_use]
    pub const fn king_path_files(self) -> [u8; 2] {
        match self {
            CastleSide::Kingside => [5, 6],
            CastleSide::Queenside => [3, 2],
        }
    }
}

/// The four castling permissions.
///
/// Stored as a 4-bit mask so it can index Zobrist keys directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b1111);

    const fn bit(color: Color, side: CastleSide) -> u8 {
        let shift = match (color, side) {
            (Color::White, CastleSide::Kingside) => 0,
            (Color::White, CastleSide::Queenside) => 1,
            (Color::Black, CastleSide::Kingside) => 2,
            (Color::Black, CastleSide::Queenside) => 3,
        };
        1 << shift
    }

    #[must_use]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::bit(color, side) != 0
    }

    #[must_use]
    pub const fn with(self, color: Color, side: CastleSide) -> Self {
        Self(self.0 | Self::bit(color, side))
    }

    #[must_use]
    pub const fn without(self, color: Color, side: CastleSide) -> Self {
        Self(self.0 & !Self::bit(color, side))
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the rights left after a piece moves from `from` to `to`.
    ///
    /// Any move touching a king or rook home square revokes the rights tied
    /// to that square, which covers king moves, rook moves, and rook captures.
    #[must_use]
    pub fn updated_after_move(self, from: Square, to: Square) -> Self {
        let mut rights = self;
        for sq in [from, to] {
            for color in Color::ALL {
                let rank = color.back_rank();
                if sq.rank() != rank {
                    continue;
                }
                match sq.file() {
                    4 => {
                        rights = rights
                            .without(color, CastleSide::Kingside)
                            .without(color, CastleSide::Queenside);
                    }
                    7 => rights = rights.without(color, CastleSide::Kingside),
                    0 => rights = rights.without(color, CastleSide::Queenside),
                    _ => {}
                }
            }
        }
        rights
    }
}
