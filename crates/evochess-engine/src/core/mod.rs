//! Basic chess vocabulary: colors, pieces, squares, castling rights and moves.

pub use self::{castling::*, moves::*, piece::*, square::*};

pub(crate) mod castling;
pub(crate) mod moves;
pub(crate) mod piece;
pub(crate) mod square;
