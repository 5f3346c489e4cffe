use std::sync::LazyLock;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;

use crate::core::{CastlingRights, Color, Piece, Square};

/// Fixed seed so position hashes are identical across runs and processes.
const ZOBRIST_SEED: u64 = 0x5EED_C0DE_CAFE_F00D;

/// Random keys for incremental position hashing.
#[derive(Debug)]
pub(crate) struct ZobristKeys {
    piece_square: [[[u64; Square::COUNT]; 6]; 2],
    black_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = Pcg64::seed_from_u64(ZOBRIST_SEED);
        let mut piece_square = [[[0; Square::COUNT]; 6]; 2];
        for color in &mut piece_square {
            for kind in color.iter_mut() {
                rng.fill(&mut kind[..]);
            }
        }
        let black_to_move = rng.random();
        let mut castling = [0; 16];
        rng.fill(&mut castling[..]);
        // no rights must hash to zero so that empty positions hash to zero
        castling[0] = 0;
        let mut en_passant_file = [0; 8];
        rng.fill(&mut en_passant_file[..]);
        Self {
            piece_square,
            black_to_move,
            castling,
            en_passant_file,
        }
    }

    pub(crate) fn piece(&self, piece: Piece, square: Square) -> u64 {
        self.piece_square[piece.color.index()][piece.kind.index()][square.index()]
    }

    pub(crate) fn side_to_move(&self, color: Color) -> u64 {
        match color {
            Color::White => 0,
            Color::Black => self.black_to_move,
        }
    }

    pub(crate) fn castling(&self, rights: CastlingRights) -> u64 {
        self.castling[rights.index()]
    }

    pub(crate) fn en_passant(&self, square: Option<Square>) -> u64 {
        square.map_or(0, |sq| self.en_passant_file[usize::from(sq.file())])
    }
}

pub(crate) static ZOBRIST: LazyLock<ZobristKeys> = LazyLock::new(ZobristKeys::new);
