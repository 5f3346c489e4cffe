use arrayvec::ArrayVec;

use crate::core::{CastleSide, Color, Move, MoveKind, Piece, PieceKind, Square};

use super::position::{BISHOP_DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS, Position, ROOK_DIRECTIONS};

/// Upper bound on the number of moves in any reachable position.
pub const MAX_MOVES: usize = 256;

/// Fixed-capacity move buffer returned by move generation.
pub type MoveList = ArrayVec<Move, MAX_MOVES>;

impl Position {
    /// Generates moves that obey piece movement rules but may leave the mover
    /// in check.
    ///
    /// Moves are produced by origin square from a1 to h8, each piece in a
    /// fixed direction order, so generation is deterministic. Squares holding
    /// a king are never targeted.
    pub(crate) fn pseudo_legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        let us = self.side_to_move();
        for (from, piece) in self.pieces() {
            if piece.color != us {
                continue;
            }
            match piece.kind {
                PieceKind::Pawn => self.pawn_moves(from, us, &mut moves),
                PieceKind::Knight => self.step_moves(from, us, &KNIGHT_OFFSETS, &mut moves),
                PieceKind::Bishop => self.slide_moves(from, us, &BISHOP_DIRECTIONS, &mut moves),
                PieceKind::Rook => self.slide_moves(from, us, &ROOK_DIRECTIONS, &mut moves),
                PieceKind::Queen => {
                    self.slide_moves(from, us, &ROOK_DIRECTIONS, &mut moves);
                    self.slide_moves(from, us, &BISHOP_DIRECTIONS, &mut moves);
                }
                PieceKind::King => {
                    self.step_moves(from, us, &KING_OFFSETS, &mut moves);
                    self.castle_moves(from, us, &mut moves);
                }
            }
        }
        moves
    }

    /// Whether `to` is empty or holds a capturable enemy piece.
    fn can_land_on(&self, to: Square, us: Color) -> bool {
        match self.piece_at(to) {
            None => true,
            Some(p) => p.color != us && p.kind != PieceKind::King,
        }
    }

    fn step_moves(&self, from: Square, us: Color, offsets: &[(i8, i8)], moves: &mut MoveList) {
        for &(df, dr) in offsets {
            if let Some(to) = from.offset(df, dr)
                && self.can_land_on(to, us)
            {
                moves.push(Move::new(from, to, MoveKind::Normal));
            }
        }
    }

    fn slide_moves(&self, from: Square, us: Color, directions: &[(i8, i8)], moves: &mut MoveList) {
        for &(df, dr) in directions {
            let mut sq = from;
            while let Some(to) = sq.offset(df, dr) {
                if self.can_land_on(to, us) {
                    moves.push(Move::new(from, to, MoveKind::Normal));
                }
                if self.piece_at(to).is_some() {
                    break;
                }
                sq = to;
            }
        }
    }

    fn push_pawn_move(from: Square, to: Square, us: Color, kind: MoveKind, moves: &mut MoveList) {
        if to.rank() == us.promotion_rank() {
            for promotion in PieceKind::PROMOTIONS {
                moves.push(Move::promotion(from, to, promotion));
            }
        } else {
            moves.push(Move::new(from, to, kind));
        }
    }

    fn pawn_moves(&self, from: Square, us: Color, moves: &mut MoveList) {
        let forward = us.pawn_forward();
        if let Some(one) = from.offset(0, forward)
            && self.piece_at(one).is_none()
        {
            Self::push_pawn_move(from, one, us, MoveKind::Normal, moves);
            if from.rank() == us.pawn_start_rank()
                && let Some(two) = one.offset(0, forward)
                && self.piece_at(two).is_none()
            {
                moves.push(Move::new(from, two, MoveKind::DoublePawnPush));
            }
        }
        for df in [-1, 1] {
            let Some(to) = from.offset(df, forward) else {
                continue;
            };
            match self.piece_at(to) {
                Some(p) if p.color != us && p.kind != PieceKind::King => {
                    Self::push_pawn_move(from, to, us, MoveKind::Normal, moves);
                }
                None if self.en_passant() == Some(to) => {
                    moves.push(Move::new(from, to, MoveKind::EnPassant));
                }
                _ => {}
            }
        }
    }

    fn castle_moves(&self, from: Square, us: Color, moves: &mut MoveList) {
        let rank = us.back_rank();
        if from != Square::new(4, rank) || self.in_check(us) {
            return;
        }
        let them = us.opponent();
        for side in CastleSide::ALL {
            if !self.castling().has(us, side) {
                continue;
            }
            let (rook_file, _) = side.rook_files();
            if self.piece_at(Square::new(rook_file, rank))
                != Some(Piece::new(PieceKind::Rook, us))
            {
                continue;
            }
            let path_clear = side
                .empty_files()
                .iter()
                .all(|&file| self.piece_at(Square::new(file, rank)).is_none());
            let path_safe = side
                .king_path_files()
                .iter()
                .all(|&file| !self.is_attacked(Square::new(file, rank), them));
            if path_clear && path_safe {
                let to = Square::new(side.king_to_file(), rank);
                moves.push(Move::new(from, to, MoveKind::Castle));
            }
        }
    }
}
