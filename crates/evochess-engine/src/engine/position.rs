use std::fmt;

use crate::core::{CastleSide, CastlingRights, Color, Move, Piece, PieceKind, Square};

use super::{movegen::MoveList, zobrist::ZOBRIST};

pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub(crate) const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub(crate) const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
pub(crate) const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// A chess position without move history.
///
/// `Position` is a small `Copy` value: an 8×8 mailbox of optional pieces plus
/// side to move, castling rights, en-passant target, move clocks and an
/// incrementally maintained Zobrist hash. Applying a move copies the position,
/// so search branches never share mutable state.
///
/// Repetition detection needs the hashes of earlier positions, which live in
/// [`Board`](crate::Board).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Position {
    squares: [Option<Piece>; Square::COUNT],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: u64,
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("fen", &self.to_fen())
            .finish()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::initial()
    }
}

impl Position {
    /// An empty board, White to move, no castling rights.
    #[must_use]
    pub(crate) const fn empty() -> Self {
        Self {
            squares: [None; Square::COUNT],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
        }
    }

    /// The standard starting position.
    #[must_use]
    pub fn initial() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut pos = Self::empty();
        for color in Color::ALL {
            for (file, kind) in (0..8).zip(BACK_RANK) {
                pos.put(Square::new(file, color.back_rank()), Piece::new(kind, color));
                pos.put(
                    Square::new(file, color.pawn_start_rank()),
                    Piece::new(PieceKind::Pawn, color),
                );
            }
        }
        pos.set_castling(CastlingRights::ALL);
        pos
    }

    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    /// Iterates occupied squares from a1 to h8.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[must_use]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[must_use]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Half-moves since the last capture or pawn move.
    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Zobrist hash of piece placement, side to move, castling rights and
    /// en-passant file.
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[must_use]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let king = Piece::new(PieceKind::King, color);
        self.pieces().find(|(_, p)| *p == king).map(|(sq, _)| sq)
    }

    pub(crate) fn put(&mut self, square: Square, piece: Piece) {
        debug_assert!(self.squares[square.index()].is_none());
        self.squares[square.index()] = Some(piece);
        self.hash ^= ZOBRIST.piece(piece, square);
    }

    pub(crate) fn take(&mut self, square: Square) -> Option<Piece> {
        let piece = self.squares[square.index()].take()?;
        self.hash ^= ZOBRIST.piece(piece, square);
        Some(piece)
    }

    pub(crate) fn set_side_to_move(&mut self, color: Color) {
        self.hash ^= ZOBRIST.side_to_move(self.side_to_move);
        self.side_to_move = color;
        self.hash ^= ZOBRIST.side_to_move(color);
    }

    pub(crate) fn set_castling(&mut self, rights: CastlingRights) {
        self.hash ^= ZOBRIST.castling(self.castling);
        self.castling = rights;
        self.hash ^= ZOBRIST.castling(rights);
    }

    pub(crate) fn set_en_passant(&mut self, square: Option<Square>) {
        self.hash ^= ZOBRIST.en_passant(self.en_passant);
        self.en_passant = square;
        self.hash ^= ZOBRIST.en_passant(square);
    }

    pub(crate) fn set_clocks(&mut self, halfmove_clock: u32, fullmove_number: u32) {
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number;
    }

    /// Returns the position after `mv`.
    ///
    /// `mv` must be pseudo-legal for this position; the caller is responsible
    /// for rejecting moves that leave the mover in check.
    #[must_use]
    pub(crate) fn make_move(&self, mv: Move) -> Self {
        let mut next = *self;
        let us = self.side_to_move;
        let Some(moving) = next.take(mv.from()) else {
            panic!("no piece on {} for move {mv}", mv.from());
        };
        debug_assert_eq!(moving.color, us);

        let captured = if mv.kind().is_en_passant() {
            next.take(Square::new(mv.to().file(), mv.from().rank()))
        } else {
            next.take(mv.to())
        };
        debug_assert!(captured.is_none_or(|p| p.kind != PieceKind::King));

        let placed = mv
            .promotion_kind()
            .map_or(moving, |kind| Piece::new(kind, us));
        next.put(mv.to(), placed);

        if mv.kind().is_castle() {
            let side = if mv.to().file() > mv.from().file() {
                CastleSide::Kingside
            } else {
                CastleSide::Queenside
            };
            let (rook_from, rook_to) = side.rook_files();
            let rank = mv.from().rank();
            let rook = next.take(Square::new(rook_from, rank));
            debug_assert_eq!(rook, Some(Piece::new(PieceKind::Rook, us)));
            if let Some(rook) = rook {
                next.put(Square::new(rook_to, rank), rook);
            }
        }

        next.set_castling(self.castling.updated_after_move(mv.from(), mv.to()));
        let en_passant = if mv.kind().is_double_pawn_push() {
            mv.from().offset(0, us.pawn_forward())
        } else {
            None
        };
        next.set_en_passant(en_passant);

        let halfmove_clock = if moving.kind == PieceKind::Pawn || captured.is_some() {
            0
        } else {
            self.halfmove_clock + 1
        };
        let fullmove_number = self.fullmove_number + u32::from(us == Color::Black);
        next.set_clocks(halfmove_clock, fullmove_number);
        next.set_side_to_move(us.opponent());
        next
    }

    /// Returns the same placement with the other side to move.
    ///
    /// Used to measure the mobility of the side that is not on move.
    #[must_use]
    pub(crate) fn null_move(&self) -> Self {
        let mut next = *self;
        next.set_en_passant(None);
        next.set_side_to_move(self.side_to_move.opponent());
        next
    }

    /// Counts pieces of `by` attacking `square`.
    ///
    /// Sliding attacks are blocked by any piece; pawns count only their
    /// diagonal captures.
    #[must_use]
    pub fn attackers(&self, square: Square, by: Color) -> u32 {
        self.scan_attackers(square, by, false)
    }

    #[must_use]
    pub fn is_attacked(&self, square: Square, by: Color) -> bool {
        self.scan_attackers(square, by, true) > 0
    }

    fn scan_attackers(&self, square: Square, by: Color, stop_at_first: bool) -> u32 {
        let mut count = 0;
        let found = |count: &mut u32| {
            *count += 1;
            stop_at_first
        };
        let is = |sq: Option<Square>, kind: PieceKind| {
            sq.and_then(|sq| self.piece_at(sq)) == Some(Piece::new(kind, by))
        };

        // a pawn of `by` attacks diagonally forward, so look one rank behind
        for df in [-1, 1] {
            if is(square.offset(df, -by.pawn_forward()), PieceKind::Pawn) && found(&mut count) {
                return count;
            }
        }
        for (df, dr) in KNIGHT_OFFSETS {
            if is(square.offset(df, dr), PieceKind::Knight) && found(&mut count) {
                return count;
            }
        }
        for (df, dr) in KING_OFFSETS {
            if is(square.offset(df, dr), PieceKind::King) && found(&mut count) {
                return count;
            }
        }
        for (directions, kind) in [
            (ROOK_DIRECTIONS, PieceKind::Rook),
            (BISHOP_DIRECTIONS, PieceKind::Bishop),
        ] {
            for (df, dr) in directions {
                let Some(blocker) = self.first_piece_in_direction(square, df, dr) else {
                    continue;
                };
                if blocker.color == by
                    && (blocker.kind == kind || blocker.kind == PieceKind::Queen)
                    && found(&mut count)
                {
                    return count;
                }
            }
        }
        count
    }

    fn first_piece_in_direction(&self, from: Square, df: i8, dr: i8) -> Option<Piece> {
        let mut sq = from;
        while let Some(next) = sq.offset(df, dr) {
            if let Some(piece) = self.piece_at(next) {
                return Some(piece);
            }
            sq = next;
        }
        None
    }

    #[must_use]
    pub fn in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|king| self.is_attacked(king, color.opponent()))
    }

    /// Legal moves in generation order.
    #[must_use]
    pub fn legal_moves(&self) -> MoveList {
        let mut moves = self.pseudo_legal_moves();
        moves.retain(|mv| self.is_legal_pseudo_move(*mv));
        moves
    }

    #[must_use]
    pub fn count_legal_moves(&self) -> usize {
        self.pseudo_legal_moves()
            .iter()
            .filter(|mv| self.is_legal_pseudo_move(**mv))
            .count()
    }

    /// Counts legal moves `color` would have if it were on move.
    #[must_use]
    pub fn count_legal_moves_for(&self, color: Color) -> usize {
        if color == self.side_to_move {
            self.count_legal_moves()
        } else {
            self.null_move().count_legal_moves()
        }
    }

    #[must_use]
    pub fn has_legal_move(&self) -> bool {
        self.pseudo_legal_moves()
            .iter()
            .any(|mv| self.is_legal_pseudo_move(*mv))
    }

    pub(crate) fn is_legal_pseudo_move(&self, mv: Move) -> bool {
        !self.make_move(mv).in_check(self.side_to_move)
    }

    /// Whether neither side can possibly deliver mate.
    ///
    /// Detects bare kings and a single minor piece against a bare king.
    #[must_use]
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors = 0;
        for (_, piece) in self.pieces() {
            match piece.kind {
                PieceKind::King => {}
                PieceKind::Knight | PieceKind::Bishop => minors += 1,
                PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
            }
        }
        minors <= 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = self
                    .piece_at(Square::new(file, rank))
                    .map_or('.', Piece::as_fen_char);
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn test_initial_position_layout() {
        let p = Position::initial();
        assert_eq!(
            p.piece_at(Square::E1),
            Some(Piece::new(PieceKind::King, Color::White))
        );
        assert_eq!(
            p.piece_at(Square::D8),
            Some(Piece::new(PieceKind::Queen, Color::Black))
        );
        assert_eq!(p.pieces().count(), 32);
        assert_eq!(p.side_to_move(), Color::White);
        assert_eq!(p.castling(), CastlingRights::ALL);
    }

    #[test]
    fn test_incremental_hash_matches_fresh_hash() {
        let mut p = Position::initial();
        for _ in 0..6 {
            let mv = p.legal_moves()[0];
            p = p.make_move(mv);
            let reparsed = pos(&p.to_fen());
            assert_eq!(p.hash(), reparsed.hash());
        }
    }

    #[test]
    fn test_null_move_changes_only_side() {
        let p = Position::initial();
        let n = p.null_move();
        assert_eq!(n.side_to_move(), Color::Black);
        assert_ne!(n.hash(), p.hash());
        assert_eq!(n.null_move().hash(), p.hash());
    }

    #[test]
    fn test_attackers_counts_every_attacker() {
        // e4 attacked by white pawn d3, knight f2, rook e1 (through empty e2/e3)
        let p = pos("4k3/8/8/8/8/3P4/5N2/4R1K1 w - - 0 1");
        assert_eq!(p.attackers(Square::E4, Color::White), 3);
        assert!(p.is_attacked(Square::E4, Color::White));
        assert_eq!(p.attackers(Square::E4, Color::Black), 0);
    }

    #[test]
    fn test_slider_attack_is_blocked() {
        let p = pos("4k3/8/8/8/4p3/8/8/4R1K1 w - - 0 1");
        assert!(p.is_attacked(Square::E4, Color::White));
        assert!(!p.is_attacked(Square::E5, Color::White));
    }

    #[test]
    fn test_in_check() {
        let p = pos("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1");
        assert!(p.in_check(Color::Black));
        assert!(!p.in_check(Color::White));
    }

    #[test]
    fn test_insufficient_material() {
        assert!(pos("8/8/4k3/8/8/3K4/8/8 w - - 0 1").is_insufficient_material());
        assert!(pos("8/8/4k3/8/8/3KN3/8/8 w - - 0 1").is_insufficient_material());
        assert!(!pos("8/8/4k3/8/8/3KR3/8/8 w - - 0 1").is_insufficient_material());
        assert!(!pos("8/8/4k3/8/4p3/3K4/8/8 w - - 0 1").is_insufficient_material());
        assert!(!Position::initial().is_insufficient_material());
    }

    #[test]
    fn test_count_legal_moves_for_both_sides() {
        let p = Position::initial();
        assert_eq!(p.count_legal_moves_for(Color::White), 20);
        assert_eq!(p.count_legal_moves_for(Color::Black), 20);
    }

    #[test]
    fn test_display_renders_grid() {
        let text = Position::initial().to_string();
        let first = text.lines().next().unwrap();
        assert_eq!(first, "8  r n b q k b n r");
        assert!(text.ends_with("a b c d e f g h"));
    }
}
