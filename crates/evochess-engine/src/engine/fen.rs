use crate::core::{CastleSide, CastlingRights, Color, Piece, PieceKind, Square};

use super::position::Position;

/// Error returned when a FEN string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum FenError {
    #[display("FEN must have 4 to 6 fields, got {_0}")]
    FieldCount(#[error(not(source))] usize),
    #[display("invalid piece placement: {_0:?}")]
    Placement(#[error(not(source))] String),
    #[display("invalid side to move: {_0:?}")]
    SideToMove(#[error(not(source))] String),
    #[display("invalid castling field: {_0:?}")]
    Castling(#[error(not(source))] String),
    #[display("invalid en passant square: {_0:?}")]
    EnPassant(#[error(not(source))] String),
    #[display("invalid move counter: {_0:?}")]
    Counter(#[error(not(source))] String),
    #[display("each side needs exactly one king")]
    KingCount,
}

impl Position {
    /// Parses a position from Forsyth-Edwards Notation.
    ///
    /// The halfmove clock and fullmove number may be omitted and default to
    /// `0` and `1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use evochess_engine::{Color, Position};
    ///
    /// let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 12 40").unwrap();
    /// assert_eq!(pos.side_to_move(), Color::Black);
    /// assert_eq!(pos.halfmove_clock(), 12);
    /// assert!(Position::from_fen("not a fen").is_err());
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FenError::FieldCount(fields.len()));
        }

        let mut pos = Self::empty();
        parse_placement(&mut pos, fields[0])?;

        let side = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::SideToMove(other.to_owned())),
        };
        pos.set_side_to_move(side);
        pos.set_castling(parse_castling(fields[2])?);

        let en_passant = match fields[3] {
            "-" => None,
            s => {
                let sq: Square = s.parse().map_err(|_| FenError::EnPassant(s.to_owned()))?;
                let expected_rank = if side == Color::White { 5 } else { 2 };
                if sq.rank() != expected_rank {
                    return Err(FenError::EnPassant(s.to_owned()));
                }
                Some(sq)
            }
        };
        pos.set_en_passant(en_passant);

        let counter = |field: Option<&&str>, default: u32| match field {
            None => Ok(default),
            Some(s) => s.parse().map_err(|_| FenError::Counter((*s).to_owned())),
        };
        let halfmove_clock = counter(fields.get(4), 0)?;
        let fullmove_number = counter(fields.get(5), 1)?.max(1);
        pos.set_clocks(halfmove_clock, fullmove_number);

        for color in Color::ALL {
            let king = Piece::new(PieceKind::King, color);
            if pos.pieces().filter(|(_, p)| *p == king).count() != 1 {
                return Err(FenError::KingCount);
            }
        }
        Ok(pos)
    }

    /// Formats the position as a six-field FEN string.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0u8;
            for file in 0..8 {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            placement.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        placement.push(piece.as_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move() {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let castling: String = CASTLING_CHARS
            .iter()
            .filter(|(color, side, _)| self.castling().has(*color, *side))
            .map(|(_, _, c)| *c)
            .collect();
        let castling = if castling.is_empty() { "-".to_owned() } else { castling };
        let en_passant = self
            .en_passant()
            .map_or_else(|| "-".to_owned(), |sq| sq.to_string());
        format!(
            "{placement} {side} {castling} {en_passant} {} {}",
            self.halfmove_clock(),
            self.fullmove_number()
        )
    }
}

const CASTLING_CHARS: [(Color, CastleSide, char); 4] = [
    (Color::White, CastleSide::Kingside, 'K'),
    (Color::White, CastleSide::Queenside, 'Q'),
    (Color::Black, CastleSide::Kingside, 'k'),
    (Color::Black, CastleSide::Queenside, 'q'),
];

fn parse_placement(pos: &mut Position, placement: &str) -> Result<(), FenError> {
    let err = || FenError::Placement(placement.to_owned());
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(err());
    }
    for (row, text) in ranks.iter().enumerate() {
        let rank = 7 - u8::try_from(row).map_err(|_| err())?;
        let mut file = 0u8;
        for c in text.chars() {
            if let Some(skip) = c.to_digit(10) {
                if !(1..=8).contains(&skip) {
                    return Err(err());
                }
                file += u8::try_from(skip).map_err(|_| err())?;
            } else {
                let piece = Piece::from_fen_char(c).ok_or_else(err)?;
                if file >= 8 {
                    return Err(err());
                }
                let sq = Square::new(file, rank);
                if piece.kind == PieceKind::Pawn && (rank == 0 || rank == 7) {
                    return Err(err());
                }
                pos.put(sq, piece);
                file += 1;
            }
            if file > 8 {
                return Err(err());
            }
        }
        if file != 8 {
            return Err(err());
        }
    }
    Ok(())
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    if field == "-" {
        return Ok(CastlingRights::NONE);
    }
    let mut rights = CastlingRights::NONE;
    for c in field.chars() {
        let (color, side, _) = CASTLING_CHARS
            .into_iter()
            .find(|(_, _, ch)| *ch == c)
            .ok_or_else(|| FenError::Castling(field.to_owned()))?;
        rights = rights.with(color, side);
    }
    Ok(rights)
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_initial_position_fen() {
        assert_eq!(Position::initial().to_fen(), START);
        assert_eq!(Position::from_fen(START).unwrap(), Position::initial());
    }

    #[test]
    fn test_fen_roundtrip_preserves_fields() {
        for fen in [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2",
            "8/8/4k3/8/8/3K4/8/8 b - - 37 80",
            "r3k3/8/8/8/8/8/8/4K2R w Kq - 3 10",
        ] {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn test_missing_counters_use_defaults() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - -").unwrap();
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 1);
    }

    #[test]
    fn test_rejects_malformed_fen() {
        assert!(matches!(
            Position::from_fen("8/8/8 w - - 0 1"),
            Err(FenError::Placement(_))
        ));
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1"),
            Err(FenError::SideToMove(_))
        ));
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w X - 0 1"),
            Err(FenError::Castling(_))
        ));
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - e4 0 1"),
            Err(FenError::EnPassant(_))
        ));
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - x 1"),
            Err(FenError::Counter(_))
        ));
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::KingCount)
        ));
        assert!(matches!(
            Position::from_fen("4k3/9/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::Placement(_))
        ));
        assert!(matches!(
            Position::from_fen("w"),
            Err(FenError::FieldCount(1))
        ));
    }
}
