//! Static position evaluation.
//!
//! The score of a position is a weighted sum of five hand-crafted terms:
//!
//! ```text
//! score = w_material·material + w_mobility·mobility + w_center·center
//!       + w_king_safety·king_safety + w_pawn_structure·pawn_structure
//! ```
//!
//! Every term is computed White-minus-Black, so a positive score favors White
//! regardless of the side to move. The search converts it to the mover's
//! perspective.
//!
//! # Terms
//!
//! - **Material**: piece counts weighted by the genome's piece values.
//! - **Mobility**: legal move count of White minus that of Black. The side not
//!   on move is counted as if it were its turn.
//! - **Center control**: over d4, e4, d5 and e5, `±0.5` per occupying piece and
//!   `±0.25` per attacker.
//! - **King safety**: `+0.3` per friendly pawn in the three files and two ranks
//!   in front of the king, `-0.2` per enemy non-pawn within two squares.
//! - **Pawn structure**: `-0.2` doubled, `-0.15` isolated, `+0.1` connected,
//!   and `+0.1` per rank of advancement for passed pawns.

use std::fmt;

use evochess_engine::{Board, Color, PieceKind, Position, Square};

use crate::genome::{EVAL_WEIGHT_COUNT, Genome};

const CENTER_SQUARES: [Square; 4] = [Square::D4, Square::E4, Square::D5, Square::E5];
const CENTER_OCCUPANCY: f32 = 0.5;
const CENTER_ATTACK: f32 = 0.25;
const KING_SHELTER_PAWN: f32 = 0.3;
const KING_ENEMY_NEARBY: f32 = 0.2;
const KING_DANGER_RADIUS: u8 = 2;
const DOUBLED_PAWN: f32 = 0.2;
const ISOLATED_PAWN: f32 = 0.15;
const PASSED_PAWN_PER_RANK: f32 = 0.1;
const CONNECTED_PAWN: f32 = 0.1;

/// Scores positions for the search.
pub trait Evaluator: fmt::Debug + Send + Sync {
    /// Returns the static score of `board`; positive favors White.
    fn score(&self, board: &Board) -> f32;
}

/// Raw values of the five evaluation terms, before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EvalFeatures {
    pub material: f32,
    pub mobility: f32,
    pub center_control: f32,
    pub king_safety: f32,
    pub pawn_structure: f32,
}

impl EvalFeatures {
    /// Computes all terms for `position`, valuing material with the
    /// genome's piece values.
    #[must_use]
    pub fn compute(position: &Position, genome: &Genome) -> Self {
        Self {
            material: material(position, genome),
            mobility: mobility(position),
            center_control: center_control(position),
            king_safety: king_safety(position),
            pawn_structure: pawn_structure(position),
        }
    }

    /// Terms in gene order.
    #[must_use]
    pub fn to_array(&self) -> [f32; EVAL_WEIGHT_COUNT] {
        [
            self.material,
            self.mobility,
            self.center_control,
            self.king_safety,
            self.pawn_structure,
        ]
    }

    #[must_use]
    pub fn weighted_sum(&self, weights: &[f32; EVAL_WEIGHT_COUNT]) -> f32 {
        std::iter::zip(self.to_array(), weights)
            .map(|(f, w)| f * w)
            .sum()
    }
}

/// Evaluator parameterized by a [`Genome`].
///
/// # Example
///
/// ```
/// use evochess_engine::Board;
/// use evochess_evaluator::{evaluator::{Evaluator, GenomeEvaluator}, genome::Genome};
///
/// let evaluator = GenomeEvaluator::new(Genome::default());
/// // the starting position is symmetric
/// assert_eq!(evaluator.score(&Board::initial()), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenomeEvaluator {
    genome: Genome,
}

impl GenomeEvaluator {
    #[must_use]
    pub fn new(genome: Genome) -> Self {
        Self { genome }
    }

    #[must_use]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    #[must_use]
    pub fn features(&self, board: &Board) -> EvalFeatures {
        EvalFeatures::compute(board.position(), &self.genome)
    }
}

impl Evaluator for GenomeEvaluator {
    #[inline]
    fn score(&self, board: &Board) -> f32 {
        self.features(board)
            .weighted_sum(&self.genome.eval_weights())
    }
}

#[must_use]
pub fn material(position: &Position, genome: &Genome) -> f32 {
    position
        .pieces()
        .map(|(_, p)| p.color.sign() * genome.piece_value(p.kind))
        .sum()
}

#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mobility(position: &Position) -> f32 {
    let white = position.count_legal_moves_for(Color::White);
    let black = position.count_legal_moves_for(Color::Black);
    white as f32 - black as f32
}

#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn center_control(position: &Position) -> f32 {
    let mut score = 0.0;
    for sq in CENTER_SQUARES {
        if let Some(piece) = position.piece_at(sq) {
            score += piece.color.sign() * CENTER_OCCUPANCY;
        }
        score += position.attackers(sq, Color::White) as f32 * CENTER_ATTACK;
        score -= position.attackers(sq, Color::Black) as f32 * CENTER_ATTACK;
    }
    score
}

#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn king_safety(position: &Position) -> f32 {
    let mut score = 0.0;
    for color in Color::ALL {
        let Some(king) = position.king_square(color) else {
            continue;
        };
        let forward = color.pawn_forward();
        let mut shelter = 0.0;
        for df in -1..=1 {
            for dr in 1..=2 {
                let is_own_pawn = king
                    .offset(df, dr * forward)
                    .and_then(|sq| position.piece_at(sq))
                    .is_some_and(|p| p.kind == PieceKind::Pawn && p.color == color);
                if is_own_pawn {
                    shelter += KING_SHELTER_PAWN;
                }
            }
        }
        let nearby_enemies = position
            .pieces()
            .filter(|(sq, p)| {
                p.color != color
                    && p.kind != PieceKind::Pawn
                    && sq.chebyshev_distance(king) <= KING_DANGER_RADIUS
            })
            .count();
        let danger = nearby_enemies as f32 * KING_ENEMY_NEARBY;
        score += color.sign() * (shelter - danger);
    }
    score
}

#[must_use]
pub fn pawn_structure(position: &Position) -> f32 {
    let mut pawns: [Vec<Square>; 2] = [vec![], vec![]];
    for (sq, p) in position.pieces() {
        if p.kind == PieceKind::Pawn {
            pawns[p.color.index()].push(sq);
        }
    }

    let mut score = 0.0;
    for color in Color::ALL {
        let own = &pawns[color.index()];
        let enemy = &pawns[color.opponent().index()];
        let mut side = 0.0;
        for &sq in own {
            let others = || own.iter().filter(move |&&o| o != sq);
            if others().any(|o| o.file() == sq.file()) {
                side -= DOUBLED_PAWN;
            }
            if !others().any(|o| o.file().abs_diff(sq.file()) == 1) {
                side -= ISOLATED_PAWN;
            }
            let blocked = enemy.iter().any(|e| {
                e.file().abs_diff(sq.file()) <= 1
                    && match color {
                        Color::White => e.rank() > sq.rank(),
                        Color::Black => e.rank() < sq.rank(),
                    }
            });
            if !blocked {
                let advancement = match color {
                    Color::White => sq.rank(),
                    Color::Black => 7 - sq.rank(),
                };
                side += PASSED_PAWN_PER_RANK * f32::from(advancement);
            }
            if others().any(|o| o.rank() == sq.rank() && o.file().abs_diff(sq.file()) == 1) {
                side += CONNECTED_PAWN;
            }
        }
        score += color.sign() * side;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_initial_position_is_balanced() {
        let features = EvalFeatures::compute(&Position::initial(), &Genome::default());
        assert_eq!(features, EvalFeatures::default());
    }

    #[test]
    fn test_material_uses_piece_values() {
        let genome = Genome::default();
        assert_close(material(&pos("3qk3/8/8/8/8/8/8/3QK3 w - - 0 1"), &genome), 0.0);
        assert_close(material(&pos("4k3/8/8/8/8/8/8/3QK3 w - - 0 1"), &genome), 9.0);
        assert_close(
            material(&pos("4k3/pp6/8/8/8/8/8/2B1K3 w - - 0 1"), &genome),
            1.25,
        );
    }

    #[test]
    fn test_mobility_counts_both_sides() {
        // rook 10 + king 5 against a bare king with 5 moves
        assert_close(mobility(&pos("4k3/8/8/8/8/8/8/R3K3 w - - 0 1")), 10.0);
        // unchanged when the other side is on move
        assert_close(mobility(&pos("4k3/8/8/8/8/8/8/R3K3 b - - 0 1")), 10.0);
    }

    #[test]
    fn test_center_control_occupancy_and_attacks() {
        // pawn on e4 occupies e4 and attacks d5
        assert_close(
            center_control(&pos("4k3/8/8/8/4P3/8/8/4K3 w - - 0 1")),
            0.75,
        );
    }

    #[test]
    fn test_king_safety_shelter_and_danger() {
        assert_close(king_safety(&pos("4k3/8/8/8/8/8/3PPP2/4K3 w - - 0 1")), 0.9);
        assert_close(
            king_safety(&pos("4k3/8/8/8/8/4q3/3PPP2/4K3 w - - 0 1")),
            0.7,
        );
    }

    #[test]
    fn test_pawn_structure_terms() {
        // connected passed pawns on the second rank
        assert_close(
            pawn_structure(&pos("4k3/8/8/8/8/8/PP6/4K3 w - - 0 1")),
            0.4,
        );
        // doubled isolated passed pawns on a2 and a3
        assert_close(
            pawn_structure(&pos("4k3/8/8/8/8/P7/P7/4K3 w - - 0 1")),
            -0.4,
        );
        // pawns on adjacent files block each other from being passed
        assert_close(
            pawn_structure(&pos("4k3/1p6/8/8/8/8/P7/4K3 w - - 0 1")),
            0.0,
        );
        // a lone black pawn on c3 is passed and five ranks advanced
        assert_close(
            pawn_structure(&pos("4k3/8/8/8/8/2p5/8/4K3 w - - 0 1")),
            -(-0.15 + 0.5),
        );
    }

    #[test]
    fn test_score_is_weighted_sum() {
        let genome = Genome::new([1.0, 3.0, 3.0, 5.0, 9.0, 2.0, 0.0, 0.0, 0.0, 0.0]);
        let evaluator = GenomeEvaluator::new(genome);
        let board = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert_close(evaluator.score(&board), 18.0);

        let flipped = Board::from_fen("3qk3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_close(evaluator.score(&flipped), -18.0);
    }
}
