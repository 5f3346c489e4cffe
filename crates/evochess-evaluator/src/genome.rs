//! The evolvable parameter vector.
//!
//! A [`Genome`] holds exactly [`GENE_COUNT`] real-valued genes:
//!
//! | index | gene               | meaning                               |
//! |-------|--------------------|---------------------------------------|
//! | 0..5  | `pawn_value`..`queen_value` | material value per piece kind |
//! | 5     | `w_material`       | weight of the material term           |
//! | 6     | `w_mobility`       | weight of the mobility term           |
//! | 7     | `w_center`         | weight of the center-control term     |
//! | 8     | `w_king_safety`    | weight of the king-safety term        |
//! | 9     | `w_pawn_structure` | weight of the pawn-structure term     |
//!
//! Kings carry no material value. Genomes serialize as a plain JSON array of
//! ten numbers; arrays of any other length are rejected.

use std::fmt;

use evochess_engine::PieceKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of genes in a genome.
pub const GENE_COUNT: usize = 10;

/// Number of piece-value genes (pawn through queen).
pub const PIECE_VALUE_COUNT: usize = 5;

/// Number of evaluation-weight genes.
pub const EVAL_WEIGHT_COUNT: usize = GENE_COUNT - PIECE_VALUE_COUNT;

/// Conventional piece values followed by the starting term weights.
pub const DEFAULT_GENES: [f32; GENE_COUNT] = [1.0, 3.0, 3.25, 5.0, 9.0, 1.0, 0.1, 0.3, 0.2, 0.2];

/// Display names of the genes, in order.
pub const GENE_LABELS: [&str; GENE_COUNT] = [
    "pawn_value",
    "knight_value",
    "bishop_value",
    "rook_value",
    "queen_value",
    "w_material",
    "w_mobility",
    "w_center",
    "w_king_safety",
    "w_pawn_structure",
];

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("genome must have {GENE_COUNT} genes, got {actual}", GENE_COUNT = GENE_COUNT)]
pub struct GenomeLengthError {
    pub actual: usize,
}

/// Piece values and evaluation weights of one individual.
///
/// # Example
///
/// ```
/// use evochess_evaluator::genome::Genome;
/// use evochess_engine::PieceKind;
///
/// let genome = Genome::default();
/// assert_eq!(genome.piece_value(PieceKind::Queen), 9.0);
/// assert_eq!(genome.piece_value(PieceKind::King), 0.0);
/// assert!(Genome::from_slice(&[1.0; 9]).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Genome {
    genes: [f32; GENE_COUNT],
}

impl Default for Genome {
    fn default() -> Self {
        Self::new(DEFAULT_GENES)
    }
}

impl From<[f32; GENE_COUNT]> for Genome {
    fn from(genes: [f32; GENE_COUNT]) -> Self {
        Self::new(genes)
    }
}

impl TryFrom<&[f32]> for Genome {
    type Error = GenomeLengthError;

    fn try_from(genes: &[f32]) -> Result<Self, Self::Error> {
        Self::from_slice(genes)
    }
}

impl Genome {
    #[must_use]
    pub const fn new(genes: [f32; GENE_COUNT]) -> Self {
        Self { genes }
    }

    pub fn from_slice(genes: &[f32]) -> Result<Self, GenomeLengthError> {
        let genes = genes.try_into().map_err(|_| GenomeLengthError {
            actual: genes.len(),
        })?;
        Ok(Self { genes })
    }

    /// Builds a genome by evaluating `f` for each gene index.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(usize) -> f32,
    {
        Self::new(std::array::from_fn(f))
    }

    #[must_use]
    pub fn genes(&self) -> &[f32; GENE_COUNT] {
        &self.genes
    }

    #[must_use]
    pub fn piece_values(&self) -> [f32; PIECE_VALUE_COUNT] {
        std::array::from_fn(|i| self.genes[i])
    }

    /// Term weights in the order material, mobility, center control, king
    /// safety, pawn structure.
    #[must_use]
    pub fn eval_weights(&self) -> [f32; EVAL_WEIGHT_COUNT] {
        std::array::from_fn(|i| self.genes[PIECE_VALUE_COUNT + i])
    }

    /// Material value of `kind`; kings are worth nothing.
    #[must_use]
    pub fn piece_value(&self, kind: PieceKind) -> f32 {
        match kind {
            PieceKind::King => 0.0,
            _ => self.genes[kind.index()],
        }
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (label, gene)) in GENE_LABELS.iter().zip(self.genes).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{label}={gene:.3}")?;
        }
        Ok(())
    }
}

impl Serialize for Genome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.genes.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Genome {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let genes = Vec::<f32>::deserialize(deserializer)?;
        Self::from_slice(&genes).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slices_follow_gene_layout() {
        let genome = Genome::from_fn(|i| i as f32);
        assert_eq!(genome.piece_values(), [0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(genome.eval_weights(), [5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(genome.piece_value(PieceKind::Pawn), 0.0);
        assert_eq!(genome.piece_value(PieceKind::Rook), 3.0);
        assert_eq!(genome.piece_value(PieceKind::King), 0.0);
    }

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        assert_eq!(
            Genome::from_slice(&[0.0; 11]),
            Err(GenomeLengthError { actual: 11 })
        );
        assert!(Genome::from_slice(&[]).is_err());
        assert_eq!(
            Genome::from_slice(&DEFAULT_GENES).unwrap(),
            Genome::default()
        );
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let genome = Genome::default();
        let json = serde_json::to_string(&genome).unwrap();
        assert_eq!(json, "[1.0,3.0,3.25,5.0,9.0,1.0,0.1,0.3,0.2,0.2]");
        let back: Genome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, genome);
    }

    #[test]
    fn test_deserialize_rejects_wrong_length() {
        let err = serde_json::from_str::<Genome>("[1.0, 2.0, 3.0]").unwrap_err();
        assert!(err.to_string().contains("got 3"));
    }

    #[test]
    fn test_display_uses_labels() {
        let text = Genome::default().to_string();
        assert!(text.starts_with("pawn_value=1.000, knight_value=3.000"));
        assert!(text.ends_with("w_pawn_structure=0.200"));
    }
}
