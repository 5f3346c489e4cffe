//! Genetic operators on genomes.
//!
//! These functions create, recombine and perturb [`Genome`]s. All of them
//! return new genomes and leave their inputs untouched, and all randomness
//! comes from the generator passed in, so a seeded generator reproduces the
//! same offspring.
//!
//! # Operations
//!
//! - **Initialization**: [`random_genome`] scatters genes around
//!   [`DEFAULT_GENES`] with noise proportional to each default.
//! - **Crossover**: [`crossover`] takes each gene from either parent with equal
//!   probability (uniform crossover).
//! - **Mutation**: [`mutate`] adds Gaussian noise to randomly chosen genes.
//!
//! Piece values are kept at or above [`MIN_PIECE_VALUE`] after initialization
//! and mutation so that material never becomes worthless or negative.
//! Term weights are unbounded.

use evochess_evaluator::genome::{DEFAULT_GENES, GENE_COUNT, Genome, PIECE_VALUE_COUNT};
use rand::Rng;
use rand_distr::Normal;

/// Lower bound for piece-value genes.
pub const MIN_PIECE_VALUE: f32 = 0.1;

fn clamp_piece_values(genes: &mut [f32; GENE_COUNT]) {
    for gene in &mut genes[..PIECE_VALUE_COUNT] {
        *gene = gene.max(MIN_PIECE_VALUE);
    }
}

/// Generates a genome near the conventional defaults.
///
/// Each gene is `default + N(0, noise) · default`, so `noise` is a relative
/// standard deviation. A `noise` of `0.0` reproduces [`DEFAULT_GENES`].
///
/// # Panics
///
/// Panics if `noise` is negative or not finite.
///
/// # Examples
///
/// ```
/// use evochess_evaluator::genome::Genome;
/// use evochess_training::genome_ops;
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg64;
///
/// let mut rng = Pcg64::seed_from_u64(7);
/// assert_eq!(genome_ops::random_genome(&mut rng, 0.0), Genome::default());
///
/// let noisy = genome_ops::random_genome(&mut rng, 0.3);
/// assert!(noisy.piece_values().iter().all(|v| *v >= genome_ops::MIN_PIECE_VALUE));
/// ```
pub fn random_genome<R>(rng: &mut R, noise: f32) -> Genome
where
    R: Rng + ?Sized,
{
    let normal = Normal::new(0.0, noise).unwrap();
    let mut genes = DEFAULT_GENES;
    for gene in &mut genes {
        *gene += rng.sample(normal) * *gene;
    }
    clamp_piece_values(&mut genes);
    Genome::new(genes)
}

/// Uniform crossover: each gene comes from `a` or `b` with probability 1/2.
///
/// # Examples
///
/// ```
/// use evochess_evaluator::genome::Genome;
/// use evochess_training::genome_ops;
///
/// let a = Genome::new([0.0; 10]);
/// let b = Genome::new([1.0; 10]);
/// let child = genome_ops::crossover(&a, &b, &mut rand::rng());
/// assert!(child.genes().iter().all(|g| *g == 0.0 || *g == 1.0));
/// ```
pub fn crossover<R>(a: &Genome, b: &Genome, rng: &mut R) -> Genome
where
    R: Rng + ?Sized,
{
    let (a, b) = (a.genes(), b.genes());
    Genome::from_fn(|i| if rng.random_bool(0.5) { a[i] } else { b[i] })
}

/// Gaussian mutation.
///
/// Each gene independently, with probability `rate`, becomes
/// `gene + N(0, magnitude)`; other genes are copied unchanged. Piece values
/// are then clamped to [`MIN_PIECE_VALUE`].
///
/// # Panics
///
/// Panics if `rate` is outside `[0, 1]` or `magnitude` is negative or not
/// finite.
pub fn mutate<R>(genome: &Genome, rate: f64, magnitude: f32, rng: &mut R) -> Genome
where
    R: Rng + ?Sized,
{
    let normal = Normal::new(0.0, magnitude).unwrap();
    let mut genes = *genome.genes();
    for gene in &mut genes {
        if rng.random_bool(rate) {
            *gene += rng.sample(normal);
        }
    }
    clamp_piece_values(&mut genes);
    Genome::new(genes)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn test_crossover_takes_every_gene_from_a_parent() {
        let mut rng = Pcg64::seed_from_u64(1);
        let a = Genome::from_fn(|i| i as f32);
        let b = Genome::from_fn(|i| -(i as f32) - 1.0);
        let (a_before, b_before) = (a, b);
        let mut from_a = 0;
        for _ in 0..50 {
            let child = crossover(&a, &b, &mut rng);
            for (i, gene) in child.genes().iter().enumerate() {
                assert!(*gene == a.genes()[i] || *gene == b.genes()[i]);
                from_a += usize::from(*gene == a.genes()[i]);
            }
        }
        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
        // both parents contribute
        assert!(from_a > 100 && from_a < 400, "{from_a}");
    }

    #[test]
    fn test_mutation_rate_zero_is_identity() {
        let mut rng = Pcg64::seed_from_u64(2);
        let genome = Genome::default();
        assert_eq!(mutate(&genome, 0.0, 5.0, &mut rng), genome);
    }

    #[test]
    fn test_mutation_rate_one_changes_every_weight() {
        let mut rng = Pcg64::seed_from_u64(3);
        let genome = Genome::default();
        let mutated = mutate(&genome, 1.0, 0.5, &mut rng);
        assert_eq!(genome, Genome::default());
        let changed = std::iter::zip(genome.genes(), mutated.genes())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, GENE_COUNT);
    }

    #[test]
    fn test_mutation_keeps_piece_values_positive() {
        let mut rng = Pcg64::seed_from_u64(4);
        let genome = Genome::new([0.1; GENE_COUNT]);
        for _ in 0..100 {
            let mutated = mutate(&genome, 1.0, 10.0, &mut rng);
            assert!(mutated.piece_values().iter().all(|v| *v >= MIN_PIECE_VALUE));
        }
    }

    #[test]
    fn test_random_genome_is_reproducible() {
        let first = random_genome(&mut Pcg64::seed_from_u64(42), 0.3);
        let second = random_genome(&mut Pcg64::seed_from_u64(42), 0.3);
        assert_eq!(first, second);
        assert_ne!(first, Genome::default());
    }
}
