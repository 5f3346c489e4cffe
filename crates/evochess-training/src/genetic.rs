//! Selection and reproduction.
//!
//! After a tournament, the population is ranked by fitness and the next
//! generation is bred from the ranking:
//!
//! 1. **Elitism** - The top `elite_count` genomes are copied unchanged.
//! 2. **Tournament selection** - Each parent is the fittest of
//!    `tournament_size` individuals sampled without replacement from the whole
//!    ranked population.
//! 3. **Crossover** - Two parents produce one child by uniform crossover.
//! 4. **Mutation** - The child receives Gaussian noise.
//!
//! Steps 2 to 4 repeat until the new population has the same size as the old
//! one.
//!
//! # Determinism
//!
//! Ranking is a stable sort, so individuals with equal fitness keep their
//! population order. Selection and variation draw from the generator passed
//! to [`Breeder::breed`] in a fixed order, so a seeded generator always breeds
//! the same offspring.

use std::cmp::Ordering;

use evochess_evaluator::genome::Genome;
use rand::{Rng, seq::index};
use serde::{Deserialize, Serialize};

use crate::{config::EvolutionConfig, genome_ops};

/// A genome together with its fitness in the last tournament.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// Position of the genome in the tournament population, as used by
    /// [`GameRecord::white`] and [`GameRecord::black`].
    ///
    /// [`GameRecord::white`]: crate::tournament::GameRecord::white
    /// [`GameRecord::black`]: crate::tournament::GameRecord::black
    pub index: usize,
    pub genome: Genome,
    pub fitness: f32,
}

fn by_fitness_descending(a: &Individual, b: &Individual) -> Ordering {
    b.fitness.total_cmp(&a.fitness)
}

/// Pairs `genomes` with their `scores` and sorts them best first.
///
/// The sort is stable: ties keep the order of `genomes`. Each individual
/// remembers its position in `genomes` as [`Individual::index`].
///
/// # Examples
///
/// ```
/// use evochess_evaluator::genome::Genome;
/// use evochess_training::genetic;
///
/// let genomes = [Genome::new([1.0; 10]), Genome::new([2.0; 10]), Genome::new([3.0; 10])];
/// let ranked = genetic::rank(&genomes, &[1.0, 4.0, 1.0]);
/// assert_eq!(ranked[0].genome, genomes[1]);
/// assert_eq!(ranked[1].genome, genomes[0]);
/// assert_eq!(ranked[2].genome, genomes[2]);
/// assert_eq!(ranked.iter().map(|ind| ind.index).collect::<Vec<_>>(), [1, 0, 2]);
/// ```
#[must_use]
pub fn rank(genomes: &[Genome], scores: &[f32]) -> Vec<Individual> {
    assert_eq!(genomes.len(), scores.len(), "one score per genome");
    let mut ranked = std::iter::zip(genomes, scores)
        .enumerate()
        .map(|(index, (&genome, &fitness))| Individual {
            index,
            genome,
            fitness,
        })
        .collect::<Vec<_>>();
    ranked.sort_by(by_fitness_descending);
    ranked
}

/// Controls how one generation is bred from the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct Breeder {
    /// Number of top individuals preserved unchanged.
    pub elite_count: usize,
    /// Number of candidates per parent selection.
    pub tournament_size: usize,
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
    /// Standard deviation of the mutation noise.
    pub mutation_magnitude: f32,
}

impl Breeder {
    #[must_use]
    pub fn from_config(config: &EvolutionConfig) -> Self {
        Self {
            elite_count: config.elite_count(),
            tournament_size: config.tournament_size,
            mutation_rate: config.mutation_rate,
            mutation_magnitude: config.mutation_magnitude,
        }
    }

    /// Breeds a new population of the same size as `ranked`.
    ///
    /// The first `elite_count` genomes of the result are the elites, in rank
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if `ranked` is not sorted by descending fitness, or if it is
    /// non-empty and `tournament_size` is zero.
    #[must_use]
    pub fn breed<R>(&self, ranked: &[Individual], rng: &mut R) -> Vec<Genome>
    where
        R: Rng + ?Sized,
    {
        assert!(
            ranked.is_sorted_by(|a, b| a.fitness >= b.fitness),
            "population must be ranked by descending fitness"
        );

        let elite_count = self.elite_count.min(ranked.len());
        let mut next = ranked[..elite_count]
            .iter()
            .map(|ind| ind.genome)
            .collect::<Vec<_>>();

        while next.len() < ranked.len() {
            let p1 = tournament_select(ranked, self.tournament_size, rng);
            let p2 = tournament_select(ranked, self.tournament_size, rng);
            let child = genome_ops::crossover(&p1.genome, &p2.genome, rng);
            let child =
                genome_ops::mutate(&child, self.mutation_rate, self.mutation_magnitude, rng);
            next.push(child);
        }
        next
    }
}

/// Picks the fittest of `tournament_size` distinct individuals.
///
/// `ranked` is sorted best first, so the winner is the sampled individual with
/// the lowest index. Among equally fit candidates the one ranked first wins.
fn tournament_select<'a, R>(
    ranked: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0);
    let amount = tournament_size.min(ranked.len());
    let best = index::sample(rng, ranked.len(), amount)
        .into_iter()
        .min()
        .unwrap();
    &ranked[best]
}
