//! The generational loop.
//!
//! [`EvolutionLoop`] owns the population and drives it through a fixed number
//! of generations. Each generation:
//!
//! 1. plays a round-robin tournament ([`tournament::run_round_robin`]),
//! 2. ranks genomes by accumulated score ([`genetic::rank`]),
//! 3. records a [`GenerationStats`] entry in the [`EvolutionHistory`],
//! 4. breeds the next population ([`Breeder::breed`]) unless it was the last
//!    generation.
//!
//! ```text
//! Initialized ─step─▶ Running { generation: 1 } ─step─▶ ... ─step─▶ Finished
//! ```
//!
//! All randomness comes from a single [`Pcg64`] seeded from
//! [`EvolutionConfig::seed`], and tournaments are deterministic, so two runs
//! with the same configuration produce identical histories.

use evochess_evaluator::genome::{GENE_COUNT, Genome};
use evochess_stats::descriptive::DescriptiveStats;
use rand::SeedableRng as _;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::{
    config::{ConfigError, EvolutionConfig},
    genetic::{self, Breeder, Individual},
    genome_ops,
    tournament::{self, GameRecord, TournamentError},
};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("population must have {expected} genomes, got {actual}")]
pub struct PopulationSizeError {
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EvolutionError {
    #[display("invalid configuration: {_0}")]
    Config(ConfigError),
    #[display("tournament failed: {_0}")]
    Tournament(TournamentError),
    #[display("invalid population: {_0}")]
    PopulationSize(PopulationSizeError),
}

/// Progress of an [`EvolutionLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum EvolutionState {
    /// No generation has been evaluated yet.
    Initialized,
    /// `generation` is the next generation to evaluate.
    Running { generation: usize },
    /// All configured generations have been evaluated.
    Finished,
}

/// Summary of one evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f32,
    pub average_fitness: f32,
    pub worst_fitness: f32,
    pub champion: Genome,
    /// The evaluated population, best first. [`Individual::index`] links each
    /// entry to the player indices of `games`.
    pub population: Vec<Individual>,
    pub fitness_stats: DescriptiveStats,
    /// Distribution of each gene across the population, in gene order.
    pub gene_stats: Vec<DescriptiveStats>,
    pub games: Vec<GameRecord>,
}

impl GenerationStats {
    fn new(generation: usize, ranked: Vec<Individual>, games: Vec<GameRecord>) -> Self {
        let fitness_stats = DescriptiveStats::new(ranked.iter().map(|ind| ind.fitness)).unwrap();
        let gene_stats = (0..GENE_COUNT)
            .map(|i| {
                let genes = ranked.iter().map(|ind| ind.genome.genes()[i]);
                DescriptiveStats::new(genes).unwrap()
            })
            .collect();
        Self {
            generation,
            best_fitness: fitness_stats.max,
            average_fitness: fitness_stats.mean,
            worst_fitness: fitness_stats.min,
            champion: ranked[0].genome,
            population: ranked,
            fitness_stats,
            gene_stats,
            games,
        }
    }
}

/// Statistics of every evaluated generation, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvolutionHistory {
    pub generations: Vec<GenerationStats>,
}

impl EvolutionHistory {
    /// Best individual of the most recent generation.
    #[must_use]
    pub fn champion(&self) -> Option<&Individual> {
        self.generations.last().and_then(|g| g.population.first())
    }
}

/// A population saved for later resumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    /// Generations evaluated before this population was taken.
    pub generation: usize,
    pub genomes: Vec<Genome>,
}

/// Runs the genetic algorithm.
///
/// # Example
///
/// ```
/// use evochess_training::{config::EvolutionConfig, evolution::EvolutionLoop};
///
/// let config = EvolutionConfig {
///     population_size: 3,
///     generations: 1,
///     depth: 1,
///     max_moves: 4,
///     ..Default::default()
/// };
/// let mut evolution = EvolutionLoop::new(config).unwrap();
/// let history = evolution.run().unwrap();
/// assert_eq!(history.generations.len(), 1);
/// assert_eq!(history.generations[0].games.len(), 3);
/// assert!(evolution.state().is_finished());
/// ```
#[derive(Debug, Clone)]
pub struct EvolutionLoop {
    config: EvolutionConfig,
    breeder: Breeder,
    rng: Pcg64,
    population: Vec<Genome>,
    state: EvolutionState,
    history: EvolutionHistory,
}

impl EvolutionLoop {
    /// Creates a loop with a random initial population around the default
    /// genome.
    pub fn new(config: EvolutionConfig) -> Result<Self, EvolutionError> {
        config.validate()?;
        let mut rng = Pcg64::seed_from_u64(config.seed);
        let population = (0..config.population_size)
            .map(|_| genome_ops::random_genome(&mut rng, config.init_noise))
            .collect();
        Ok(Self::with_parts(config, rng, population))
    }

    /// Creates a loop starting from `population`, for example one restored
    /// from a [`PopulationSnapshot`].
    pub fn with_population(
        config: EvolutionConfig,
        population: Vec<Genome>,
    ) -> Result<Self, EvolutionError> {
        config.validate()?;
        if population.len() != config.population_size {
            return Err(PopulationSizeError {
                expected: config.population_size,
                actual: population.len(),
            }
            .into());
        }
        let rng = Pcg64::seed_from_u64(config.seed);
        Ok(Self::with_parts(config, rng, population))
    }

    fn with_parts(config: EvolutionConfig, rng: Pcg64, population: Vec<Genome>) -> Self {
        Self {
            breeder: Breeder::from_config(&config),
            config,
            rng,
            population,
            state: EvolutionState::Initialized,
            history: EvolutionHistory::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> EvolutionState {
        self.state
    }

    /// The population to be evaluated next, or the final ranked population
    /// once finished.
    #[must_use]
    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    #[must_use]
    pub fn history(&self) -> &EvolutionHistory {
        &self.history
    }

    #[must_use]
    pub fn into_history(self) -> EvolutionHistory {
        self.history
    }

    #[must_use]
    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot {
            generation: self.history.generations.len(),
            genomes: self.population.clone(),
        }
    }

    /// Evaluates one generation and breeds the next.
    ///
    /// Returns `None` once all generations have been evaluated. If the
    /// tournament fails, the loop is left unchanged.
    pub fn step(&mut self) -> Result<Option<&GenerationStats>, EvolutionError> {
        let generation = match self.state {
            EvolutionState::Initialized => 0,
            EvolutionState::Running { generation } => generation,
            EvolutionState::Finished => return Ok(None),
        };

        let outcome =
            tournament::run_round_robin(&self.population, &self.config.tournament_config())?;
        let ranked = genetic::rank(&self.population, &outcome.scores);
        let is_last = generation + 1 >= self.config.generations;
        self.population = if is_last {
            ranked.iter().map(|ind| ind.genome).collect()
        } else {
            self.breeder.breed(&ranked, &mut self.rng)
        };
        self.state = if is_last {
            EvolutionState::Finished
        } else {
            EvolutionState::Running {
                generation: generation + 1,
            }
        };

        let stats = GenerationStats::new(generation, ranked, outcome.games);
        log::info!(
            "generation {generation}: best {:.3}, average {:.3}, worst {:.3}",
            stats.best_fitness,
            stats.average_fitness,
            stats.worst_fitness
        );
        log::debug!("champion: {}", stats.champion);
        self.history.generations.push(stats);
        Ok(self.history.generations.last())
    }

    /// Runs all remaining generations.
    pub fn run(&mut self) -> Result<&EvolutionHistory, EvolutionError> {
        while self.step()?.is_some() {}
        Ok(&self.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> EvolutionConfig {
        EvolutionConfig {
            population_size: 4,
            generations: 2,
            depth: 2,
            max_moves: 16,
            ..Default::default()
        }
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let mut first = EvolutionLoop::new(small_config()).unwrap();
        first.run().unwrap();
        let mut second = EvolutionLoop::new(EvolutionConfig {
            parallel: false,
            ..small_config()
        })
        .unwrap();
        second.run().unwrap();

        let first_json = serde_json::to_string(first.history()).unwrap();
        let second_json = serde_json::to_string(second.history()).unwrap();
        assert_eq!(first_json, second_json);
        assert_eq!(first.population(), second.population());
    }

    #[test]
    fn test_history_shape() {
        let mut evolution = EvolutionLoop::new(small_config()).unwrap();
        let history = evolution.run().unwrap();
        assert_eq!(history.generations.len(), 2);
        for (i, stats) in history.generations.iter().enumerate() {
            assert_eq!(stats.generation, i);
            assert_eq!(stats.population.len(), 4);
            assert_eq!(stats.games.len(), 6);
            assert_eq!(stats.gene_stats.len(), GENE_COUNT);
            assert_eq!(stats.champion, stats.population[0].genome);
            assert!(stats.best_fitness >= stats.average_fitness);
            assert!(stats.average_fitness >= stats.worst_fitness);
        }
    }

    #[test]
    fn test_elites_carry_over() {
        let config = EvolutionConfig {
            elite_fraction: 0.5,
            ..small_config()
        };
        let mut evolution = EvolutionLoop::new(config).unwrap();
        let first = evolution.step().unwrap().unwrap().clone();
        let next = evolution.population();
        assert_eq!(next.len(), 4);
        assert_eq!(next[0], first.population[0].genome);
        assert_eq!(next[1], first.population[1].genome);
    }

    #[test]
    fn test_state_transitions() {
        let mut evolution = EvolutionLoop::new(small_config()).unwrap();
        assert_eq!(evolution.state(), EvolutionState::Initialized);
        evolution.step().unwrap();
        assert_eq!(evolution.state(), EvolutionState::Running { generation: 1 });
        evolution.step().unwrap();
        assert_eq!(evolution.state(), EvolutionState::Finished);
        assert!(evolution.step().unwrap().is_none());
        assert_eq!(evolution.history().generations.len(), 2);
        assert_eq!(evolution.snapshot().generation, 2);

        // the final population is the last ranking
        let last = &evolution.history().generations[1];
        let ranked = last.population.iter().map(|ind| ind.genome).collect::<Vec<_>>();
        assert_eq!(evolution.population(), ranked);
        assert_eq!(
            evolution.history().champion().map(|ind| ind.genome),
            Some(last.champion)
        );
    }

    #[test]
    fn test_resume_from_population() {
        let genomes = vec![Genome::default(); 4];
        let evolution = EvolutionLoop::with_population(small_config(), genomes.clone()).unwrap();
        assert_eq!(evolution.population(), genomes);

        let err = EvolutionLoop::with_population(small_config(), vec![Genome::default(); 3])
            .unwrap_err();
        assert!(matches!(
            err,
            EvolutionError::PopulationSize(PopulationSizeError {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EvolutionConfig {
            population_size: 1,
            ..Default::default()
        };
        let err = EvolutionLoop::new(config).unwrap_err();
        assert!(matches!(
            err,
            EvolutionError::Config(ConfigError::PopulationSize(1))
        ));
    }

    #[test]
    fn test_game_indices_match_fitness() {
        let config = EvolutionConfig {
            depth: 1,
            max_moves: 40,
            generations: 1,
            ..small_config()
        };
        let max_moves = config.max_moves;
        let mut evolution = EvolutionLoop::new(config).unwrap();
        let evaluated = evolution.population().to_vec();
        let stats = evolution.step().unwrap().unwrap();

        let mut scores = [0.0; 4];
        for game in &stats.games {
            let (white, black) = tournament::score_game(&game.result, max_moves);
            scores[game.white] += white;
            scores[game.black] += black;
        }
        let mut indices = stats.population.iter().map(|ind| ind.index).collect::<Vec<_>>();
        for ind in &stats.population {
            assert_eq!(ind.fitness, scores[ind.index]);
            assert_eq!(ind.genome, evaluated[ind.index]);
        }
        indices.sort_unstable();
        assert_eq!(indices, [0, 1, 2, 3]);
    }

    #[test]
    fn test_champion_survives_every_generation() {
        // a material-only genome among randomized ones
        let material_only = Genome::new([1.0, 3.0, 3.25, 5.0, 9.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        let config = EvolutionConfig {
            population_size: 4,
            generations: 4,
            depth: 1,
            max_moves: 30,
            elite_fraction: 0.25,
            ..Default::default()
        };
        let mut rng = Pcg64::seed_from_u64(7);
        let mut genomes = vec![material_only];
        genomes.extend((0..3).map(|_| genome_ops::random_genome(&mut rng, 0.3)));
        let mut evolution = EvolutionLoop::with_population(config, genomes).unwrap();

        while let Some(stats) = evolution.step().unwrap() {
            let champion = stats.champion;
            assert!(evolution.population().contains(&champion));
            assert_eq!(evolution.population()[0], champion);
        }
        assert_eq!(evolution.history().generations.len(), 4);
    }

    #[test]
    fn test_snapshot_round_trips() {
        let evolution = EvolutionLoop::new(small_config()).unwrap();
        let snapshot = evolution.snapshot();
        assert_eq!(snapshot.generation, 0);
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: PopulationSnapshot = serde_json::from_str(&json).unwrap();
        let resumed = EvolutionLoop::with_population(small_config(), back.genomes).unwrap();
        assert_eq!(resumed.population(), evolution.population());
    }
}
