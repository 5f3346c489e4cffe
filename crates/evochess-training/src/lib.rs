//! Genetic evolution of chess evaluation genomes.
//!
//! This crate turns the static evaluator of `evochess-evaluator` into something
//! that learns: a population of genomes plays round-robin tournaments, the
//! winners reproduce, and piece values and term weights drift toward stronger
//! play over generations.
//!
//! # How Training Works
//!
//! 1. **Population** - Scatter genomes around the conventional defaults
//! 2. **Tournament** - Every pair of genomes plays one game at a fixed search depth
//! 3. **Fitness** - Accumulated tournament points (win 3, draw 1, plus a speed bonus)
//! 4. **Selection** - Keep the elites, pick parents by tournament selection
//! 5. **Reproduction** - Uniform crossover followed by Gaussian mutation
//! 6. **Repeat** - For the configured number of generations
//!
//! # Architecture
//!
//! ```text
//! EvolutionLoop (evolution)
//!     ↓ population
//! Round Robin (tournament)
//!     ↓ pairs of genomes
//! SearchEngine × 2 per game (evochess-evaluator)
//!     ↓ game results
//! Scores → Ranking (genetic)
//!     ↓ parents
//! Crossover & Mutation (genome_ops)
//!     ↓
//! Next population
//! ```
//!
//! # Modules
//!
//! - [`config`] - Run parameters and their validation
//! - [`genome_ops`] - Initialization, crossover and mutation of genomes
//! - [`tournament`] - Single games, scoring and round robins
//! - [`genetic`] - Ranking, elitism and tournament selection
//! - [`evolution`] - The generational loop, its history and snapshots
//!
//! # Reproducibility
//!
//! Searches and games are deterministic, and every random decision draws from
//! one generator seeded by [`EvolutionConfig::seed`]. Two runs with the same
//! configuration produce byte-identical JSON histories, whether or not games
//! are played in parallel.
//!
//! # Example
//!
//! ```
//! use evochess_training::{config::EvolutionConfig, evolution::EvolutionLoop};
//!
//! let config = EvolutionConfig {
//!     population_size: 2,
//!     generations: 2,
//!     depth: 1,
//!     max_moves: 4,
//!     ..Default::default()
//! };
//! let mut evolution = EvolutionLoop::new(config).unwrap();
//! while let Some(stats) = evolution.step().unwrap() {
//!     assert_eq!(stats.population.len(), 2);
//! }
//! assert_eq!(evolution.history().generations.len(), 2);
//! ```
//!
//! # Current Limitations
//!
//! - **Full round robin only**: every generation plays N(N−1)/2 games, which
//!   limits practical population sizes
//! - **One game per pair**: colors are not swapped, so the lower-indexed genome
//!   always has the first move
//! - **Fixed parameters**: mutation rate and magnitude do not adapt over
//!   generations
//!
//! [`EvolutionConfig::seed`]: config::EvolutionConfig::seed

pub mod config;
pub mod evolution;
pub mod genetic;
pub mod genome_ops;
pub mod tournament;
