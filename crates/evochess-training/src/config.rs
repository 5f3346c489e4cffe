//! Evolution parameters.
//!
//! [`EvolutionConfig`] collects every knob of an evolution run. It is loaded
//! from JSON (missing fields take their defaults) and checked with
//! [`EvolutionConfig::validate`] before an [`EvolutionLoop`] is built, so the
//! loop itself never sees an invalid setting.
//!
//! [`EvolutionLoop`]: crate::evolution::EvolutionLoop

use serde::{Deserialize, Serialize};

use crate::tournament::{GameConfig, TournamentConfig};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be at least 2, got {_0}")]
    PopulationSize(#[error(not(source))] usize),
    #[display("number of generations must be at least 1, got {_0}")]
    Generations(#[error(not(source))] usize),
    #[display("search depth must be at least 1, got {_0}")]
    Depth(#[error(not(source))] u32),
    #[display("elite fraction must be within [0, 1], got {_0}")]
    EliteFraction(#[error(not(source))] f64),
    #[display("mutation rate must be within [0, 1], got {_0}")]
    MutationRate(#[error(not(source))] f64),
    #[display("mutation magnitude must be finite and non-negative, got {_0}")]
    MutationMagnitude(#[error(not(source))] f32),
    #[display("move limit must be at least 1, got {_0}")]
    MaxMoves(#[error(not(source))] usize),
    #[display("tournament size must be within [1, {population_size}], got {tournament_size}")]
    TournamentSize {
        tournament_size: usize,
        population_size: usize,
    },
    #[display("initial noise must be finite and non-negative, got {_0}")]
    InitNoise(#[error(not(source))] f32),
}

/// Parameters of an evolution run.
///
/// # Example
///
/// ```
/// use evochess_training::config::EvolutionConfig;
///
/// let config: EvolutionConfig = serde_json::from_str(r#"{ "population_size": 8 }"#).unwrap();
/// assert_eq!(config.population_size, 8);
/// assert_eq!(config.seed, 42);
/// assert_eq!(config.elite_count(), 2);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Number of genomes per generation.
    pub population_size: usize,
    pub generations: usize,
    /// Search depth in plies used in every tournament game.
    pub depth: u32,
    /// Share of the ranked population copied unchanged into the next
    /// generation, rounded down.
    pub elite_fraction: f64,
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
    /// Standard deviation of the mutation noise.
    pub mutation_magnitude: f32,
    pub seed: u64,
    /// Plies after which a game is stopped as a draw.
    pub max_moves: usize,
    /// Candidates per parent selection.
    pub tournament_size: usize,
    /// Relative noise of the initial population around the default genome.
    pub init_noise: f32,
    /// Play tournament games on worker threads.
    pub parallel: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 6,
            generations: 3,
            depth: 2,
            elite_fraction: 0.25,
            mutation_rate: 0.2,
            mutation_magnitude: 0.1,
            seed: 42,
            max_moves: 60,
            tournament_size: 2,
            init_noise: 0.3,
            parallel: true,
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 {
            return Err(ConfigError::PopulationSize(self.population_size));
        }
        if self.generations == 0 {
            return Err(ConfigError::Generations(self.generations));
        }
        if self.depth == 0 {
            return Err(ConfigError::Depth(self.depth));
        }
        if !(0.0..=1.0).contains(&self.elite_fraction) {
            return Err(ConfigError::EliteFraction(self.elite_fraction));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRate(self.mutation_rate));
        }
        if !(self.mutation_magnitude.is_finite() && self.mutation_magnitude >= 0.0) {
            return Err(ConfigError::MutationMagnitude(self.mutation_magnitude));
        }
        if self.max_moves == 0 {
            return Err(ConfigError::MaxMoves(self.max_moves));
        }
        if !(1..=self.population_size).contains(&self.tournament_size) {
            return Err(ConfigError::TournamentSize {
                tournament_size: self.tournament_size,
                population_size: self.population_size,
            });
        }
        if !(self.init_noise.is_finite() && self.init_noise >= 0.0) {
            return Err(ConfigError::InitNoise(self.init_noise));
        }
        Ok(())
    }

    /// Number of elites, `floor(elite_fraction · population_size)`.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn elite_count(&self) -> usize {
        let count = (self.elite_fraction * self.population_size as f64).floor() as usize;
        count.min(self.population_size)
    }

    #[must_use]
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            depth: self.depth,
            max_moves: self.max_moves,
        }
    }

    #[must_use]
    pub fn tournament_config(&self) -> TournamentConfig {
        TournamentConfig {
            game: self.game_config(),
            parallel: self.parallel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EvolutionConfig::default();
        config.validate().unwrap();
        assert_eq!(config.elite_count(), 1);
        assert_eq!(config.game_config().max_moves, 60);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let cases = [
            (
                EvolutionConfig {
                    population_size: 1,
                    ..Default::default()
                },
                ConfigError::PopulationSize(1),
            ),
            (
                EvolutionConfig {
                    generations: 0,
                    ..Default::default()
                },
                ConfigError::Generations(0),
            ),
            (
                EvolutionConfig {
                    depth: 0,
                    ..Default::default()
                },
                ConfigError::Depth(0),
            ),
            (
                EvolutionConfig {
                    elite_fraction: 1.5,
                    ..Default::default()
                },
                ConfigError::EliteFraction(1.5),
            ),
            (
                EvolutionConfig {
                    mutation_rate: -0.1,
                    ..Default::default()
                },
                ConfigError::MutationRate(-0.1),
            ),
            (
                EvolutionConfig {
                    mutation_magnitude: -1.0,
                    ..Default::default()
                },
                ConfigError::MutationMagnitude(-1.0),
            ),
            (
                EvolutionConfig {
                    max_moves: 0,
                    ..Default::default()
                },
                ConfigError::MaxMoves(0),
            ),
            (
                EvolutionConfig {
                    tournament_size: 7,
                    ..Default::default()
                },
                ConfigError::TournamentSize {
                    tournament_size: 7,
                    population_size: 6,
                },
            ),
            (
                EvolutionConfig {
                    init_noise: f32::NAN,
                    ..Default::default()
                },
                ConfigError::InitNoise(f32::NAN),
            ),
        ];
        for (config, expected) in cases {
            let err = config.validate().unwrap_err();
            // NaN never compares equal, so compare the rendered message
            assert_eq!(err.to_string(), expected.to_string());
        }
    }

    #[test]
    fn test_elite_count_rounds_down() {
        let config = EvolutionConfig {
            population_size: 10,
            elite_fraction: 0.29,
            ..Default::default()
        };
        assert_eq!(config.elite_count(), 2);
        let all = EvolutionConfig {
            elite_fraction: 1.0,
            ..Default::default()
        };
        assert_eq!(all.elite_count(), 6);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: EvolutionConfig =
            serde_json::from_str(r#"{ "generations": 10, "parallel": false }"#).unwrap();
        assert_eq!(
            config,
            EvolutionConfig {
                generations: 10,
                parallel: false,
                ..Default::default()
            }
        );
        let json = serde_json::to_string(&config).unwrap();
        let back: EvolutionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
