use chrono::{DateTime, Utc};
use evochess_evaluator::genome::Genome;
use evochess_training::tournament::GameResult;
use serde::{Deserialize, Serialize};

/// A single recorded game, as written by `play` and read by `replay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedGame {
    /// Timestamp when the game was played (ISO 8601 format)
    pub recorded_at: DateTime<Utc>,
    pub white: PlayerInfo,
    pub black: PlayerInfo,
    pub depth: u32,
    pub max_moves: usize,
    #[serde(flatten)]
    pub result: GameResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Model name, or `default` for the untrained genome
    pub name: String,
    pub genome: Genome,
}

impl PlayerInfo {
    pub fn default_genome() -> Self {
        Self {
            name: "default".to_owned(),
            genome: Genome::default(),
        }
    }
}
