use chrono::{DateTime, Utc};
use evochess_evaluator::genome::Genome;
use evochess_training::config::EvolutionConfig;
use serde::{Deserialize, Serialize};

/// A trained genome with the run that produced it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChessModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Tournament score of the genome in the last generation.
    pub final_fitness: f32,
    pub genome: Genome,
    pub config: EvolutionConfig,
}
