use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use evochess_evaluator::genome::GENE_LABELS;
use evochess_training::{
    config::EvolutionConfig,
    evolution::{EvolutionLoop, GenerationStats},
};

use crate::{
    schema::model::ChessModel,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Evolution parameters (JSON); the flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    population_size: Option<usize>,
    #[arg(long)]
    generations: Option<usize>,
    /// Search depth in plies
    #[arg(long)]
    depth: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    /// Plies after which a game is stopped as a draw
    #[arg(long)]
    max_moves: Option<usize>,
    #[arg(long)]
    elite_fraction: Option<f64>,
    #[arg(long)]
    mutation_rate: Option<f64>,
    #[arg(long)]
    mutation_magnitude: Option<f32>,
    /// Play tournament games on a single thread
    #[arg(long)]
    sequential: bool,
    /// Start from a population snapshot instead of a random population
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Name stored in the model file
    #[arg(long, default_value = "champion")]
    name: String,
    /// Output file path for the champion model
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output file path for the full evolution history
    #[arg(long)]
    history: Option<PathBuf>,
    /// Output file path for the final population snapshot
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn build_config(arg: &TrainArg) -> anyhow::Result<EvolutionConfig> {
    let mut config = match &arg.config {
        Some(path) => util::read_json_file("evolution config", path)?,
        None => EvolutionConfig::default(),
    };
    if let Some(population_size) = arg.population_size {
        config.population_size = population_size;
    }
    if let Some(generations) = arg.generations {
        config.generations = generations;
    }
    if let Some(depth) = arg.depth {
        config.depth = depth;
    }
    if let Some(seed) = arg.seed {
        config.seed = seed;
    }
    if let Some(max_moves) = arg.max_moves {
        config.max_moves = max_moves;
    }
    if let Some(elite_fraction) = arg.elite_fraction {
        config.elite_fraction = elite_fraction;
    }
    if let Some(mutation_rate) = arg.mutation_rate {
        config.mutation_rate = mutation_rate;
    }
    if let Some(mutation_magnitude) = arg.mutation_magnitude {
        config.mutation_magnitude = mutation_magnitude;
    }
    if arg.sequential {
        config.parallel = false;
    }
    Ok(config)
}

fn build_loop(arg: &TrainArg, mut config: EvolutionConfig) -> anyhow::Result<EvolutionLoop> {
    let Some(path) = &arg.resume else {
        return Ok(EvolutionLoop::new(config)?);
    };
    let snapshot = util::read_snapshot_file(path)?;
    if arg.population_size.is_none() {
        config.population_size = snapshot.genomes.len();
    }
    eprintln!(
        "Resuming from {} ({} genomes after {} generations)",
        path.display(),
        snapshot.genomes.len(),
        snapshot.generation
    );
    EvolutionLoop::with_population(config, snapshot.genomes)
        .with_context(|| format!("Failed to resume from {}", path.display()))
}

fn print_generation(stats: &GenerationStats) {
    eprintln!("Generation #{}:", stats.generation);

    eprintln!("  Individuals (rank: genome):");
    for (rank, ind) in stats.population.iter().enumerate() {
        eprintln!(
            "  {rank:2}: {:2} {:.3?} => {:.3}",
            ind.index,
            ind.genome.genes(),
            ind.fitness
        );
    }

    #[expect(clippy::cast_precision_loss)]
    let gene_norm_std_dev_mean = stats
        .gene_stats
        .iter()
        .map(|s| s.normalized_std_dev)
        .sum::<f32>()
        / stats.gene_stats.len() as f32;
    eprintln!("  Gene Stats:");
    eprintln!(
        "    Min:        {:.3?}",
        stats.gene_stats.iter().map(|s| s.min).collect::<Vec<_>>(),
    );
    eprintln!(
        "    Max:        {:.3?}",
        stats.gene_stats.iter().map(|s| s.max).collect::<Vec<_>>(),
    );
    eprintln!(
        "    Mean:       {:.3?}",
        stats.gene_stats.iter().map(|s| s.mean).collect::<Vec<_>>(),
    );
    eprintln!(
        "    NormStddev: {:.3?}",
        stats
            .gene_stats
            .iter()
            .map(|s| s.normalized_std_dev)
            .collect::<Vec<_>>(),
    );
    eprintln!("    => Mean:    {gene_norm_std_dev_mean:.3}");

    eprintln!("  Fitness Stats:");
    eprintln!("    Min:  {:.3}", stats.worst_fitness);
    eprintln!("    Max:  {:.3}", stats.best_fitness);
    eprintln!("    Mean: {:.3}", stats.average_fitness);

    let decisive = stats
        .games
        .iter()
        .filter(|g| !g.result.termination.is_draw())
        .count();
    eprintln!("  Games: {} ({decisive} decisive)", stats.games.len());
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = build_config(arg)?;
    let mut evolution = build_loop(arg, config)?;
    let config = evolution.config().clone();
    eprintln!(
        "Training {} genomes for {} generations at depth {} (seed {})",
        config.population_size, config.generations, config.depth, config.seed
    );

    while let Some(stats) = evolution.step()? {
        print_generation(stats);
    }

    let history = evolution.history();
    let champion = history
        .champion()
        .context("evolution finished without evaluating a generation")?;

    eprintln!("Champion:");
    for (label, gene) in GENE_LABELS.iter().zip(champion.genome.genes()) {
        eprintln!("  {label:16} {gene:.3}");
    }

    let model = ChessModel {
        name: arg.name.clone(),
        trained_at: Utc::now(),
        final_fitness: champion.fitness,
        genome: champion.genome,
        config,
    };
    Output::save_json(&model, arg.output.clone())?;

    if let Some(path) = &arg.history {
        Output::save_json(history, Some(path.clone()))?;
        eprintln!("History saved to {}", path.display());
    }
    if let Some(path) = &arg.snapshot {
        Output::save_json(&evolution.snapshot(), Some(path.clone()))?;
        eprintln!("Population snapshot saved to {}", path.display());
    }

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Final fitness: {:.3}", model.final_fitness);

    Ok(())
}
