use std::path::PathBuf;

use anyhow::Context as _;
use evochess_engine::ReplayLog;
use evochess_training::{
    evolution::EvolutionHistory,
    tournament::{EvalSnapshot, GameResult},
};

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub struct ReplayArg {
    /// Path to the game record written by `play` (JSON format)
    recording_file: PathBuf,
    /// Treat the file as an evolution history and replay a game of this
    /// generation
    #[arg(long)]
    generation: Option<usize>,
    /// Index of the game within the generation
    #[arg(long, default_value_t = 0, requires = "generation")]
    game: usize,
    /// Only print the position after this many plies
    #[arg(long)]
    ply: Option<usize>,
}

fn load_game(arg: &ReplayArg) -> anyhow::Result<(String, GameResult)> {
    let ReplayArg {
        recording_file,
        generation,
        game,
        ..
    } = arg;

    let Some(generation) = *generation else {
        let record = util::read_record_file(recording_file)?;
        let title = format!(
            "{} (white) vs {} (black) at depth {}, limit {} plies, recorded at {}",
            record.white.name,
            record.black.name,
            record.depth,
            record.max_moves,
            record.recorded_at
        );
        return Ok((title, record.result));
    };

    let history: EvolutionHistory = util::read_json_file("evolution history", recording_file)?;
    let stats = history
        .generations
        .into_iter()
        .find(|g| g.generation == generation)
        .with_context(|| format!("Generation {generation} not found in history"))?;
    let record = stats
        .games
        .get(*game)
        .cloned()
        .with_context(|| format!("Game {game} not found in generation {generation}"))?;
    let describe = |index: usize| {
        stats
            .population
            .iter()
            .position(|ind| ind.index == index)
            .map_or_else(
                || format!("genome {index}"),
                |rank| {
                    let fitness = stats.population[rank].fitness;
                    format!("genome {index} (rank {rank}, fitness {fitness:.3})")
                },
            )
    };
    let title = format!(
        "generation {generation}, {} as white vs {} as black",
        describe(record.white),
        describe(record.black)
    );
    Ok((title, record.result))
}

fn print_snapshot(snapshot: &EvalSnapshot) {
    println!(
        "Eval: white genome {:+.3}, black genome {:+.3}",
        snapshot.white_eval, snapshot.black_eval
    );
}

pub fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    eprintln!("Loading game from {}", arg.recording_file.display());
    let (title, result) = load_game(arg)?;
    let log = ReplayLog::from_moves(&result.moves).context("Recorded game is not legal")?;
    eprintln!("Loaded {title}: {} plies", log.plies());

    if let Some(ply) = arg.ply {
        anyhow::ensure!(
            ply <= log.plies(),
            "Ply {ply} is out of range (game has {} plies)",
            log.plies()
        );
    }

    for frame in log.frames() {
        if arg.ply.is_some_and(|ply| ply != frame.ply) {
            continue;
        }
        match frame.last_move {
            Some(mv) => println!("Ply {}: {mv}", frame.ply),
            None => println!("Ply 0: start"),
        }
        println!("{}", frame.board);
        println!("FEN: {}", frame.fen);
        if let Some(snapshot) = result.snapshots.iter().find(|s| s.ply == frame.ply) {
            print_snapshot(snapshot);
        }
        println!();
    }

    println!(
        "Result: {} by {} after {} plies",
        result.winner, result.termination, result.plies
    );
    Ok(())
}
