use std::path::PathBuf;

use chrono::Utc;
use evochess_engine::Winner;
use evochess_training::tournament::{self, GameConfig};

use crate::{
    schema::record::{PlayerInfo, RecordedGame},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Model file for White; the default genome plays if omitted
    #[arg(long)]
    white: Option<PathBuf>,
    /// Model file for Black; the default genome plays if omitted
    #[arg(long)]
    black: Option<PathBuf>,
    /// Search depth in plies for both sides
    #[arg(long, default_value_t = 2)]
    depth: u32,
    /// Plies after which the game is stopped as a draw
    #[arg(long, default_value_t = 100)]
    max_moves: usize,
    /// Output file path for the game record
    #[arg(long)]
    output: Option<PathBuf>,
}

fn load_player(path: Option<&PathBuf>) -> anyhow::Result<PlayerInfo> {
    let Some(path) = path else {
        return Ok(PlayerInfo::default_genome());
    };
    let model = util::read_model_file(path)?;
    eprintln!(
        "Loaded model {} (fitness {:.3}, trained at {} with depth {})",
        model.name, model.final_fitness, model.trained_at, model.config.depth
    );
    Ok(PlayerInfo {
        name: model.name,
        genome: model.genome,
    })
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let white = load_player(arg.white.as_ref())?;
    let black = load_player(arg.black.as_ref())?;
    let config = GameConfig {
        depth: arg.depth,
        max_moves: arg.max_moves,
    };

    eprintln!(
        "{} (white) vs {} (black), depth {}",
        white.name, black.name, config.depth
    );
    let result = tournament::play_game(&white.genome, &black.genome, &config)?;

    for (i, pair) in result.moves.chunks(2).enumerate() {
        match pair {
            [w, b] => eprintln!("{:3}. {w} {b}", i + 1),
            [w] => eprintln!("{:3}. {w}", i + 1),
            _ => unreachable!(),
        }
    }
    let winner = match result.winner {
        Winner::White => white.name.as_str(),
        Winner::Black => black.name.as_str(),
        Winner::Draw => "nobody",
    };
    eprintln!(
        "Result: {} after {} plies, won by {winner}",
        result.termination, result.plies
    );

    let record = RecordedGame {
        recorded_at: Utc::now(),
        white,
        black,
        depth: config.depth,
        max_moves: config.max_moves,
        result,
    };
    Output::save_json(&record, arg.output.clone())?;
    if let Some(path) = &arg.output {
        eprintln!("Game record saved to {}", path.display());
    }

    Ok(())
}
