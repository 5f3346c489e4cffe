use clap::{Parser, Subcommand};

use self::{play::PlayArg, replay::ReplayArg, train::TrainArg};

mod play;
mod replay;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve evaluation genomes with a genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Play one game between two genomes
    Play(#[clap(flatten)] PlayArg),
    /// Print the positions of a recorded game
    Replay(#[clap(flatten)] ReplayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
    }
    Ok(())
}
