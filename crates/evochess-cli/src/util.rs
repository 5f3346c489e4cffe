use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use evochess_training::evolution::PopulationSnapshot;

use crate::schema::{model::ChessModel, record::RecordedGame};

/// JSON destination: a file, or stdout when no path is given.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Pretty-prints `value` to `output_path`, or to stdout if it is `None`.
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match output_path {
            Some(path) => {
                let file = File::create(&path).with_context(|| {
                    format!("Failed to create output file: {}", path.display())
                })?;
                Output::File {
                    writer: BufWriter::new(file),
                    path,
                }
            }
            None => Output::Stdout(io::stdout().lock()),
        };
        output.write_json(value)
    }

    fn target(&self) -> String {
        match self {
            Output::Stdout(_) => "stdout".to_owned(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let target = self.target();
        serde_json::to_writer_pretty(&mut *self, value)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(self))
            .and_then(|()| self.flush())
            .with_context(|| format!("Failed to write JSON to {target}"))
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(writer) => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(writer) => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Parses the JSON file at `path`; `file_kind` names it in error messages.
pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

/// Read a trained model written by `train`
pub fn read_model_file<P>(path: P) -> anyhow::Result<ChessModel>
where
    P: AsRef<Path>,
{
    read_json_file("model", path)
}

/// Read a population snapshot to resume training from
pub fn read_snapshot_file<P>(path: P) -> anyhow::Result<PopulationSnapshot>
where
    P: AsRef<Path>,
{
    read_json_file("population snapshot", path)
}

/// Read a game recorded by `play`
pub fn read_record_file<P>(path: P) -> anyhow::Result<RecordedGame>
where
    P: AsRef<Path>,
{
    read_json_file("game record", path)
}
