use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

use crate::core::constants::LOG_ENV;
use crate::core::message::{Role, Turn};

/// Install the stderr tracing subscriber. `DEEKSEEP_LOG` takes precedence;
/// otherwise `verbose` picks between `debug` and `warn` for this crate.
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "deekseep=debug"
    } else {
        "deekseep=warn"
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Plain-text conversation log. User turns are prefixed with `You: `,
/// assistant turns are written as-is, one blank line between turns.
pub struct TranscriptLog {
    file_path: PathBuf,
}

impl TranscriptLog {
    /// Fails early if the file cannot be created or appended to.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let file_path = path.into();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;
        file.flush()?;
        Ok(Self { file_path })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn log_turn(&self, turn: &Turn) -> io::Result<()> {
        match turn.role() {
            Role::User => self.write_block(&format!("You: {}", turn.content())),
            Role::Assistant => self.write_block(turn.content()),
            Role::System => Ok(()),
        }
    }

    fn write_block(&self, content: &str) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        let mut writer = BufWriter::new(file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        writeln!(writer)?;

        writer.flush()
    }
}
