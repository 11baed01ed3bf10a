//! Errors surfaced by the `curlfield` binary.
//!
//! Each variant maps to a process exit code so scripts can tell a rejected
//! configuration apart from a filesystem problem. Clap's own parse errors exit
//! with 2 before any of this runs.

use curlfield_core::SimError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// The simulation rejected its configuration.
    #[error(transparent)]
    Sim(SimError),

    #[error("reading config {}: {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    ParseConfig {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("--dt must be finite and >= 0, got {0}")]
    InvalidDt(f64),

    #[error("writing snapshot: {0}")]
    Snapshot(String),

    #[error("serializing output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// 10 for simulation errors, 11 for filesystem errors, 12 for bad input,
    /// 13 for output serialization.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Sim(_) => 10,
            CliError::ReadConfig { .. } | CliError::Snapshot(_) => 11,
            CliError::ParseConfig { .. } | CliError::InvalidDt(_) => 12,
            CliError::Output(_) => 13,
        }
    }
}

impl From<SimError> for CliError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::Io(msg) => CliError::Snapshot(msg),
            other => CliError::Sim(other),
        }
    }
}
