use crate::cpus::ValidationError;
use cpuset::CpusetError;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Partition(#[from] CpusetError),

    #[error("Failed to spawn '{executable}': {source}")]
    Spawn {
        executable: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to collect output of process {pid}: {source}")]
    Wait {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("Child process exited with status {code}")]
    Child { code: i32, stderr: String },
}

impl Error {
    /// Status the tool exits with when this error ends the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Child { code, .. } => *code,
            Error::Validation(_)
            | Error::Partition(CpusetError::InvalidName(_) | CpusetError::MissingCpus(_)) => 2,
            _ => 1,
        }
    }
}
