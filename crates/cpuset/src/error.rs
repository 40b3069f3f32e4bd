use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CpusetError {
    #[error("Invalid cpuset name: {0}")]
    InvalidName(String),

    #[error("No CPUs given for cpuset '{0}'")]
    MissingCpus(String),

    #[error("Failed to set up cpuset partition at {}: {source}", .path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to add process {pid} to cpuset: {source}")]
    Assign {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("Failed to delete cpuset partition at {}: {source}", .path.display())]
    Teardown {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CpusetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CpusetError::Setup {
            path: PathBuf::from("/sys/fs/cgroup/cleanroom/cpuset.cpus.exclusive"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to set up cpuset partition at /sys/fs/cgroup/cleanroom/cpuset.cpus.exclusive: Permission denied"
        );

        let err = CpusetError::Assign {
            pid: 42,
            source: io::Error::new(io::ErrorKind::NotFound, "No such process"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to add process 42 to cpuset: No such process"
        );

        assert_eq!(
            CpusetError::MissingCpus("cleanroom".into()).to_string(),
            "No CPUs given for cpuset 'cleanroom'"
        );
    }
}
