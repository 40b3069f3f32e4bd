use crate::error::{Error, Result};
use cpuset::CpusetPartition;
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, info_span, warn};

/// The executable to start inside the partition, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub executable: String,
    pub args: Vec<String>,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub pid: u32,
    pub stdout: String,
    pub stderr: String,
    /// Whether the child actually ended up inside the partition.
    pub assigned: bool,
}

/// Runs one child process on a freshly created cpuset partition.
///
/// The sequence is create, settle, spawn, assign, wait, delete. Once the
/// partition exists it is deleted on every path out of [`Runner::run`].
pub struct Runner {
    partition: CpusetPartition,
    settle_delay: Duration,
}

impl Runner {
    pub fn new(partition: CpusetPartition, settle_delay: Duration) -> Self {
        Self {
            partition,
            settle_delay,
        }
    }

    pub fn run(&self, request: &RunRequest) -> Result<RunOutput> {
        let span = info_span!(
            "run",
            cpuset = %self.partition.name(),
            executable = %request.executable
        );
        let _enter = span.enter();

        let guard = self.partition.acquire()?;
        match self.partition.partition_mode() {
            Ok(mode) => debug!(%mode, "Partition state after creation"),
            Err(e) => debug!(error = %e, "Could not read partition state"),
        }

        self.settle();

        let child = Command::new(&request.executable)
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                executable: request.executable.clone(),
                source,
            })?;
        let pid = child.id();
        info!(pid, "Spawned child process");

        let assigned = match guard.add_process(pid) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Child keeps running outside the cpuset");
                false
            }
        };

        // drains stdout and stderr concurrently, then reaps the child
        let output = child
            .wait_with_output()
            .map_err(|source| Error::Wait { pid, source })?;
        let code = exit_code(output.status);
        info!(pid, code, "Child process exited");

        guard.release();

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if code != 0 {
            return Err(Error::Child { code, stderr });
        }

        Ok(RunOutput {
            pid,
            stdout,
            stderr,
            assigned,
        })
    }

    fn settle(&self) {
        if self.settle_delay.is_zero() {
            return;
        }
        // TODO: replace with a check that no foreign task is still scheduled
        // on the reserved CPUs
        info!(
            delay_ms = self.settle_delay.as_millis() as u64,
            "Sleeping to let processes be descheduled off of target CPUs"
        );
        thread::sleep(self.settle_delay);
    }
}

/// Exit code of the child; signal deaths map to `128 + signal` like a shell.
fn exit_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}
