use crate::cpus::{parse_cpu_spec, CpuSpec};
use crate::runner::RunRequest;
use clap::Parser;
use std::path::PathBuf;

/// Run a command pinned to an exclusive cgroup-v2 cpuset partition
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Name of the cpuset to create [default: cleanroom]
    #[arg(long)]
    pub cpuset: Option<String>,

    /// CPUs to reserve exclusively, e.g. '1-2,4,6-8' [default: 1-2]
    #[arg(long, value_parser = parse_cpu_spec)]
    pub cpus: Option<CpuSpec>,

    /// Root of the cgroup-v2 hierarchy [default: /sys/fs/cgroup]
    #[arg(long = "cgroup-root")]
    pub cgroup_root: Option<PathBuf>,

    /// Milliseconds to wait after creating the partition before starting the
    /// executable [default: 500]
    #[arg(long = "settle-ms")]
    pub settle_ms: Option<u64>,

    /// Print every cgroup under the cgroup root and exit
    #[arg(long)]
    pub list_cgroups: bool,

    /// Print the host's processes and exit
    #[arg(long)]
    pub list_processes: bool,

    /// The executable to run, followed by its arguments
    #[arg(
        value_name = "EXECUTABLE",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required_unless_present_any = ["list_cgroups", "list_processes"]
    )]
    pub command: Vec<String>,
}

impl Args {
    pub fn diagnostics_only(&self) -> bool {
        self.list_cgroups || self.list_processes
    }

    /// Executable and forwarded arguments, if a command was given.
    pub fn request(&self) -> Option<RunRequest> {
        let (executable, args) = self.command.split_first()?;
        Some(RunRequest {
            executable: executable.clone(),
            args: args.to_vec(),
        })
    }
}
