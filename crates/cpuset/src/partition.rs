//! # Cpuset Partition Module
//!
//! Lifecycle of a single cgroup-v2 cpuset partition: a directory under the
//! cgroup mount that is turned into a partition root with an exclusive CPU
//! list, receives one process and is removed again afterwards.

use crate::error::{CpusetError, Result};
use crate::filesystem::{FileSystem, RealFileSystem};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";
pub const PARTITION_FILE: &str = "cpuset.cpus.partition";
pub const EXCLUSIVE_CPUS_FILE: &str = "cpuset.cpus.exclusive";
pub const PROCS_FILE: &str = "cgroup.procs";

/// Value written to [`PARTITION_FILE`] to claim the CPUs exclusively.
pub const PARTITION_ROOT: &str = "root";

#[derive(Default)]
pub struct CpusetPartitionBuilder {
    name: Option<String>,
    cpus: Option<String>,
    root: Option<PathBuf>,
    fs: Option<Box<dyn FileSystem>>,
}

impl CpusetPartitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fs<F: FileSystem + 'static>(mut self, fs: F) -> Self {
        self.fs = Some(Box::new(fs));
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// CPU list in kernel range syntax, e.g. `1-2,4`. Written verbatim.
    pub fn cpus(mut self, cpus: &str) -> Self {
        self.cpus = Some(cpus.to_string());
        self
    }

    pub fn root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn build(self) -> Result<CpusetPartition> {
        let name = self
            .name
            .ok_or_else(|| CpusetError::InvalidName("cpuset name is required".to_string()))?;
        validate_name(&name)?;
        // an empty exclusive list would release every CPU the partition holds
        let cpus = self
            .cpus
            .filter(|cpus| !cpus.is_empty())
            .ok_or_else(|| CpusetError::MissingCpus(name.clone()))?;
        let root = self
            .root
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CGROUP_ROOT));
        Ok(CpusetPartition {
            path: root.join(&name),
            name,
            cpus,
            fs: self.fs.unwrap_or_else(|| Box::new(RealFileSystem)),
        })
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(CpusetError::InvalidName(format!(
            "'{}' is not a single directory name",
            name
        )));
    }
    Ok(())
}

pub struct CpusetPartition {
    name: String,
    cpus: String,
    path: PathBuf,
    fs: Box<dyn FileSystem>,
}

impl CpusetPartition {
    pub fn build() -> CpusetPartitionBuilder {
        CpusetPartitionBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cpus(&self) -> &str {
        &self.cpus
    }

    /// Directory backing the partition, `<root>/<name>`.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the partition directory and claim the CPUs.
    ///
    /// An already existing directory is reused. The partition mode is written
    /// before the CPU list; a failure in either write is returned immediately
    /// and nothing is rolled back.
    pub fn create(&self) -> Result<()> {
        info!(cpuset = %self.name, cpus = %self.cpus, "Creating cpuset partition");

        match self.fs.create_dir(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                info!(path = %self.path.display(), "Reusing existing cpuset directory");
            }
            Err(source) => {
                return Err(CpusetError::Setup {
                    path: self.path.clone(),
                    source,
                })
            }
        }

        self.write_control(PARTITION_FILE, PARTITION_ROOT)?;
        self.write_control(EXCLUSIVE_CPUS_FILE, &self.cpus)?;

        info!(cpuset = %self.name, cpus = %self.cpus, "Created cpuset partition");
        Ok(())
    }

    /// Move `pid` (with all its threads) into the partition.
    pub fn add_process(&self, pid: u32) -> Result<()> {
        self.fs
            .write(&self.path.join(PROCS_FILE), pid.to_string().as_bytes())
            .map_err(|source| CpusetError::Assign { pid, source })?;
        info!(pid, cpuset = %self.name, "Added process to cpuset");
        Ok(())
    }

    /// Remove the partition directory. A missing directory is not an error.
    pub fn delete(&self) -> Result<()> {
        if !self.fs.exists(&self.path) {
            info!(cpuset = %self.name, "Cpuset does not exist, nothing to delete");
            return Ok(());
        }

        self.fs
            .remove_dir(&self.path)
            .map_err(|source| CpusetError::Teardown {
                path: self.path.clone(),
                source,
            })?;
        info!(cpuset = %self.name, "Deleted cpuset partition");
        Ok(())
    }

    /// Partition state as reported by the kernel, e.g. `root` or
    /// `root invalid (Cpu list in cpuset.cpus not exclusive)`.
    pub fn partition_mode(&self) -> Result<String> {
        let path = self.path.join(PARTITION_FILE);
        self.fs
            .read_to_string(&path)
            .map(|mode| mode.trim().to_string())
            .map_err(|source| CpusetError::Setup { path, source })
    }

    /// Create the partition and hand back a guard that deletes it again.
    ///
    /// Nothing needs releasing when creation fails, so no guard is returned
    /// in that case.
    pub fn acquire(&self) -> Result<PartitionGuard<'_>> {
        self.create()?;
        Ok(PartitionGuard {
            partition: self,
            released: false,
        })
    }

    fn write_control(&self, file: &str, value: &str) -> Result<()> {
        let path = self.path.join(file);
        self.fs
            .write(&path, value.as_bytes())
            .map_err(|source| CpusetError::Setup { path, source })
    }
}

/// Keeps a created partition alive; deletes it on [`release`] or drop.
///
/// Teardown failures are logged and swallowed so they never replace the
/// outcome of the work done inside the partition.
///
/// [`release`]: PartitionGuard::release
pub struct PartitionGuard<'a> {
    partition: &'a CpusetPartition,
    released: bool,
}

impl PartitionGuard<'_> {
    pub fn add_process(&self, pid: u32) -> Result<()> {
        self.partition.add_process(pid)
    }

    pub fn release(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.partition.delete() {
            error!(error = %e, "Error deleting cpuset");
        }
    }
}

impl Drop for PartitionGuard<'_> {
    fn drop(&mut self) {
        self.teardown();
    }
}
