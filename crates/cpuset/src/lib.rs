pub mod error;
pub mod filesystem;
pub mod partition;

#[cfg(test)]
mod partition_test;

pub use error::{CpusetError, Result};
pub use filesystem::{FileSystem, MemoryFileSystem, Operation, RealFileSystem};
pub use partition::{CpusetPartition, CpusetPartitionBuilder, PartitionGuard, DEFAULT_CGROUP_ROOT};
