//! Read-only views of the host, for troubleshooting a partition that did not
//! come up as expected. Nothing here is part of a run.

use anyhow::{Context, Result};
use cpuset::FileSystem;
use std::path::{Path, PathBuf};
use sysinfo::System;

/// Every directory below `root`, sorted by path.
pub fn cgroup_tree(fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let children = fs
            .list_dirs(&dir)
            .with_context(|| format!("Failed to list {}", dir.display()))?;
        pending.extend(children.iter().cloned());
        found.extend(children);
    }
    found.sort();
    Ok(found)
}

pub fn print_cgroups(fs: &dyn FileSystem, root: &Path) -> Result<()> {
    if !fs.exists(root) {
        println!("Cgroup directory {} does not exist.", root.display());
        return Ok(());
    }
    println!("printing cgroups...");
    for dir in cgroup_tree(fs, root)? {
        println!("{}", dir.display());
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub command: String,
}

/// All processes visible to us, sorted by pid.
pub fn list_processes() -> Vec<ProcessEntry> {
    let mut system = System::new();
    system.refresh_processes();

    let mut processes: Vec<ProcessEntry> = system
        .processes()
        .iter()
        .map(|(pid, process)| ProcessEntry {
            pid: pid.as_u32(),
            command: process.name().to_string(),
        })
        .collect();
    processes.sort_by_key(|p| p.pid);
    processes
}

pub fn print_processes() {
    println!("printing processes...");
    println!("{:>8} {:<20}", "PID", "COMMAND");
    for process in list_processes() {
        println!("{:>8} {:<20}", process.pid, process.command);
    }
}
