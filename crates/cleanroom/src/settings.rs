use crate::arg::Args;
use crate::cpus::CpuSpec;
use crate::error::Result;
use cpuset::{CpusetPartition, DEFAULT_CGROUP_ROOT};
use serde_aux::field_attributes::deserialize_number_from_string;
use std::path::PathBuf;
use std::time::Duration;

#[derive(serde::Deserialize, Clone, Debug, Default)]
pub struct Settings {
    #[serde(default)]
    pub cpuset: CpusetSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CpusetSettings {
    pub name: String,
    pub cpus: String,
    pub cgroup_root: PathBuf,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub settle_delay_ms: u64,
}

impl Default for CpusetSettings {
    fn default() -> Self {
        Self {
            name: "cleanroom".to_string(),
            cpus: "1-2".to_string(),
            cgroup_root: PathBuf::from(DEFAULT_CGROUP_ROOT),
            settle_delay_ms: 500,
        }
    }
}

impl Settings {
    /// Command line flags win over configured values.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(name) = &args.cpuset {
            self.cpuset.name = name.clone();
        }
        if let Some(cpus) = &args.cpus {
            self.cpuset.cpus = cpus.to_string();
        }
        if let Some(root) = &args.cgroup_root {
            self.cpuset.cgroup_root = root.clone();
        }
        if let Some(settle_ms) = args.settle_ms {
            self.cpuset.settle_delay_ms = settle_ms;
        }
    }

    pub fn cpu_spec(&self) -> Result<CpuSpec> {
        Ok(CpuSpec::parse(&self.cpuset.cpus)?)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.cpuset.settle_delay_ms)
    }

    /// Partition on the host's cgroup hierarchy described by these settings.
    pub fn partition(&self) -> Result<CpusetPartition> {
        let cpus = self.cpu_spec()?;
        let partition = CpusetPartition::build()
            .name(&self.cpuset.name)
            .cpus(cpus.as_str())
            .root(&self.cpuset.cgroup_root)
            .build()?;
        Ok(partition)
    }
}
