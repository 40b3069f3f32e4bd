pub mod arg;
pub mod cpus;
pub mod diagnostics;
pub mod error;
pub mod runner;
pub mod settings;

// re-export
pub use arg::Args;
pub use cpus::{CpuSpec, ValidationError};
pub use error::{Error, Result};
pub use runner::{RunOutput, RunRequest, Runner};
pub use settings::Settings;
