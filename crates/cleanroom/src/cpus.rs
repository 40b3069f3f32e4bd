use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("CPUs cannot be empty")]
    Empty,

    #[error("Invalid CPU format '{0}'. Expected format: '1-2,4,6-8'")]
    Format(String),
}

/// A CPU list in the kernel's range syntax, e.g. `1-2,4,6-8`.
///
/// Every comma separated token is either an index or two indices joined by a
/// single hyphen. The text is kept exactly as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuSpec(String);

impl CpuSpec {
    pub fn parse(spec: &str) -> Result<Self, ValidationError> {
        if spec.is_empty() {
            return Err(ValidationError::Empty);
        }
        if !spec.split(',').all(is_valid_token) {
            return Err(ValidationError::Format(spec.to_string()));
        }
        Ok(Self(spec.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Largest CPU index named anywhere in the list.
    pub fn highest_cpu(&self) -> Option<u64> {
        self.0
            .split(|c| c == ',' || c == '-')
            .filter_map(|index| index.parse::<u64>().ok())
            .max()
    }

    /// Whether every index named is below `cpu_count`.
    pub fn fits(&self, cpu_count: usize) -> bool {
        self.highest_cpu()
            .map_or(true, |highest| highest < cpu_count as u64)
    }
}

fn is_index(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn is_valid_token(token: &str) -> bool {
    match token.split_once('-') {
        Some((start, end)) => is_index(start) && is_index(end),
        None => is_index(token),
    }
}

/// clap value parser for `--cpus`.
pub fn parse_cpu_spec(spec: &str) -> Result<CpuSpec, ValidationError> {
    CpuSpec::parse(spec)
}

impl fmt::Display for CpuSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
