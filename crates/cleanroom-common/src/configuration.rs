use config::ConfigError;
use serde::de::DeserializeOwned;
use std::convert::TryInto;
use std::env;
use std::path::{Path, PathBuf};

/// Load settings from `CONFIG_PATH` (default `./configuration`) for the
/// environment named by `APP_ENVIRONMENT` (default `local`).
///
/// Both `base.yaml` and `<environment>.yaml` are optional, so a missing
/// configuration directory yields the type's serde defaults.
pub fn get_configuration<T: DeserializeOwned>() -> Result<T, ConfigError> {
    let configuration_directory = match env::var("CONFIG_PATH") {
        Ok(path) => PathBuf::from(path),
        Err(_) => env::current_dir()
            .map_err(|e| {
                ConfigError::Message(format!("Failed to determine the current directory: {}", e))
            })?
            .join("configuration"),
    };

    let environment: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(ConfigError::Message)?;

    load_configuration(&configuration_directory, &environment)
}

pub fn load_configuration<T: DeserializeOwned>(
    configuration_directory: &Path,
    environment: &Environment,
) -> Result<T, ConfigError> {
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        // allow to overwrite configuration explicitly with environment variables
        // APP_CPUSET__CPUS=3-4 to update cpuset.cpus
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<T>()
}

#[derive(Debug, PartialEq)]
pub enum Environment {
    Local,
    Production,
    CI,
}

impl Environment {
    /// Convert the enum instance to a static string reference.
    ///
    /// # Returns
    ///
    /// This method returns a static string slice that corresponds to the variant of the `Environment` enum.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
            Environment::CI => "ci",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    /// Try to convert a string to an `Environment` variant.
    /// Case insensitive matching is performed and only "local", "ci", and "production" are accepted.
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            "ci" => Ok(Self::CI),
            other => Err(format!(
                "{} is not a supported environment. Use either `local`, `ci` or `production`.",
                other
            )),
        }
    }
}
