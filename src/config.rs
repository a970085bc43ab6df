use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::kernel::roster::BodySpec;
use crate::kernel::time::TICK_MS;

pub const CONFIG_ENV: &str = "MELEE_CONFIG";
pub const TICK_ENV: &str = "MELEE_TICK_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config")]
    Parse(#[from] serde_json::Error),

    #[error("tick interval must be at least 1ms")]
    ZeroInterval,

    #[error("{var} must be a whole number of milliseconds, got {value:?}")]
    InvalidOverride { var: &'static str, value: String },
}

/// Everything a session needs that stays fixed while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_ms: u64,
    pub bodies: Vec<BodySpec>,
    pub attack_damage: u32,
    pub heal_amount: u32,
    pub echo_stdout: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            bodies: vec![
                BodySpec::player("player", 10),
                BodySpec::ai("dave", 10),
                BodySpec::ai("mark", 10),
                BodySpec::ai("carl", 10),
            ],
            attack_damage: 5,
            heal_amount: 3,
            echo_stdout: true,
        }
    }
}

impl SchedulerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Defaults, then the file named by `MELEE_CONFIG`, then `MELEE_TICK_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };

        if let Ok(value) = std::env::var(TICK_ENV) {
            config.tick_ms = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride { var: TICK_ENV, value })?;
        }

        config.validate()?;
        Ok(config)
    }
}
