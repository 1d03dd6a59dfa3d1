use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use command_engine::SessionConfig;
use thiserror::Error;
use tracing::info;

pub(crate) const CONFIG_ENV_VAR: &str = "PROTOCMD_CONFIG";
pub(crate) const MAX_TICKS_ENV_VAR: &str = "PROTOCMD_MAX_TICKS";
pub(crate) const ECHO_ENV_VAR: &str = "PROTOCMD_ECHO";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoopConfig {
    pub(crate) max_ticks: Option<u64>,
    /// Print the active target after each effective tick.
    pub(crate) echo_positions: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_ticks: None,
            echo_positions: true,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to read session config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid session config {origin} at '{json_path}': {message}")]
    Parse {
        origin: String,
        json_path: String,
        message: String,
    },
    #[error("invalid {var} value '{value}' (expected u64)")]
    InvalidMaxTicks { var: &'static str, value: String },
    #[error("invalid {var} value '{value}' (expected on/off, true/false, 1/0)")]
    InvalidEcho { var: &'static str, value: String },
}

pub(crate) fn resolve_session_config() -> Result<SessionConfig, ConfigError> {
    match env::var(CONFIG_ENV_VAR) {
        Ok(value) => load_session_config(Path::new(&value)),
        Err(env::VarError::NotPresent) => {
            info!("session_config_defaults");
            Ok(SessionConfig::default())
        }
        Err(source) => Err(ConfigError::EnvVar {
            var: CONFIG_ENV_VAR,
            source,
        }),
    }
}

pub(crate) fn load_session_config(path: &Path) -> Result<SessionConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_session_config(&raw, &path.display().to_string())?;
    info!(
        path = %path.display(),
        target_count = config.targets.len(),
        "session_config_loaded"
    );
    Ok(config)
}

pub(crate) fn parse_session_config(raw: &str, origin: &str) -> Result<SessionConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, SessionConfig>(&mut deserializer).map_err(|error| {
        ConfigError::Parse {
            origin: origin.to_string(),
            json_path: error.path().to_string(),
            message: error.inner().to_string(),
        }
    })
}

pub(crate) fn resolve_loop_config() -> Result<LoopConfig, ConfigError> {
    let defaults = LoopConfig::default();
    let max_ticks = match env::var(MAX_TICKS_ENV_VAR) {
        Ok(value) => Some(parse_max_ticks(&value)?),
        Err(env::VarError::NotPresent) => defaults.max_ticks,
        Err(source) => {
            return Err(ConfigError::EnvVar {
                var: MAX_TICKS_ENV_VAR,
                source,
            })
        }
    };
    let echo_positions = match env::var(ECHO_ENV_VAR) {
        Ok(value) => parse_echo(&value)?,
        Err(env::VarError::NotPresent) => defaults.echo_positions,
        Err(source) => {
            return Err(ConfigError::EnvVar {
                var: ECHO_ENV_VAR,
                source,
            })
        }
    };
    Ok(LoopConfig {
        max_ticks,
        echo_positions,
    })
}

fn parse_echo(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidEcho {
            var: ECHO_ENV_VAR,
            value: value.to_string(),
        }),
    }
}

fn parse_max_ticks(value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidMaxTicks {
            var: MAX_TICKS_ENV_VAR,
            value: value.to_string(),
        })
}
