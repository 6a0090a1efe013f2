use crate::engine::DEFAULT_PERIODS_PER_YEAR;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub events_path: PathBuf,
    pub output_dir: PathBuf,
    pub vol_lookback: usize,
    pub periods_per_year: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let events_path = env_map
            .get("EVENTS_PATH")
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnv("EVENTS_PATH".to_string()))?;

        let output_dir = env_map
            .get("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let vol_lookback = env_map
            .get("VOL_LOOKBACK")
            .map(|s| s.as_str())
            .unwrap_or("20")
            .parse::<usize>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "VOL_LOOKBACK".to_string(),
                    "must be a non-negative integer".to_string(),
                )
            })?;

        let periods_per_year = match env_map.get("PERIODS_PER_YEAR") {
            None => DEFAULT_PERIODS_PER_YEAR,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "PERIODS_PER_YEAR".to_string(),
                        format!("must be a positive integer, got {}", raw),
                    ))
                }
            },
        };

        Ok(Config {
            events_path,
            output_dir,
            vol_lookback,
            periods_per_year,
        })
    }
}
