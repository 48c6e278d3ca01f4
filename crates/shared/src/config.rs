use std::path::PathBuf;

use thiserror::Error;

use crate::config_env::{
    optional_trimmed_env, parse_positive_f64_env, parse_u32_env, parse_u64_env, parse_url_env,
};
use crate::dictionaries::default_data_dir;
use crate::providers::geocoder::{
    DEFAULT_GEOCODER_TIMEOUT_MS, DEFAULT_GEOCODER_URL, DEFAULT_GEOCODER_USER_AGENT,
    NominatimConfig,
};
use crate::providers::imgw::{
    DEFAULT_IMGW_BASE_URL, DEFAULT_IMGW_MAX_RETRIES, DEFAULT_IMGW_RETRY_BASE_BACKOFF_MS,
    DEFAULT_IMGW_TIMEOUT_MS, ImgwConfig,
};
use crate::resolver::{DEFAULT_MAX_DISTANCE_KM, ResolverSettings};
use crate::service::{DEFAULT_MAX_RETRIES, DialogueSettings};
use crate::session_store::{DEFAULT_SESSION_PRUNE_INTERVAL_SECONDS, DEFAULT_SESSION_TTL_SECONDS};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub session_ttl_seconds: u64,
    pub session_prune_interval_seconds: u64,
    pub max_retries: u32,
    pub nearest_station_max_distance_km: f64,
    pub geocoder: NominatimConfig,
    pub imgw: ImgwConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid positive number in env var {0}")]
    ParseFloat(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to load .env file: {0}")]
    Dotenv(String),
}

impl AssistantConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let session_prune_interval_seconds = parse_u64_env(
            "SESSION_PRUNE_INTERVAL_SECONDS",
            DEFAULT_SESSION_PRUNE_INTERVAL_SECONDS,
        )?;
        if session_prune_interval_seconds == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "SESSION_PRUNE_INTERVAL_SECONDS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_addr: optional_trimmed_env("API_BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            data_dir: optional_trimmed_env("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            session_ttl_seconds: parse_u64_env("SESSION_TTL_SECONDS", DEFAULT_SESSION_TTL_SECONDS)?,
            session_prune_interval_seconds,
            max_retries: parse_u32_env("DIALOGUE_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            nearest_station_max_distance_km: parse_positive_f64_env(
                "NEAREST_STATION_MAX_DISTANCE_KM",
                DEFAULT_MAX_DISTANCE_KM,
            )?,
            geocoder: NominatimConfig {
                search_url: parse_url_env("GEOCODER_URL", DEFAULT_GEOCODER_URL)?,
                user_agent: optional_trimmed_env("GEOCODER_USER_AGENT")
                    .unwrap_or_else(|| DEFAULT_GEOCODER_USER_AGENT.to_string()),
                timeout_ms: parse_u64_env("GEOCODER_TIMEOUT_MS", DEFAULT_GEOCODER_TIMEOUT_MS)?,
            },
            imgw: ImgwConfig {
                base_url: parse_url_env("IMGW_BASE_URL", DEFAULT_IMGW_BASE_URL)?,
                timeout_ms: parse_u64_env("IMGW_TIMEOUT_MS", DEFAULT_IMGW_TIMEOUT_MS)?,
                max_retries: parse_u32_env("IMGW_MAX_RETRIES", DEFAULT_IMGW_MAX_RETRIES)?,
                retry_base_backoff_ms: parse_u64_env(
                    "IMGW_RETRY_BASE_BACKOFF_MS",
                    DEFAULT_IMGW_RETRY_BASE_BACKOFF_MS,
                )?,
            },
        })
    }

    pub fn dialogue_settings(&self) -> DialogueSettings {
        DialogueSettings {
            max_retries: self.max_retries,
            resolver: ResolverSettings {
                max_distance_km: self.nearest_station_max_distance_km,
            },
        }
    }
}

/// Loads `.env` from the working directory when present.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err.to_string())),
    }
}
