use std::env;

use crate::config::ConfigError;

pub(crate) fn parse_u32_env(key: &str, default: u32) -> Result<u32, ConfigError> {
    match optional_trimmed_env(key) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ConfigError::ParseInt(key.to_string())),
        None => Ok(default),
    }
}

pub(crate) fn parse_u64_env(key: &str, default: u64) -> Result<u64, ConfigError> {
    match optional_trimmed_env(key) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| ConfigError::ParseInt(key.to_string())),
        None => Ok(default),
    }
}

pub(crate) fn parse_positive_f64_env(key: &str, default: f64) -> Result<f64, ConfigError> {
    let Some(raw) = optional_trimmed_env(key) else {
        return Ok(default);
    };

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(ConfigError::ParseFloat(key.to_string())),
    }
}

pub(crate) fn parse_url_env(key: &str, default: &str) -> Result<String, ConfigError> {
    let url = optional_trimmed_env(key).unwrap_or_else(|| default.to_string());
    validate_http_url(key, &url)?;
    Ok(url)
}

pub(crate) fn validate_http_url(key: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(());
    }

    Err(ConfigError::InvalidConfiguration(format!(
        "{key} must start with http:// or https://"
    )))
}

pub(crate) fn optional_trimmed_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
