use crate::config::types::{ApiConfig, Config, FetchConfig, OutputConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_api_config(&config.api)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates endpoint configuration
fn validate_api_config(config: &ApiConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates pagination and pacing configuration
fn validate_fetch_config(config: &FetchConfig) -> ConfigResult<()> {
    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page_size must be >= 1, got {}",
            config.page_size
        )));
    }

    if config.max_empty_chunks < 1 {
        return Err(ConfigError::Validation(format!(
            "max_empty_chunks must be >= 1, got {}",
            config.max_empty_chunks
        )));
    }

    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint_interval must be >= 1, got {}",
            config.checkpoint_interval
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.dump_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "dump_path cannot be empty".to_string(),
        ));
    }

    if config.dump_path.file_name().is_none() {
        return Err(ConfigError::Validation(format!(
            "dump_path '{}' must name a file",
            config.dump_path.display()
        )));
    }

    Ok(())
}
