use crate::config::types::{
    CacheConfig, Config, HttpConfig, PipelineConfig, PolitenessConfig, SearchConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound on concurrent fetch workers
pub const MAX_WORKERS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_http_config(&config.http)?;
    validate_politeness_config(&config.politeness)?;
    validate_cache_config(&config.cache)?;
    validate_pipeline_config(&config.pipeline)?;
    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search endpoint: {}", e)))?;

    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Search endpoint must use http or https, got '{}'",
            config.endpoint
        )));
    }

    if config.max_pages < 1 || config.max_pages > 10 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and 10, got {}",
            config.max_pages
        )));
    }

    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page_size must be >= 1, got {}",
            config.page_size
        )));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.backoff_max_ms < config.backoff_base_ms {
        return Err(ConfigError::Validation(format!(
            "backoff_max_ms ({}) must be >= backoff_base_ms ({})",
            config.backoff_max_ms, config.backoff_base_ms
        )));
    }

    Ok(())
}

fn validate_politeness_config(config: &PolitenessConfig) -> Result<(), ConfigError> {
    // Robots agent tokens: non-empty, alphanumeric plus '-' and '_'
    if config.robots_agent.is_empty() {
        return Err(ConfigError::Validation(
            "robots_agent cannot be empty".to_string(),
        ));
    }

    if !config
        .robots_agent
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "robots_agent must contain only alphanumeric characters, '-' and '_', got '{}'",
            config.robots_agent
        )));
    }

    Ok(())
}

fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.enabled && config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "cache path cannot be empty when the cache is enabled".to_string(),
        ));
    }

    Ok(())
}

/// Validates run defaults; the same bounds apply to command-line overrides
pub fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.results < 1 {
        return Err(ConfigError::Validation(format!(
            "results must be >= 1, got {}",
            config.results
        )));
    }

    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    Ok(())
}
