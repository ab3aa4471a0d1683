use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheBackend;
    use crate::model::DetailLevel;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[search]
endpoint = "https://search.example.com/html/"
max-pages = 2
page-size = 20

[http]
timeout-secs = 5
max-retries = 2
backoff-base-ms = 100
backoff-max-ms = 1000

[politeness]
robots-agent = "TestBot"
min-domain-interval-ms = 250

[cache]
enabled = false
ttl-secs = 60
backend = "sqlite"
path = "./cache.db"

[pipeline]
level = "high"
results = 8
subpages = 3
workers = 6
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.search.endpoint, "https://search.example.com/html/");
        assert_eq!(config.search.max_pages, 2);
        assert_eq!(config.http.max_retries, 2);
        assert_eq!(config.politeness.robots_agent, "TestBot");
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.backend, CacheBackend::Sqlite);
        assert_eq!(config.pipeline.level, DetailLevel::High);
        assert_eq!(config.pipeline.workers, 6);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.pipeline.level, DetailLevel::Medium);
        assert_eq!(config.pipeline.results, 5);
        assert_eq!(config.pipeline.subpages, 2);
        assert_eq!(config.pipeline.workers, 4);
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.politeness.min_domain_interval_ms, 1000);
        assert!(config.politeness.respect_robots);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = parse_config("[http]\nmax-retries = 1\n").unwrap();
        assert_eq!(config.http.max_retries, 1);
        assert_eq!(config.http.timeout_secs, 15);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/plethora.toml"));
        assert!(matches!(result.unwrap_err(), ConfigError::Io(_)));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_level_is_parse_error() {
        let result = parse_config("[pipeline]\nlevel = \"extreme\"\n");
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let result = parse_config("[pipeline]\nworkers = 0\n");
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }
}
