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
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use aniharvest::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Pages to enumerate: {}", config.catalog.page_count);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let config: Config = toml::from_str(&content)?;

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
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
[catalog]
list-url = "https://myanimelist.net/topanime.php"
page-count = 400
page-size = 50

[fetch]
max-retries = 5
first-pass-workers = 8
retry-workers = 1
jitter-max-ms = 3000

[storage]
root = "./htmls"
list-path = "./anime_url_list.txt"
reviews-root = "./reviews"

[http]
agent-name = "aniharvest"
agent-version = "1.0"
timeout-secs = 30
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.catalog.page_count, 400);
        assert_eq!(config.catalog.page_size, 50);
        assert_eq!(config.fetch.max_retries, 5);
        assert_eq!(config.storage.root, "./htmls");
        assert_eq!(config.http.agent_name, "aniharvest");
    }

    #[test]
    fn test_defaults_applied() {
        // Reviews section and most fetch knobs omitted entirely
        let config_content = r#"
[catalog]
list-url = "https://myanimelist.net/topanime.php"
page-count = 10

[fetch]

[storage]
root = "./htmls"
list-path = "./list.txt"

[http]
agent-name = "aniharvest"
agent-version = "1.0"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.catalog.page_size, 50);
        assert_eq!(config.fetch.max_retries, 5);
        assert_eq!(config.fetch.retry_workers, 1);
        assert_eq!(config.reviews.limit, 5);
        assert_eq!(config.reviews.initial_wait_secs, 90);
        assert_eq!(config.reviews.wait_increment_secs, 30);
        assert_eq!(config.storage.reviews_root, "./reviews");
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("this is not [valid toml");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config_content = r#"
[catalog]
list-url = "https://myanimelist.net/topanime.php"
page-count = 0

[fetch]

[storage]
root = "./htmls"
list-path = "./list.txt"

[http]
agent-name = "aniharvest"
agent-version = "1.0"
"#;

        let file = create_temp_config(config_content);
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
