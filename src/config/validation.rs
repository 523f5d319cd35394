use crate::config::types::{CatalogConfig, Config, FetchConfig, ReviewsConfig, StorageConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_fetch_config(&config.fetch)?;
    validate_reviews_config(&config.reviews)?;
    validate_storage_config(&config.storage)?;
    validate_http_config(config)?;
    Ok(())
}

/// Validates catalog enumeration configuration
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    if config.list_url.is_empty() {
        return Err(ConfigError::Validation(
            "list_url cannot be empty".to_string(),
        ));
    }

    if !config.list_url.starts_with("http://") && !config.list_url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "list_url must be an absolute http(s) URL, got '{}'",
            config.list_url
        )));
    }

    if config.page_count < 1 || config.page_count > 1000 {
        return Err(ConfigError::Validation(format!(
            "page_count must be between 1 and 1000, got {}",
            config.page_count
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

/// Validates fetch and recovery configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.first_pass_workers < 1 || config.first_pass_workers > 100 {
        return Err(ConfigError::Validation(format!(
            "first_pass_workers must be between 1 and 100, got {}",
            config.first_pass_workers
        )));
    }

    if config.retry_workers < 1 {
        return Err(ConfigError::Validation(format!(
            "retry_workers must be >= 1, got {}",
            config.retry_workers
        )));
    }

    // Retry passes must not hit the server harder than the first pass did.
    if config.retry_workers > config.first_pass_workers {
        return Err(ConfigError::Validation(format!(
            "retry_workers ({}) must not exceed first_pass_workers ({})",
            config.retry_workers, config.first_pass_workers
        )));
    }

    if config.jitter_max_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "jitter_max_ms must be <= 60000, got {}",
            config.jitter_max_ms
        )));
    }

    Ok(())
}

/// Validates review fetching configuration
fn validate_reviews_config(config: &ReviewsConfig) -> Result<(), ConfigError> {
    if config.limit < 1 {
        return Err(ConfigError::Validation(format!(
            "reviews.limit must be >= 1, got {}",
            config.limit
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "reviews.max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.workers < 1 || config.workers > 100 {
        return Err(ConfigError::Validation(format!(
            "reviews.workers must be between 1 and 100, got {}",
            config.workers
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.root.is_empty() {
        return Err(ConfigError::Validation(
            "storage.root cannot be empty".to_string(),
        ));
    }

    if config.list_path.is_empty() {
        return Err(ConfigError::Validation(
            "storage.list_path cannot be empty".to_string(),
        ));
    }

    if config.reviews_root.is_empty() {
        return Err(ConfigError::Validation(
            "storage.reviews_root cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &Config) -> Result<(), ConfigError> {
    let http = &config.http;

    if http.agent_name.is_empty() {
        return Err(ConfigError::Validation(
            "agent_name cannot be empty".to_string(),
        ));
    }

    if !http
        .agent_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "agent_name must contain only alphanumeric characters and hyphens, got '{}'",
            http.agent_name
        )));
    }

    if http.timeout_secs < 1 || http.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 300, got {}",
            http.timeout_secs
        )));
    }

    Ok(())
}
