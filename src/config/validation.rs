use crate::config::types::{Config, CrawlerConfig, MigrateConfig};
use crate::ConfigError;

const MAX_CONCURRENT_APPLICATIONS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_migrate_config(&config.migrate)?;
    validate_crawler_config(&config.crawler)?;
    Ok(())
}

fn validate_migrate_config(config: &MigrateConfig) -> Result<(), ConfigError> {
    for (key, value) in [
        ("client_id", &config.client_id),
        ("client_secret", &config.client_secret),
        ("tenant", &config.tenant),
        ("apps_dir", &config.apps_dir),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
        }
    }

    validate_host("hostname", &config.hostname)?;
    validate_host("signin_host", &config.signin_host)?;

    if config.tenant.contains('/') {
        return Err(ConfigError::Validation(format!(
            "tenant must not contain '/', got '{}'",
            config.tenant
        )));
    }

    Ok(())
}

/// Hosts are bare authorities; the scheme is always https
fn validate_host(key: &str, host: &str) -> Result<(), ConfigError> {
    if host.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
    }

    if host.contains("://") || host.contains('/') {
        return Err(ConfigError::Validation(format!(
            "{} must be a bare host name without scheme or path, got '{}'",
            key, host
        )));
    }

    if host.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "{} contains whitespace: '{}'",
            key, host
        )));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    for (key, value) in [
        ("request-timeout-secs", config.request_timeout_secs),
        ("connect-timeout-secs", config.connect_timeout_secs),
        ("branch-timeout-secs", config.branch_timeout_secs),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{} must be >= 1", key)));
        }
    }

    if config.max_concurrent_applications < 1
        || config.max_concurrent_applications > MAX_CONCURRENT_APPLICATIONS
    {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-applications must be between 1 and {}, got {}",
            MAX_CONCURRENT_APPLICATIONS, config.max_concurrent_applications
        )));
    }

    if config.max_depth == 0 {
        return Err(ConfigError::Validation(
            "max-depth must be >= 1".to_string(),
        ));
    }

    Ok(())
}
