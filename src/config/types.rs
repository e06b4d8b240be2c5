use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Talent-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub migrate: MigrateConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
}

impl Config {
    /// Returns the immutable credential for this run
    pub fn credential(&self) -> Credential {
        Credential {
            client_id: self.migrate.client_id.clone(),
            client_secret: self.migrate.client_secret.clone(),
            tenant: self.migrate.tenant.clone(),
            hostname: self.migrate.hostname.clone(),
            username: self.migrate.username.clone(),
            password: self.migrate.password.clone(),
        }
    }

    /// Root of the mirror tree
    pub fn apps_dir(&self) -> PathBuf {
        PathBuf::from(&self.migrate.apps_dir)
    }
}

/// Connection and output settings, one flat table
#[derive(Clone, Deserialize)]
pub struct MigrateConfig {
    pub client_id: String,
    pub client_secret: String,
    pub tenant: String,
    pub hostname: String,
    pub username: String,
    pub password: String,
    pub apps_dir: String,

    /// Accepted for compatibility with existing config files; not used
    #[serde(default)]
    pub userkey: Option<String>,

    /// Host of the identity provider
    #[serde(default = "default_signin_host")]
    pub signin_host: String,
}

impl fmt::Debug for MigrateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrateConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant", &self.tenant)
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("apps_dir", &self.apps_dir)
            .field("signin_host", &self.signin_host)
            .finish()
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// TCP connect timeout (seconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Wall-clock budget for one application branch (seconds)
    #[serde(default = "default_branch_timeout")]
    pub branch_timeout_secs: u64,

    /// Number of application branches walked at the same time
    #[serde(default = "default_concurrency")]
    pub max_concurrent_applications: usize,

    /// Maximum relation nesting below an application
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn branch_timeout(&self) -> Duration {
        Duration::from_secs(self.branch_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            branch_timeout_secs: default_branch_timeout(),
            max_concurrent_applications: default_concurrency(),
            max_depth: default_max_depth(),
        }
    }
}

/// Client credentials and account identity, fixed for the lifetime of a run
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub client_id: String,
    pub client_secret: String,
    pub tenant: String,
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant", &self.tenant)
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn default_signin_host() -> String {
    "signin.ultipro.com".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_branch_timeout() -> u64 {
    900
}

fn default_concurrency() -> usize {
    1
}

fn default_max_depth() -> u32 {
    32
}
