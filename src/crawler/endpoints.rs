use crate::config::Config;

/// Base URLs of the two services a harvest talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Identity provider, e.g. `https://signin.ultipro.com`
    pub signin_base: String,
    /// Recruiting API host, e.g. `https://service.example.com`
    pub api_base: String,
}

impl Endpoints {
    pub fn new(signin_base: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            signin_base: signin_base.into().trim_end_matches('/').to_string(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Production endpoints for a configuration; always https
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            format!("https://{}", config.migrate.signin_host),
            format!("https://{}", config.migrate.hostname),
        )
    }

    pub fn token_url(&self, tenant: &str) -> String {
        format!("{}/signin/oauth2/t/{}/access_token", self.signin_base, tenant)
    }

    /// The root collection every harvest starts from
    pub fn applications_url(&self, tenant: &str) -> String {
        format!(
            "{}/talent/recruiting/v2/{}/api/applications",
            self.api_base, tenant
        )
    }
}
