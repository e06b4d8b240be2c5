//! Talent-Harvest: an applicant-tracking data mirror
//!
//! This crate signs in to a recruiting API once per run, walks the hypermedia
//! resource graph that hangs off the applications collection, and mirrors every
//! visited resource onto a local directory tree as JSON snapshots and downloaded
//! attachments.

pub mod auth;
pub mod config;
pub mod crawler;
pub mod mirror;
pub mod output;
pub mod schema;
pub mod url;

use thiserror::Error;

/// Main error type for Talent-Harvest operations
///
/// Only the variants returned from [`crawler::harvest`] abort a run. Failures
/// inside an application branch are reported through [`output::EventSink`].
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sign-in failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Failed to fetch root collection {url} (status {status:?}): {body}")]
    RootFetch {
        url: String,
        status: Option<u16>,
        body: String,
    },

    #[error("Root collection at {url} is not a JSON array")]
    UnexpectedCollection { url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl HarvestError {
    /// Name of the fatal failure kind, used in the final error message
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigError",
            Self::Auth(_) => "AuthFailure",
            Self::RootFetch { .. } | Self::UnexpectedCollection { .. } => "RootFetchFailure",
            Self::Io(_) => "IoError",
            Self::Http(_) => "HttpClientError",
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Identity endpoint errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("identity endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("identity response has no access_token field")]
    MissingToken,

    #[error("request to identity endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("identity response is not valid JSON: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

/// Attachment transfer errors (never fatal to a run)
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download returned HTTP {status}")]
    Status { status: u16 },

    #[error("download transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to write attachment: {0}")]
    Io(#[from] std::io::Error),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{harvest, GraphWalker};
pub use output::{HarvestEvent, HarvestSummary};
pub use url::upgrade_to_https;
