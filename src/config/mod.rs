//! Configuration module for Talent-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use talent_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("migrate.toml")).unwrap();
//! println!("Tenant: {}", config.migrate.tenant);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, Credential, MigrateConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
