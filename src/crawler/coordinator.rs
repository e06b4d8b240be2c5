//! Harvest coordinator - run-level orchestration
//!
//! Sign in once, build the authenticated fetcher and the mirror, then hand
//! the root collection to the [`GraphWalker`]. Sign-in happens before any
//! directory is created, so a rejected credential leaves no trace on disk.

use crate::auth::TokenProvider;
use crate::config::Config;
use crate::crawler::endpoints::Endpoints;
use crate::crawler::fetcher::{build_http_client, ResourceFetcher};
use crate::crawler::walker::{GraphWalker, WalkOptions};
use crate::mirror::Mirror;
use crate::output::EventSink;
use crate::HarvestError;

/// Runs a complete harvest
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `endpoints` - Identity and API base URLs, usually [`Endpoints::from_config`]
/// * `sink` - Receives every branch-level event
///
/// # Returns
///
/// * `Ok(usize)` - Number of applications in the root collection
/// * `Err(HarvestError)` - Sign-in or the root collection fetch failed
///
/// # Example
///
/// ```no_run
/// use talent_harvest::config::load_config;
/// use talent_harvest::crawler::{harvest, Endpoints};
/// use talent_harvest::output::StatsCollector;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("migrate.toml"))?;
/// let stats = StatsCollector::new();
/// harvest(&config, &Endpoints::from_config(&config), &stats).await?;
/// println!("{:?}", stats.finish());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(
    config: &Config,
    endpoints: &Endpoints,
    sink: &dyn EventSink,
) -> Result<usize, HarvestError> {
    let credential = config.credential();
    let client = build_http_client(&config.crawler)?;

    tracing::info!(tenant = %credential.tenant, "Signing in");
    let token = TokenProvider::new(client.clone(), endpoints.token_url(&credential.tenant))
        .sign_in(&credential)
        .await?;

    let fetcher = ResourceFetcher::new(client, token)
        .with_download_timeout(config.crawler.branch_timeout());
    let mirror = Mirror::new(config.apps_dir());
    let walker = GraphWalker::new(&fetcher, &mirror, sink, WalkOptions::from(&config.crawler));

    let collection_url = endpoints.applications_url(&credential.tenant);
    tracing::info!(url = %collection_url, output = %mirror.root().display(), "Starting harvest");

    walker.run(&collection_url).await
}
