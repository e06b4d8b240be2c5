//! Crawler module for walking the recruiting resource graph
//!
//! This module contains the core harvesting logic, including:
//! - Authenticated fetching (required root, best-effort links, downloads)
//! - Attachment/container/leaf classification
//! - The depth-first work stack and visited set
//! - Overall harvest coordination

mod classifier;
mod coordinator;
mod endpoints;
mod fetcher;
mod frontier;
mod walker;

pub use classifier::{classify, extract_links, is_attachment, Link, NodeKind, DOWNLOAD_REL};
pub use coordinator::harvest;
pub use endpoints::Endpoints;
pub use fetcher::{build_http_client, DownloadResult, Fetch, FetchOutcome, ResourceFetcher};
pub use frontier::{Frontier, Task};
pub use walker::{application_id, GraphWalker, WalkOptions};
