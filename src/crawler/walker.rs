//! Resource-graph walker
//!
//! For every application in the root collection the walker:
//! 1. Writes `application.json` before anything else in that branch
//! 2. Classifies the application and seeds a [`Frontier`] with its links
//! 3. Pops tasks until the frontier is empty: fetch a link, persist what it
//!    returns under a directory named after the relation, classify it, then
//!    either download its payload or push its own links
//!
//! Only the root collection fetch can fail the run. Everything that goes wrong
//! inside a branch is reported to the [`EventSink`] and the branch carries on
//! or is pruned.

use crate::config::CrawlerConfig;
use crate::crawler::classifier::{classify, Link, NodeKind};
use crate::crawler::fetcher::{Fetch, FetchOutcome};
use crate::crawler::frontier::{Frontier, Task};
use crate::mirror::{Mirror, APPLICATION_FILE};
use crate::output::{EventSink, HarvestEvent, SkipReason};
use crate::schema::{self, EntityKind};
use crate::url::{sanitize_segment, upgrade_to_https};
use crate::HarvestError;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Instrument;

/// Limits applied to a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// Links deeper than this below an application are not followed
    pub max_depth: u32,
    /// Application branches walked at the same time
    pub max_concurrent_applications: usize,
    /// Wall-clock budget per application branch
    pub branch_timeout: Duration,
}

impl From<&CrawlerConfig> for WalkOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_concurrent_applications: config.max_concurrent_applications,
            branch_timeout: config.branch_timeout(),
        }
    }
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

/// Drives fetch, classify and persist over the resource graph
///
/// The walker holds the run context explicitly: the fetcher (which owns the
/// bearer token), the mirror (which owns the output root) and the event sink.
pub struct GraphWalker<'a, F: Fetch + ?Sized> {
    fetcher: &'a F,
    mirror: &'a Mirror,
    sink: &'a dyn EventSink,
    options: WalkOptions,
}

impl<'a, F: Fetch + ?Sized> GraphWalker<'a, F> {
    pub fn new(
        fetcher: &'a F,
        mirror: &'a Mirror,
        sink: &'a dyn EventSink,
        options: WalkOptions,
    ) -> Self {
        Self {
            fetcher,
            mirror,
            sink,
            options,
        }
    }

    /// Walks every application in the collection at `collection_url`
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of entries in the root collection
    /// * `Err(HarvestError)` - The root collection could not be fetched, was
    ///   not an array, or the output root could not be created
    pub async fn run(&self, collection_url: &str) -> Result<usize, HarvestError> {
        let collection = self.fetcher.fetch_required(collection_url).await?;
        let Value::Array(applications) = collection else {
            return Err(HarvestError::UnexpectedCollection {
                url: collection_url.to_string(),
            });
        };

        let total = applications.len();
        tracing::info!(applications = total, "Fetched application collection");

        self.mirror.ensure_dir(self.mirror.root()).await?;

        stream::iter(applications.into_iter().enumerate())
            .for_each_concurrent(self.options.max_concurrent_applications, |(index, app)| {
                self.walk_application_bounded(index, app)
            })
            .await;

        Ok(total)
    }

    async fn walk_application_bounded(&self, index: usize, application: Value) {
        let label = application_id(&application).unwrap_or_else(|| format!("#{}", index));
        let span = tracing::info_span!("application", id = %label);

        let walk = self.walk_application(index, application).instrument(span);
        if tokio::time::timeout(self.options.branch_timeout, walk)
            .await
            .is_err()
        {
            self.sink.record(HarvestEvent::BranchTimedOut {
                application: label,
                budget: self.options.branch_timeout,
            });
        }
    }

    /// Persists one application and walks everything reachable from it
    pub async fn walk_application(&self, index: usize, application: Value) {
        let Some(id) = application_id(&application) else {
            self.sink.record(HarvestEvent::ApplicationSkipped {
                index,
                reason: "missing id".to_string(),
            });
            return;
        };

        let dir = self.mirror.application_dir(&id);
        let path = dir.join(APPLICATION_FILE);
        if let Err(e) = self.mirror.write_json(&path, &application).await {
            self.sink.record(HarvestEvent::WriteFailed {
                application: id,
                path,
                reason: e.to_string(),
            });
            return;
        }
        self.sink.record(HarvestEvent::ApplicationPersisted {
            application: id.clone(),
            path,
        });
        self.check_shape(&id, EntityKind::Application, &application);

        let mut frontier = Frontier::new();
        self.expand(&id, &application, &dir, None, "", 0, &mut frontier)
            .await;

        while let Some(task) = frontier.pop() {
            match task {
                Task::Follow {
                    link,
                    parent_dir,
                    parent_stem,
                    depth,
                } => {
                    self.follow(
                        &id,
                        link,
                        &parent_dir,
                        parent_stem.as_deref(),
                        depth,
                        &mut frontier,
                    )
                    .await
                }
                Task::Expand {
                    node,
                    dir,
                    stem,
                    rel,
                    depth,
                } => {
                    let path = dir.join(format!("{}.json", stem));
                    if let Err(e) = self.mirror.write_json(&path, &node).await {
                        self.sink.record(HarvestEvent::WriteFailed {
                            application: id.clone(),
                            path,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                    self.sink.record(HarvestEvent::NodePersisted {
                        application: id.clone(),
                        rel: rel.clone(),
                        path,
                    });
                    if let Some(kind) = EntityKind::for_rel(&rel) {
                        self.check_shape(&id, kind, &node);
                    }
                    self.expand(
                        &id,
                        &node,
                        &dir,
                        Some(stem.as_str()),
                        &rel,
                        depth,
                        &mut frontier,
                    )
                    .await;
                }
            }
        }

        tracing::debug!(visited = frontier.visited_count(), "Application walk complete");
    }

    /// Acts on a persisted resource according to its classification
    #[allow(clippy::too_many_arguments)]
    async fn expand(
        &self,
        application: &str,
        node: &Value,
        dir: &Path,
        stem: Option<&str>,
        rel: &str,
        depth: u32,
        frontier: &mut Frontier,
    ) {
        match classify(node) {
            NodeKind::Attachment {
                file_name,
                download: Some(link),
            } => {
                self.download_attachment(application, &file_name, &link, dir, rel)
                    .await
            }
            NodeKind::Attachment {
                file_name,
                download: None,
            } => self.sink.record(HarvestEvent::AttachmentSkipped {
                application: application.to_string(),
                file_name,
            }),
            NodeKind::Container { links } => {
                frontier.push_in_order(links.into_iter().map(|link| Task::Follow {
                    link,
                    parent_dir: dir.to_path_buf(),
                    parent_stem: stem.map(str::to_string),
                    depth: depth + 1,
                }))
            }
            NodeKind::Leaf => {}
        }
    }

    /// Fetches one link and queues whatever it resolves to
    #[allow(clippy::too_many_arguments)]
    async fn follow(
        &self,
        application: &str,
        link: Link,
        parent_dir: &Path,
        parent_stem: Option<&str>,
        depth: u32,
        frontier: &mut Frontier,
    ) {
        let skip = |reason: SkipReason| HarvestEvent::LinkSkipped {
            application: application.to_string(),
            rel: link.rel.clone(),
            href: link.href.clone(),
            reason,
        };

        let Some(href) = link.href.as_deref() else {
            self.sink.record(skip(SkipReason::MissingHref));
            return;
        };
        if depth > self.options.max_depth {
            self.sink.record(skip(SkipReason::DepthExceeded(depth)));
            return;
        }
        let url = match upgrade_to_https(href) {
            Ok(url) => url,
            Err(e) => {
                self.sink.record(skip(SkipReason::InvalidUrl(e.to_string())));
                return;
            }
        };
        if !frontier.mark_visited(&url, &link.rel) {
            self.sink.record(skip(SkipReason::AlreadyVisited));
            return;
        }

        tracing::debug!(rel = %link.rel, %url, "Following link");

        let value = match self.fetcher.fetch_optional(url.as_str()).await {
            FetchOutcome::Found(value) => value,
            FetchOutcome::Absent { status, reason } => {
                self.sink.record(HarvestEvent::LinkPruned {
                    application: application.to_string(),
                    rel: link.rel.clone(),
                    href: url.to_string(),
                    status,
                    reason,
                });
                return;
            }
        };

        let dir = Mirror::relation_dir(parent_dir, &link.rel);
        match value {
            Value::Array(items) => {
                let tasks: Vec<Task> = items
                    .into_iter()
                    .enumerate()
                    .filter(|(_, node)| node.is_object())
                    .map(|(i, node)| Task::Expand {
                        stem: node_stem(&node, parent_stem, Some(i)),
                        node,
                        dir: dir.clone(),
                        rel: link.rel.clone(),
                        depth,
                    })
                    .collect();
                frontier.push_in_order(tasks);
            }
            node @ Value::Object(_) => frontier.push(Task::Expand {
                stem: node_stem(&node, parent_stem, None),
                node,
                dir,
                rel: link.rel.clone(),
                depth,
            }),
            _ => tracing::debug!(rel = %link.rel, %url, "Link resolved to a scalar, ignoring"),
        }
    }

    /// Streams an attachment's payload to `{dir}/{file_name}`
    async fn download_attachment(
        &self,
        application: &str,
        file_name: &str,
        link: &Link,
        dir: &Path,
        rel: &str,
    ) {
        let failed = |href: String, reason: String| HarvestEvent::DownloadFailed {
            application: application.to_string(),
            rel: link.rel.clone(),
            descriptor_rel: rel.to_string(),
            href,
            reason,
        };

        let href = link.href.clone().unwrap_or_default();
        let url = match upgrade_to_https(&href) {
            Ok(url) => url,
            Err(e) => {
                self.sink.record(failed(href, e.to_string()));
                return;
            }
        };

        let dest: PathBuf = dir.join(sanitize_segment(file_name, "attachment"));
        let mut writer = match self.mirror.create_binary(&dest).await {
            Ok(writer) => writer,
            Err(e) => {
                self.sink.record(failed(url.to_string(), e.to_string()));
                return;
            }
        };

        tracing::debug!(%url, path = %dest.display(), "Downloading attachment");

        match self.fetcher.download(url.as_str(), &mut writer).await {
            Ok(result) => match writer.commit().await {
                Ok(written) => self.sink.record(HarvestEvent::AttachmentDownloaded {
                    application: application.to_string(),
                    rel: rel.to_string(),
                    href: url.to_string(),
                    path: written.path,
                    bytes: written.bytes,
                    status: result.status,
                    sha256: written.sha256,
                }),
                Err(e) => self.sink.record(failed(url.to_string(), e.to_string())),
            },
            Err(e) => {
                if let Err(cleanup) = writer.discard().await {
                    tracing::debug!(error = %cleanup, "Failed to remove partial download");
                }
                self.sink.record(failed(url.to_string(), e.to_string()));
            }
        }
    }

    fn check_shape(&self, application: &str, kind: EntityKind, node: &Value) {
        if let Err(mismatch) = schema::validate(kind, node) {
            self.sink.record(HarvestEvent::ShapeMismatch {
                application: application.to_string(),
                entity: mismatch.entity.to_string(),
                reason: mismatch.reason,
            });
        }
    }
}

/// Identifier of a root application: a non-empty string or a number
pub fn application_id(application: &Value) -> Option<String> {
    match application.get("id")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// File stem for a resource snapshot: its id, else a positional name
///
/// Siblings share a parent directory, so an id-less resource is prefixed with
/// the stem of the resource that linked to it to keep its path unique.
fn node_stem(node: &Value, parent_stem: Option<&str>, index: Option<usize>) -> String {
    let position = match index {
        Some(i) => format!("resource-{}", i),
        None => "resource".to_string(),
    };
    let fallback = match parent_stem {
        Some(parent) => format!("{}.{}", parent, position),
        None => position,
    };

    match node.get("id") {
        Some(Value::String(id)) => sanitize_segment(id, &fallback),
        Some(Value::Number(id)) => id.to_string(),
        _ => fallback,
    }
}
