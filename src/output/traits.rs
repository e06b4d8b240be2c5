//! Event sink traits and types
//!
//! The walker never logs branch-level failures itself; it reports them as
//! [`HarvestEvent`]s to the sink it was given, and the sink decides how they
//! surface.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Why a link was not followed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The link has no href
    MissingHref,
    /// The href is not an absolute http(s) URL
    InvalidUrl(String),
    /// The (URL, relation) pair was already visited in this application's walk
    AlreadyVisited,
    /// The relation path is deeper than the configured maximum
    DepthExceeded(u32),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHref => write!(f, "missing href"),
            Self::InvalidUrl(e) => write!(f, "invalid URL: {}", e),
            Self::AlreadyVisited => write!(f, "already visited"),
            Self::DepthExceeded(depth) => write!(f, "depth {} exceeds limit", depth),
        }
    }
}

/// Something that happened during a harvest
#[derive(Debug, Clone, PartialEq)]
pub enum HarvestEvent {
    /// An application's `application.json` was written
    ApplicationPersisted { application: String, path: PathBuf },

    /// A root collection entry had no usable identifier
    ApplicationSkipped { index: usize, reason: String },

    /// A linked resource's snapshot was written
    NodePersisted {
        application: String,
        rel: String,
        path: PathBuf,
    },

    /// A link fetch failed and its branch was pruned
    LinkPruned {
        application: String,
        rel: String,
        href: String,
        status: Option<u16>,
        reason: String,
    },

    /// A link was deliberately not followed
    LinkSkipped {
        application: String,
        rel: String,
        href: Option<String>,
        reason: SkipReason,
    },

    /// An attachment payload was written to disk
    AttachmentDownloaded {
        application: String,
        rel: String,
        href: String,
        path: PathBuf,
        bytes: u64,
        status: u16,
        sha256: String,
    },

    /// An attachment descriptor had no usable `Download` link
    AttachmentSkipped {
        application: String,
        file_name: String,
    },

    /// An attachment transfer failed
    DownloadFailed {
        application: String,
        /// Relation of the failing link, normally `Download`
        rel: String,
        /// Relation the attachment descriptor was reached through
        descriptor_rel: String,
        href: String,
        reason: String,
    },

    /// A payload did not match its expected entity shape
    ShapeMismatch {
        application: String,
        entity: String,
        reason: String,
    },

    /// An application branch hit its wall-clock budget
    BranchTimedOut {
        application: String,
        budget: Duration,
    },

    /// A snapshot could not be written
    WriteFailed {
        application: String,
        path: PathBuf,
        reason: String,
    },
}

/// Receiver for harvest events
///
/// Implementations must be shareable across concurrently walked branches.
pub trait EventSink: Send + Sync {
    /// Records one event
    fn record(&self, event: HarvestEvent);
}

/// Summary statistics for a harvest
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    pub applications_persisted: u64,
    pub applications_skipped: u64,
    pub nodes_persisted: u64,
    pub attachments_downloaded: u64,
    pub bytes_downloaded: u64,

    pub links_pruned: u64,
    pub links_skipped: u64,
    pub attachments_skipped: u64,
    pub downloads_failed: u64,
    pub shape_mismatches: u64,
    pub branches_timed_out: u64,
    pub writes_failed: u64,
}

impl HarvestSummary {
    /// Creates an empty summary starting now
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: None,
            applications_persisted: 0,
            applications_skipped: 0,
            nodes_persisted: 0,
            attachments_downloaded: 0,
            bytes_downloaded: 0,
            links_pruned: 0,
            links_skipped: 0,
            attachments_skipped: 0,
            downloads_failed: 0,
            shape_mismatches: 0,
            branches_timed_out: 0,
            writes_failed: 0,
        }
    }

    /// Duration of a finished harvest in whole seconds
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Branch-level problems that left gaps in the mirror
    pub fn total_gaps(&self) -> u64 {
        self.links_pruned
            + self.attachments_skipped
            + self.downloads_failed
            + self.branches_timed_out
            + self.writes_failed
            + self.applications_skipped
    }
}

impl Default for HarvestSummary {
    fn default() -> Self {
        Self::new()
    }
}
