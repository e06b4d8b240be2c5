//! Statistics collection from harvest events
//!
//! [`StatsCollector`] is the stock [`EventSink`]: it logs every event at the
//! level its failure kind calls for and keeps running totals.

use crate::output::traits::{EventSink, HarvestEvent, HarvestSummary};
use chrono::Utc;
use std::sync::{Mutex, PoisonError};

/// Logs events and accumulates a [`HarvestSummary`]
#[derive(Debug)]
pub struct StatsCollector {
    summary: Mutex<HarvestSummary>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            summary: Mutex::new(HarvestSummary::new()),
        }
    }

    /// Current totals
    pub fn snapshot(&self) -> HarvestSummary {
        self.summary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stamps the finish time and returns the final totals
    pub fn finish(&self) -> HarvestSummary {
        let mut summary = self.summary.lock().unwrap_or_else(PoisonError::into_inner);
        summary.finished_at = Some(Utc::now());
        summary.clone()
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for StatsCollector {
    fn record(&self, event: HarvestEvent) {
        log_event(&event);

        let mut summary = self.summary.lock().unwrap_or_else(PoisonError::into_inner);
        match event {
            HarvestEvent::ApplicationPersisted { .. } => summary.applications_persisted += 1,
            HarvestEvent::ApplicationSkipped { .. } => summary.applications_skipped += 1,
            HarvestEvent::NodePersisted { .. } => summary.nodes_persisted += 1,
            HarvestEvent::LinkPruned { .. } => summary.links_pruned += 1,
            HarvestEvent::LinkSkipped { .. } => summary.links_skipped += 1,
            HarvestEvent::AttachmentDownloaded { bytes, .. } => {
                summary.attachments_downloaded += 1;
                summary.bytes_downloaded += bytes;
            }
            HarvestEvent::AttachmentSkipped { .. } => summary.attachments_skipped += 1,
            HarvestEvent::DownloadFailed { .. } => summary.downloads_failed += 1,
            HarvestEvent::ShapeMismatch { .. } => summary.shape_mismatches += 1,
            HarvestEvent::BranchTimedOut { .. } => summary.branches_timed_out += 1,
            HarvestEvent::WriteFailed { .. } => summary.writes_failed += 1,
        }
    }
}

fn log_event(event: &HarvestEvent) {
    match event {
        HarvestEvent::ApplicationPersisted { application, path } => {
            tracing::info!(%application, path = %path.display(), "Application saved");
        }
        HarvestEvent::ApplicationSkipped { index, reason } => {
            tracing::warn!(index, %reason, "Skipping application");
        }
        HarvestEvent::NodePersisted {
            application,
            rel,
            path,
        } => {
            tracing::debug!(%application, %rel, path = %path.display(), "Resource saved");
        }
        HarvestEvent::LinkPruned {
            application,
            rel,
            href,
            status,
            reason,
        } => {
            tracing::info!(%application, %rel, %href, ?status, %reason, "Link unavailable, pruning branch");
        }
        HarvestEvent::LinkSkipped {
            application,
            rel,
            href,
            reason,
        } => {
            tracing::trace!(%application, %rel, ?href, %reason, "Link skipped");
        }
        HarvestEvent::AttachmentDownloaded {
            application,
            rel,
            path,
            bytes,
            sha256,
            ..
        } => {
            tracing::info!(
                %application,
                %rel,
                path = %path.display(),
                bytes,
                %sha256,
                "Attachment downloaded"
            );
        }
        HarvestEvent::AttachmentSkipped {
            application,
            file_name,
        } => {
            tracing::warn!(%application, %file_name, "Attachment has no Download link");
        }
        HarvestEvent::DownloadFailed {
            application,
            rel,
            descriptor_rel,
            href,
            reason,
        } => {
            tracing::warn!(
                %application,
                %rel,
                %descriptor_rel,
                %href,
                %reason,
                "Attachment download failed"
            );
        }
        HarvestEvent::ShapeMismatch {
            application,
            entity,
            reason,
        } => {
            tracing::warn!(%application, %entity, %reason, "Unexpected payload shape");
        }
        HarvestEvent::BranchTimedOut {
            application,
            budget,
        } => {
            tracing::warn!(%application, ?budget, "Application branch exceeded its time budget");
        }
        HarvestEvent::WriteFailed {
            application,
            path,
            reason,
        } => {
            tracing::error!(%application, path = %path.display(), %reason, "Failed to write snapshot");
        }
    }
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &HarvestSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Run:");
    println!("  Started: {}", summary.started_at.to_rfc3339());
    if let Some(finished) = summary.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = summary.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!();

    println!("Mirrored:");
    println!("  Applications: {}", summary.applications_persisted);
    println!("  Linked resources: {}", summary.nodes_persisted);
    println!(
        "  Attachments: {} ({} bytes)",
        summary.attachments_downloaded, summary.bytes_downloaded
    );
    println!();

    if summary.total_gaps() > 0 || summary.shape_mismatches > 0 {
        println!("Gaps:");
        for (label, count) in [
            ("Applications without id", summary.applications_skipped),
            ("Links pruned", summary.links_pruned),
            ("Attachments without Download link", summary.attachments_skipped),
            ("Downloads failed", summary.downloads_failed),
            ("Branches timed out", summary.branches_timed_out),
            ("Writes failed", summary.writes_failed),
            ("Shape mismatches (advisory)", summary.shape_mismatches),
        ] {
            if count > 0 {
                println!("  {}: {}", label, count);
            }
        }
        println!();
    }
}
