//! Output module for harvest events and summaries
//!
//! This module handles:
//! - The event vocabulary the walker reports through
//! - Logging events at the right level
//! - Accumulating and printing run statistics

pub mod stats;
mod traits;

pub use stats::{print_summary, StatsCollector};
pub use traits::{EventSink, HarvestEvent, HarvestSummary, SkipReason};
