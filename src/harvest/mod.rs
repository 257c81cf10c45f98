//! Harvest module: the paginated post walk
//!
//! This module contains the core download logic, including:
//! - Resolving harvester defaults and per-run overrides
//! - Walking backwards through a blog with the `before_id` cursor
//! - Pinned-post handling
//! - Duplicate detection and stop conditions
//! - Per-page progress events

mod harvester;
mod options;
mod pinned;
mod progress;

pub use harvester::{HarvestOutcome, Harvester, StopReason};
pub use options::{HarvestDefaults, HarvestOptions, RunSettings};
pub use pinned::{PinnedPolicy, PinnedSplit, RepeatedPinnedFilter, TreatPinnedNormally};
pub use progress::{HarvestProgress, ProgressFn};
