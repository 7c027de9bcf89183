//! Incremental review synchronization.
//!
//! # Module Structure
//!
//! - [`source`] - `ReviewSource`, the one-window-per-call fetch boundary
//! - [`cutoff`] - locating the watermark inside a descending batch
//! - [`accumulator`] - newest-first result collection
//! - [`engine`] - the pagination controller: `sync_reviews()`, `synchronize()`
//! - [`pacing`] - delay policy between batches
//! - [`progress`] - progress events: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`types`] - `SyncRequest`, `SyncOutcome`, constants

pub mod accumulator;
pub mod cutoff;
pub mod engine;
mod pacing;
mod progress;
pub mod source;
mod types;

pub use accumulator::ReviewAccumulator;
pub use cutoff::{Cutoff, detect_cutoff};
pub use engine::{sync_reviews, synchronize};
pub use pacing::Pacing;
pub use progress::{ProgressCallback, SyncProgress, emit};
pub use source::ReviewSource;
pub use types::{
    DEFAULT_PACE_MS, DEFAULT_WINDOW_SIZE, StopReason, SyncOutcome, SyncRequest,
};
