//! Sync request/outcome types and constants.

use crate::model::Review;

/// Reviews requested per batch.
pub const DEFAULT_WINDOW_SIZE: u32 = 1000;

/// Suggested pause between batches, in milliseconds.
pub const DEFAULT_PACE_MS: u64 = 1000;

/// Input of one synchronization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    /// Opaque course identifier, without any source-specific prefix.
    pub course_id: String,
    /// Epoch-millisecond watermark. Only reviews with `reviewed_at > cutoff`
    /// are collected; `0` collects everything.
    pub cutoff: i64,
    /// Batch size; always at least 1.
    pub window_size: u32,
}

impl SyncRequest {
    /// A request for every review newer than `cutoff`, using the default
    /// window size.
    #[must_use]
    pub fn new(course_id: impl Into<String>, cutoff: i64) -> Self {
        Self {
            course_id: course_id.into(),
            cutoff,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }

    /// A full (non-incremental) request.
    #[must_use]
    pub fn full(course_id: impl Into<String>) -> Self {
        Self::new(course_id, 0)
    }

    /// Override the window size. Zero is clamped to 1.
    #[must_use]
    pub fn with_window_size(mut self, window_size: u32) -> Self {
        self.window_size = window_size.max(1);
        self
    }
}

/// Why a run stopped fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A batch contained the cutoff boundary.
    Truncated {
        /// Offset of that batch.
        start: u64,
        /// Truncation index within it.
        index: usize,
    },
    /// All reviews reported by the source were fetched.
    Exhausted,
}

/// Result of a successful synchronization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Reviews newer than the cutoff, newest first.
    pub reviews: Vec<Review>,
    /// How the run terminated.
    pub stop: StopReason,
    /// Number of remote calls performed.
    pub batches_fetched: u32,
    /// Total review count reported by the last batch.
    pub reported_total: u64,
}

impl SyncOutcome {
    /// Timestamp a caller should store as its next watermark, given the one
    /// it used for this run. Unchanged when nothing new was found.
    #[must_use]
    pub fn next_watermark(&self, previous: i64) -> i64 {
        crate::model::newest_timestamp(&self.reviews)
            .map_or(previous, |newest| newest.max(previous))
    }
}
