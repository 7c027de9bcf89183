//! Progress reporting types for review synchronization.
//!
//! The engine reports what it is doing through an optional callback so that
//! front ends can render spinners or structured logs without the core
//! knowing which.

/// Progress events emitted during a sync run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// A run is starting.
    Started {
        /// Course being synchronized.
        course_id: String,
        /// Watermark; only reviews strictly newer are collected.
        cutoff: i64,
        /// Reviews requested per batch.
        window_size: u32,
    },

    /// About to request the batch at `start`.
    FetchingBatch {
        /// Window-aligned offset of the batch.
        start: u64,
    },

    /// A batch arrived and was classified.
    FetchedBatch {
        /// Offset of the batch.
        start: u64,
        /// Number of reviews in the batch.
        count: usize,
        /// Number of those reviews kept (newer than the cutoff).
        kept: usize,
        /// Total reviews reported by the source.
        total: u64,
        /// Running count of collected reviews.
        collected_so_far: usize,
    },

    /// Waiting before the next batch.
    Pacing {
        /// Delay in milliseconds.
        delay_ms: u64,
    },

    /// The cutoff boundary was found; no further batches will be fetched.
    CutoffReached {
        /// Offset of the batch containing the boundary.
        start: u64,
        /// Truncation index within that batch.
        index: usize,
    },

    /// Every review reported by the source has been fetched.
    Exhausted {
        /// Total reviews reported by the source.
        total: u64,
    },

    /// The run finished successfully.
    Complete {
        /// Number of reviews collected.
        collected: usize,
        /// Number of batches fetched.
        batches: u32,
    },
}

/// Callback type for progress reporting.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
