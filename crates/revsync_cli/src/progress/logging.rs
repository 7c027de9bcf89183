use revsync::sync::SyncProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::Started {
                course_id,
                cutoff,
                window_size,
            } => {
                tracing::info!(course_id = %course_id, cutoff, window_size, "Syncing reviews");
            }

            SyncProgress::FetchingBatch { start } => {
                tracing::debug!(start, "Fetching batch");
            }

            SyncProgress::FetchedBatch {
                start,
                count,
                kept,
                total,
                collected_so_far,
            } => {
                tracing::info!(start, count, kept, total, collected_so_far, "Fetched batch");
            }

            SyncProgress::Pacing { delay_ms } => {
                tracing::debug!(delay_ms, "Pausing before next batch");
            }

            SyncProgress::CutoffReached { start, index } => {
                tracing::info!(start, index, "Reached previously seen reviews");
            }

            SyncProgress::Exhausted { total } => {
                tracing::info!(total, "All reviews fetched");
            }

            SyncProgress::Complete { collected, batches } => {
                tracing::info!(collected, batches, "Sync complete");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
