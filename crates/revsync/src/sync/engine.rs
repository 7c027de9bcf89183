//! Windowed pagination over a newest-first review source.
//!
//! A run walks window-aligned offsets `0, w, 2w, ...` one request at a
//! time. Each batch is classified against the cutoff; the first batch that
//! contains the boundary is truncated and ends the run, otherwise the run
//! ends once the offset reaches the total reported by the source. Any
//! failed fetch aborts the run and the reviews collected so far are dropped.
//!
//! # Example
//!
//! ```ignore
//! use revsync::sync::{Pacing, SyncRequest, sync_reviews};
//!
//! let request = SyncRequest::new(course_id, last_watermark);
//! let outcome = sync_reviews(&client, &request, Pacing::from_millis(1000), None).await?;
//! let watermark = outcome.next_watermark(last_watermark);
//! ```

use super::accumulator::ReviewAccumulator;
use super::cutoff::{Cutoff, detect_cutoff};
use super::pacing::Pacing;
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::source::ReviewSource;
use super::types::{StopReason, SyncOutcome, SyncRequest};
use crate::error::{Result, short_error_message};
use crate::model::Review;

/// Controller state between fetches. A failed fetch leaves the loop
/// through `?` and never materializes as a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    Fetching { start: u64 },
    Stopped(StopReason),
}

/// Collect every review newer than `request.cutoff`, newest first.
///
/// Exactly one request is in flight at a time. `pacing` is applied only
/// between a successful fetch and the next one.
pub async fn sync_reviews<S: ReviewSource + ?Sized>(
    source: &S,
    request: &SyncRequest,
    pacing: Pacing,
    on_progress: Option<&ProgressCallback>,
) -> Result<SyncOutcome> {
    let limit = request.window_size.max(1);
    let window = u64::from(limit);
    let course_id = request.course_id.as_str();
    let cutoff = request.cutoff;

    emit(
        on_progress,
        SyncProgress::Started {
            course_id: course_id.to_string(),
            cutoff,
            window_size: limit,
        },
    );

    let mut accumulator = ReviewAccumulator::new();
    let mut state = SyncState::Fetching { start: 0 };
    let mut batches_fetched = 0u32;
    let mut reported_total = 0u64;

    let stop = loop {
        let start = match state {
            SyncState::Fetching { start } => start,
            SyncState::Stopped(reason) => break reason,
        };

        emit(on_progress, SyncProgress::FetchingBatch { start });
        tracing::debug!(course_id, start, limit, "Requesting review batch");

        let batch = match source.fetch_batch(course_id, start, limit).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(
                    course_id,
                    start,
                    collected = accumulator.len(),
                    error = %short_error_message(&e),
                    "Review sync aborted"
                );
                return Err(e);
            }
        };

        batches_fetched += 1;
        reported_total = batch.total;
        let count = batch.len();
        let cut = detect_cutoff(&batch.elements, cutoff);
        let kept = cut.keep(count);

        let mut elements = batch.elements;
        elements.truncate(kept);
        if !accumulator.append(elements) {
            tracing::warn!(
                course_id,
                start,
                "Source returned a batch newer than the previous one"
            );
        }

        tracing::debug!(course_id, start, count, kept, total = reported_total, "Fetched review batch");
        emit(
            on_progress,
            SyncProgress::FetchedBatch {
                start,
                count,
                kept,
                total: reported_total,
                collected_so_far: accumulator.len(),
            },
        );

        state = match cut {
            Cutoff::Truncate(index) => {
                emit(on_progress, SyncProgress::CutoffReached { start, index });
                SyncState::Stopped(StopReason::Truncated { start, index })
            }
            Cutoff::FullyNew => {
                let next = start.saturating_add(window);
                if count == 0 || reported_total <= next {
                    if count == 0 && reported_total > start {
                        tracing::warn!(
                            course_id,
                            start,
                            total = reported_total,
                            "Source returned an empty batch before its reported total"
                        );
                    }
                    emit(
                        on_progress,
                        SyncProgress::Exhausted {
                            total: reported_total,
                        },
                    );
                    SyncState::Stopped(StopReason::Exhausted)
                } else {
                    if let Some(delay_ms) = pacing.delay_ms() {
                        emit(on_progress, SyncProgress::Pacing { delay_ms });
                    }
                    pacing.wait().await;
                    SyncState::Fetching { start: next }
                }
            }
        };
    };

    let reviews = accumulator.into_reviews();
    tracing::info!(
        course_id,
        cutoff,
        collected = reviews.len(),
        batches = batches_fetched,
        stop = ?stop,
        "Review sync complete"
    );
    emit(
        on_progress,
        SyncProgress::Complete {
            collected: reviews.len(),
            batches: batches_fetched,
        },
    );

    Ok(SyncOutcome {
        reviews,
        stop,
        batches_fetched,
        reported_total,
    })
}

/// Collect the reviews of `course_id` newer than `cutoff` with the default
/// window size and no pacing.
pub async fn synchronize<S: ReviewSource + ?Sized>(
    source: &S,
    course_id: &str,
    cutoff: i64,
) -> Result<Vec<Review>> {
    let request = SyncRequest::new(course_id, cutoff);
    sync_reviews(source, &request, Pacing::Disabled, None)
        .await
        .map(|outcome| outcome.reviews)
}
