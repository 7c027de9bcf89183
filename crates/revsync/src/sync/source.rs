use async_trait::async_trait;

use crate::error::Result;
use crate::model::Batch;

/// A remote source of reviews ordered newest first.
///
/// Implementations perform exactly one round trip per call and never retry;
/// any failure is returned to the engine, which aborts the run.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Fetch the window of at most `limit` reviews starting at offset
    /// `start` for `course_id`.
    async fn fetch_batch(&self, course_id: &str, start: u64, limit: u32) -> Result<Batch>;
}

#[async_trait]
impl<S: ReviewSource + ?Sized> ReviewSource for &S {
    async fn fetch_batch(&self, course_id: &str, start: u64, limit: u32) -> Result<Batch> {
        (**self).fetch_batch(course_id, start, limit).await
    }
}

#[async_trait]
impl<S: ReviewSource + ?Sized> ReviewSource for std::sync::Arc<S> {
    async fn fetch_batch(&self, course_id: &str, start: u64, limit: u32) -> Result<Batch> {
        (**self).fetch_batch(course_id, start, limit).await
    }
}
