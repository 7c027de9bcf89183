use crate::model::Review;

/// Append-only, newest-first collection of reviews for one sync run.
///
/// Batches are appended in offset order and each is internally
/// non-increasing, so the concatenation stays non-increasing as long as the
/// source honours its ordering. A violation at a batch seam is reported via
/// [`ReviewAccumulator::append`]'s return value rather than repaired.
#[derive(Debug, Default)]
pub struct ReviewAccumulator {
    reviews: Vec<Review>,
}

impl ReviewAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sub-batch. Returns `false` when the first appended review is
    /// newer than the current tail (the source broke descending order).
    pub fn append(&mut self, batch: impl IntoIterator<Item = Review>) -> bool {
        let tail = self.reviews.last().map(|r| r.reviewed_at);
        let start = self.reviews.len();
        self.reviews.extend(batch);

        match (tail, self.reviews.get(start)) {
            (Some(tail), Some(head)) => head.reviewed_at <= tail,
            _ => true,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// Timestamp of the oldest review collected so far.
    #[must_use]
    pub fn oldest(&self) -> Option<i64> {
        self.reviews.last().map(|r| r.reviewed_at)
    }

    #[must_use]
    pub fn into_reviews(self) -> Vec<Review> {
        self.reviews
    }
}
