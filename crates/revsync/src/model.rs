//! Review data model shared by the sync core and its collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single user review of a course.
///
/// `text` holds the review body exactly as the source delivers it (rich-text
/// markup); see [`crate::text`] for conversion to plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Star rating, 1 through 5.
    pub rating_value: u8,
    /// Review body in rich-text form.
    pub text: String,
    /// Epoch milliseconds at which the review was posted. Sort key.
    pub reviewed_at: i64,
    /// Number of "helpful" votes.
    #[serde(default)]
    pub helpful_count: u32,
    /// Whether the reviewer completed the course.
    #[serde(default)]
    pub completed: bool,
}

impl Review {
    /// The posting time as a UTC timestamp, if it is representable.
    #[must_use]
    pub fn reviewed_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.reviewed_at)
    }
}

/// One window of reviews returned by a single source call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    /// Reviews in non-increasing `reviewed_at` order.
    pub elements: Vec<Review>,
    /// Total review count reported by the source at fetch time.
    pub total: u64,
}

impl Batch {
    #[must_use]
    pub fn new(elements: Vec<Review>, total: u64) -> Self {
        Self { elements, total }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Newest `reviewed_at` among `reviews`, or `None` when empty.
///
/// Callers use this as the next watermark after a successful run.
#[must_use]
pub fn newest_timestamp<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> Option<i64> {
    reviews.into_iter().map(|r| r.reviewed_at).max()
}
