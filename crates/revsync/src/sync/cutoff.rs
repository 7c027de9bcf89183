//! Locating the watermark boundary inside a descending batch.

use crate::model::Review;

/// Where the cutoff falls relative to one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cutoff {
    /// Every element is newer than the cutoff; keep paginating.
    FullyNew,
    /// Elements `[0, index)` are new, `[index, len)` were already seen.
    /// Pagination stops after this batch.
    Truncate(usize),
}

impl Cutoff {
    /// Whether fetching further batches should stop.
    #[must_use]
    pub fn stops(self) -> bool {
        matches!(self, Cutoff::Truncate(_))
    }

    /// Number of leading elements to keep from a batch of `len` elements.
    #[must_use]
    pub fn keep(self, len: usize) -> usize {
        match self {
            Cutoff::FullyNew => len,
            Cutoff::Truncate(index) => index,
        }
    }
}

/// Classify `elements` (non-increasing by `reviewed_at`) against `cutoff`.
///
/// A review is new only when `reviewed_at > cutoff`; one posted exactly at
/// the cutoff millisecond counts as already seen. When the last element is
/// still new the whole batch is kept without searching. Otherwise the
/// boundary is the lower bound of the first element failing `> cutoff`,
/// found by binary search. An empty batch is vacuously fully new.
#[must_use]
pub fn detect_cutoff(elements: &[Review], cutoff: i64) -> Cutoff {
    match elements.last() {
        None => Cutoff::FullyNew,
        Some(last) if last.reviewed_at > cutoff => Cutoff::FullyNew,
        Some(_) => Cutoff::Truncate(elements.partition_point(|r| r.reviewed_at > cutoff)),
    }
}
