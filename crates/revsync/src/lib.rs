//! revsync - incremental synchronization of course reviews.
//!
//! Pulls reviews from a paginated, newest-first remote source and stops as
//! soon as it reaches reviews already seen (older than or equal to a
//! caller-supplied watermark).
//!
//! # Features
//!
//! - `coursera` (default) - the Coursera API client and the reqwest-backed
//!   HTTP transport.
//!
//! # Example
//!
//! ```ignore
//! use revsync::api::{ApiConfig, CourseraClient};
//! use revsync::sync::{Pacing, SyncRequest, sync_reviews};
//!
//! let client = CourseraClient::new(ApiConfig::default())?;
//! let request = SyncRequest::new("LZZg6vhQEeWfYgqbi1xsdw", last_watermark);
//! let outcome = sync_reviews(&client, &request, Pacing::from_millis(1000), None).await?;
//! let watermark = outcome.next_watermark(last_watermark);
//! ```

pub mod course;
pub mod error;
pub mod http;
pub mod model;
pub mod store;
pub mod sync;
pub mod text;

#[cfg(feature = "coursera")]
pub mod api;

pub use course::{CourseUrl, CourseUrlError};
pub use error::{Result, SyncError, short_error_message};
pub use model::{Batch, Review, newest_timestamp};
pub use store::{OutputFormat, ReviewRecord, StoreError};
pub use sync::{
    Pacing, ProgressCallback, ReviewSource, StopReason, SyncOutcome, SyncProgress, SyncRequest,
    sync_reviews, synchronize,
};
