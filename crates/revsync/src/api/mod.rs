//! Coursera API client.
//!
//! Talks to these endpoints:
//! - the GraphQL gateway for review windows (implements [`ReviewSource`](crate::sync::ReviewSource))
//! - the course catalogue, to resolve a URL slug to a course id
//! - the course search index, for optional popularity figures
//! - the syllabus and lecture video endpoints, for course content and
//!   downloadable [`LectureAsset`]s

mod client;
mod config;
mod error;
mod lecture;
mod syllabus;
mod types;

pub use client::{CourseraClient, Download};
pub use config::{ApiConfig, COURSERA_HOST, SEARCH_HOST, default_headers};
pub use error::{ApiError, classify_response, short_error_message};
pub use lecture::{AssetKind, AssetPreferences, LectureAsset};
pub use syllabus::{Syllabus, SyllabusItem, SyllabusModule};
pub use types::{
    COURSE_ID_PREFIX, Course, CourseStats, REVIEWS_OPERATION, SEARCH_INDEX, product_id,
};
