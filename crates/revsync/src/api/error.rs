//! Error types for Coursera API operations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::course::CourseUrlError;
use crate::error::SyncError;
use crate::http::{HttpError, HttpResponse};

/// Errors that can occur when interacting with the Coursera API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// The response body was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned a failure status. `body` is captured verbatim.
    #[error("{description} (HTTP {status}): {body}")]
    Api {
        description: String,
        status: u16,
        body: String,
    },

    /// A success response lacked an expected field.
    #[error("Response is missing `{field}`")]
    MissingField { field: String },

    /// A field was present but its value is out of range.
    #[error("Response field `{field}` is invalid: {message}")]
    InvalidField { field: String, message: String },

    /// The GraphQL gateway answered 2xx but reported errors instead of data.
    #[error("GraphQL error: {message}")]
    GraphQl { message: String },

    /// No course matches the slug or search query.
    #[error("Course not found: {0}")]
    CourseNotFound(String),

    /// A lecture has no downloadable video.
    #[error("No video found in lecture {0}")]
    VideoNotFound(String),

    /// Writing a downloaded asset failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The URL does not belong to a supported site.
    #[error("Unsupported site: {0}")]
    UnsupportedSite(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<CourseUrlError> for ApiError {
    fn from(err: CourseUrlError) -> Self {
        match err {
            CourseUrlError::UnsupportedSite(site) => ApiError::UnsupportedSite(site),
            other => ApiError::CourseNotFound(other.to_string()),
        }
    }
}

impl From<ApiError> for SyncError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(e) => SyncError::Network {
                message: e.to_string(),
            },
            ApiError::Json(e) => SyncError::MalformedResponse {
                message: format!("JSON parse error: {}", e),
            },
            ApiError::Api {
                description,
                status,
                body,
            } => SyncError::Protocol {
                description,
                status_code: status,
                body,
            },
            ApiError::MissingField { field } => SyncError::MalformedResponse {
                message: format!("missing field `{}`", field),
            },
            ApiError::InvalidField { field, message } => SyncError::MalformedResponse {
                message: format!("invalid field `{}`: {}", field, message),
            },
            ApiError::GraphQl { message } => SyncError::MalformedResponse { message },
            ApiError::CourseNotFound(course) => SyncError::Internal {
                message: format!("course not found: {}", course),
            },
            ApiError::VideoNotFound(lecture) => SyncError::Internal {
                message: format!("no video in lecture {}", lecture),
            },
            ApiError::Io { path, source } => SyncError::Internal {
                message: format!("{}: {}", path.display(), source),
            },
            ApiError::UnsupportedSite(site) => SyncError::Internal {
                message: format!("unsupported site: {}", site),
            },
            ApiError::Config(message) => SyncError::Internal { message },
        }
    }
}

/// Classify a response: any non-2xx status becomes [`ApiError::Api`] carrying
/// `description`, the status and the raw body. Never retries.
pub fn classify_response(description: &str, response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Api {
        description: description.to_string(),
        status: response.status,
        body: response.body_text(),
    })
}

/// Get a short error message suitable for display.
pub fn short_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Http(_) => "Network error".to_string(),
        ApiError::Json(_) => "JSON parse error".to_string(),
        ApiError::Api { status, body, .. } => {
            if body.chars().count() > 50 {
                let truncated: String = body.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            } else {
                format!("HTTP {}: {}", status, body)
            }
        }
        ApiError::MissingField { field } => format!("Missing field: {}", field),
        ApiError::InvalidField { field, .. } => format!("Invalid field: {}", field),
        ApiError::GraphQl { .. } => "GraphQL error".to_string(),
        ApiError::CourseNotFound(course) => format!("Course not found: {}", course),
        ApiError::VideoNotFound(lecture) => format!("No video in lecture {}", lecture),
        ApiError::Io { path, .. } => format!("Cannot write {}", path.display()),
        ApiError::UnsupportedSite(site) => format!("Unsupported site: {}", site),
        ApiError::Config(msg) => format!("Config: {}", msg),
    }
}
