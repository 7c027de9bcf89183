//! Persisted review files.
//!
//! Reviews are stored as flat [`ReviewRecord`]s in JSON or CSV. An existing
//! file doubles as the sync state: its newest `reviewedAt` is the watermark
//! for the next incremental run.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::Review;
use crate::text::cml_to_text;

/// Errors reading or writing a review file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot infer format of {0}; use a .json or .csv extension")]
    UnknownFormat(PathBuf),

    #[error("Refusing to write {format} into {path}")]
    FormatMismatch { path: PathBuf, format: OutputFormat },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A review as written to disk, with its body converted to plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub rating: u8,
    pub text: String,
    pub helpful_count: u32,
    pub reviewed_at: i64,
    #[serde(rename = "isCompleted")]
    pub completed: bool,
}

impl From<&Review> for ReviewRecord {
    fn from(review: &Review) -> Self {
        Self {
            rating: review.rating_value,
            text: cml_to_text(&review.text),
            helpful_count: review.helpful_count,
            reviewed_at: review.reviewed_at,
            completed: review.completed,
        }
    }
}

/// On-disk format of a review file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Convert synced reviews to records, preserving order.
pub fn to_records(reviews: &[Review]) -> Vec<ReviewRecord> {
    reviews.iter().map(ReviewRecord::from).collect()
}

/// Newest `reviewedAt` among `records`.
pub fn watermark(records: &[ReviewRecord]) -> Option<i64> {
    records.iter().map(|r| r.reviewed_at).max()
}

/// Put freshly synced records in front of previously stored ones.
///
/// Both inputs are newest first, and every fresh record is newer than the
/// stored watermark, so the result stays newest first.
pub fn merge_newest_first(fresh: Vec<ReviewRecord>, existing: Vec<ReviewRecord>) -> Vec<ReviewRecord> {
    let mut merged = fresh;
    merged.extend(existing);
    merged
}

/// Load a review file, choosing the parser by extension.
///
/// A missing file yields `Ok(None)`.
pub fn load(path: &Path) -> Result<Option<Vec<ReviewRecord>>, StoreError> {
    let format =
        OutputFormat::from_path(path).ok_or_else(|| StoreError::UnknownFormat(path.to_path_buf()))?;
    load_as(path, format)
}

/// Load a review file written in `format`.
///
/// Fails with [`StoreError::FormatMismatch`] when the extension names the
/// other format.
pub fn load_as(path: &Path, format: OutputFormat) -> Result<Option<Vec<ReviewRecord>>, StoreError> {
    check_extension(path, format)?;

    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let records = match format {
        OutputFormat::Json => serde_json::from_slice(&data)?,
        OutputFormat::Csv => csv::Reader::from_reader(data.as_slice())
            .deserialize()
            .collect::<Result<Vec<ReviewRecord>, _>>()?,
    };

    debug!(path = %path.display(), count = records.len(), "Loaded review file");
    Ok(Some(records))
}

/// Write `records` to `path` in `format`.
///
/// A `.json` path only ever receives JSON and a `.csv` path only CSV; other
/// extensions accept either.
///
/// The data is written next to the target and renamed over it, so an
/// interrupted write leaves any previous file intact.
pub fn save(path: &Path, format: OutputFormat, records: &[ReviewRecord]) -> Result<(), StoreError> {
    check_extension(path, format)?;

    let data = match format {
        OutputFormat::Json => {
            let mut data = serde_json::to_vec_pretty(records)?;
            data.push(b'\n');
            data
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for record in records {
                writer.serialize(record)?;
            }
            writer
                .into_inner()
                .map_err(|e| StoreError::io(path, e.into_error()))?
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, &data).map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))?;

    debug!(path = %path.display(), count = records.len(), %format, "Saved review file");
    Ok(())
}

fn check_extension(path: &Path, format: OutputFormat) -> Result<(), StoreError> {
    match OutputFormat::from_path(path) {
        Some(named) if named != format => Err(StoreError::FormatMismatch {
            path: path.to_path_buf(),
            format,
        }),
        _ => Ok(()),
    }
}
