use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::DateTime;
use console::style;
use revsync::api::CourseraClient;
use revsync::short_error_message;
use revsync::store::{self, OutputFormat, ReviewRecord};
use revsync::sync::{Pacing, SyncRequest, sync_reviews};

use crate::ReviewsArgs;
use crate::config;
use crate::progress::ProgressReporter;

pub(crate) async fn handle_reviews(
    args: ReviewsArgs,
    config: &config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = resolve_format(args.format.map(Into::into), args.output.as_deref(), config)?;

    let client = CourseraClient::new(config.api_config())?;
    let (course_url, course) = client.resolve_course(&args.url).await?;
    tracing::info!(course = %course.name, id = %course.id, "Resolved course");

    let path = resolve_output_path(args.output, config, course_url.slug(), format);

    let existing = if args.incremental {
        store::load_as(&path, format)?
    } else {
        None
    };
    let cutoff = resolve_cutoff(args.after, existing.as_deref());

    let window_size = args.window_size.unwrap_or(config.sync.window_size);
    let pace_ms = args.pace_ms.unwrap_or(config.sync.pace_ms);
    let request = SyncRequest::new(course.id.as_str(), cutoff).with_window_size(window_size);

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let outcome = match sync_reviews(
        &client,
        &request,
        Pacing::from_millis(pace_ms),
        Some(&callback),
    )
    .await
    {
        Ok(outcome) => {
            reporter.finish();
            outcome
        }
        Err(e) => {
            reporter.abandon();
            eprintln!(
                "{} Sync failed, {} left unchanged: {}",
                style("✗").red().bold(),
                path.display(),
                short_error_message(&e)
            );
            return Err(e.into());
        }
    };

    let fresh = store::to_records(&outcome.reviews);
    let new_count = fresh.len();

    if new_count == 0 {
        let message = if existing.is_some() {
            format!("{} is up to date", path.display())
        } else {
            format!("No reviews found for \"{}\"", course.name)
        };
        println!("{} {}", style("✓").green().bold(), message);
        return Ok(());
    }

    let total = persist(&path, format, fresh, existing)?;
    let watermark = outcome.next_watermark(cutoff);

    println!(
        "{} Saved {} new review{} ({} total) to {}",
        style("✓").green().bold(),
        new_count,
        if new_count == 1 { "" } else { "s" },
        total,
        style(path.display()).cyan()
    );
    println!(
        "  Newest review: {} ({})",
        watermark,
        format_timestamp(watermark)
    );

    Ok(())
}

/// Write fresh records ahead of any previously stored ones.
///
/// Returns the number of records in the file.
fn persist(
    path: &Path,
    format: OutputFormat,
    fresh: Vec<ReviewRecord>,
    existing: Option<Vec<ReviewRecord>>,
) -> Result<usize, store::StoreError> {
    let records = match existing {
        Some(old) => store::merge_newest_first(fresh, old),
        None => fresh,
    };
    store::save(path, format, &records)?;
    Ok(records.len())
}

/// Explicit flag, then output file extension, then config.
///
/// A flag that contradicts the output extension is rejected.
fn resolve_format(
    flag: Option<OutputFormat>,
    output: Option<&Path>,
    config: &config::Config,
) -> Result<OutputFormat, store::StoreError> {
    let named = output.and_then(OutputFormat::from_path);
    match (flag, named, output) {
        (Some(format), Some(named), Some(path)) if format != named => {
            Err(store::StoreError::FormatMismatch {
                path: path.to_path_buf(),
                format,
            })
        }
        _ => Ok(flag.or(named).unwrap_or(config.output.format)),
    }
}

fn resolve_output_path(
    output: Option<PathBuf>,
    config: &config::Config,
    slug: &str,
    format: OutputFormat,
) -> PathBuf {
    output.unwrap_or_else(|| {
        let file = format!("coursera-{}.{}", slug, format.extension());
        match &config.output.directory {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    })
}

/// `--after` wins; otherwise the newest stored review; otherwise everything.
fn resolve_cutoff(after: Option<i64>, existing: Option<&[ReviewRecord]>) -> i64 {
    after
        .or_else(|| existing.and_then(store::watermark))
        .unwrap_or(0)
}

fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
