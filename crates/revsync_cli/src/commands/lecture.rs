use std::path::Path;

use console::style;
use revsync::api::{
    ApiError, AssetPreferences, CourseraClient, Download, LectureAsset, short_error_message,
};
use revsync::sync::Pacing;

use crate::LectureArgs;
use crate::config;

pub(crate) async fn handle_lecture(
    args: LectureArgs,
    config: &config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = CourseraClient::new(config.api_config())?;
    let (_, course) = client.resolve_course(&args.url).await?;

    let lecture_ids = if args.lecture_ids.is_empty() {
        let syllabus = client.course_syllabus(&course.id).await?;
        syllabus
            .item_ids("lecture")
            .map(str::to_string)
            .collect::<Vec<_>>()
    } else {
        args.lecture_ids.clone()
    };
    if lecture_ids.is_empty() {
        println!("{} \"{}\" has no lectures", style("✓").green().bold(), course.name);
        return Ok(());
    }

    let prefs = preferences(&args);
    let pacing = Pacing::from_millis(args.pace_ms.unwrap_or(config.sync.pace_ms));

    for (n, lecture_id) in lecture_ids.iter().enumerate() {
        if n > 0 && args.download.is_some() {
            pacing.wait().await;
        }
        let assets = client.lecture_assets(&course, lecture_id, &prefs).await?;

        match &args.download {
            Some(directory) => download_all(&client, &assets, directory).await?,
            None => {
                for asset in &assets {
                    println!("{}", describe(asset));
                }
            }
        }
    }

    Ok(())
}

fn preferences(args: &LectureArgs) -> AssetPreferences {
    let defaults = AssetPreferences::default();
    AssetPreferences {
        resolution: args.resolution.height(),
        languages: if args.languages.is_empty() {
            defaults.languages
        } else {
            args.languages.clone()
        },
        subtitles: !args.no_subtitles,
    }
}

async fn download_all(
    client: &CourseraClient,
    assets: &[LectureAsset],
    directory: &Path,
) -> Result<(), ApiError> {
    for asset in assets {
        match client.download_asset(asset, directory).await {
            Ok(Download::Saved { path, bytes }) => {
                tracing::info!(path = %path.display(), bytes, "Saved asset");
                println!("{} {}", style("✓").green().bold(), path.display());
            }
            Ok(Download::Skipped(path)) => {
                println!("{} {} exists", style("-").dim(), path.display());
            }
            Err(e) => {
                eprintln!(
                    "{} {}: {}",
                    style("✗").red().bold(),
                    asset.filename(),
                    short_error_message(&e)
                );
                return Err(e);
            }
        }
    }
    Ok(())
}

fn describe(asset: &LectureAsset) -> String {
    let label = match asset {
        LectureAsset::Video { resolution, .. } => format!("video {resolution}"),
        LectureAsset::Subtitles { language, .. } => format!("subtitles {language}"),
    };
    format!("{}\t{}\t{}", asset.lecture_id(), label, asset.url())
}
