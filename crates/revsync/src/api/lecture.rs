//! Downloadable lecture assets: the video in one resolution and its
//! subtitle tracks.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::ApiError;

pub(crate) const LECTURE_INCLUDES: &str = "video";

pub(crate) const LECTURE_FIELDS: &str =
    "onDemandVideos.v1(sources,subtitles,subtitlesVtt,subtitlesTxt,subtitlesAssetTags)";

const VIDEOS_KEY: &str = "onDemandVideos.v1";

/// Resolutions tried after the requested one, in order.
const FALLBACK_RESOLUTIONS: [u32; 4] = [360, 540, 720, 240];

/// Which lecture assets to pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPreferences {
    /// Preferred video height in pixels: 240, 360, 540 or 720.
    pub resolution: u32,
    /// Subtitle languages wanted in addition to the course's primary ones.
    pub languages: Vec<String>,
    pub subtitles: bool,
}

impl Default for AssetPreferences {
    fn default() -> Self {
        Self {
            resolution: 360,
            languages: vec!["zh-CN".to_string(), "en".to_string()],
            subtitles: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Video,
    Subtitles,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::Video => "video",
            AssetKind::Subtitles => "subtitles",
        })
    }
}

/// One downloadable file belonging to a lecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LectureAsset {
    Video {
        lecture_id: String,
        url: String,
        /// Resolution label as published, e.g. `360p`.
        resolution: String,
    },
    Subtitles {
        lecture_id: String,
        url: String,
        language: String,
    },
}

impl LectureAsset {
    #[must_use]
    pub fn kind(&self) -> AssetKind {
        match self {
            LectureAsset::Video { .. } => AssetKind::Video,
            LectureAsset::Subtitles { .. } => AssetKind::Subtitles,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            LectureAsset::Video { url, .. } | LectureAsset::Subtitles { url, .. } => url,
        }
    }

    #[must_use]
    pub fn lecture_id(&self) -> &str {
        match self {
            LectureAsset::Video { lecture_id, .. } | LectureAsset::Subtitles { lecture_id, .. } => {
                lecture_id
            }
        }
    }

    /// File name to save under: `<lecture>.360p.mp4` or `<lecture>.en.vtt`.
    #[must_use]
    pub fn filename(&self) -> String {
        match self {
            LectureAsset::Video {
                lecture_id,
                url,
                resolution,
            } => {
                let extension = Url::parse(url)
                    .ok()
                    .and_then(|u| {
                        let name = u.path_segments()?.next_back()?.to_string();
                        let (_, ext) = name.rsplit_once('.')?;
                        Some(format!(".{ext}"))
                    })
                    .unwrap_or_default();
                format!("{lecture_id}.{resolution}{extension}")
            }
            LectureAsset::Subtitles {
                lecture_id,
                language,
                ..
            } => format!("{lecture_id}.{language}.vtt"),
        }
    }
}

// ---------- wire ----------

#[derive(Debug, Deserialize)]
pub(crate) struct LectureVideosResponse {
    pub linked: Option<LectureVideosLinked>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LectureVideosLinked {
    #[serde(rename = "onDemandVideos.v1")]
    pub videos: Option<Vec<WireVideo>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireVideo {
    pub sources: Option<WireSources>,
    #[serde(default)]
    pub subtitles_vtt: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireSources {
    #[serde(default)]
    pub by_resolution: BTreeMap<String, WireVideoSource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireVideoSource {
    pub mp4_video_url: Option<String>,
}

/// Pick the video and subtitle tracks of one lecture.
///
/// The video comes first. Subtitle languages are tried in preference order,
/// then the course's primary languages; duplicates are skipped. Relative
/// subtitle paths are resolved against `endpoint`.
pub(crate) fn select_assets(
    endpoint: &str,
    lecture_id: &str,
    primary_languages: &[String],
    prefs: &AssetPreferences,
    response: LectureVideosResponse,
) -> Result<Vec<LectureAsset>, ApiError> {
    let mut videos = response
        .linked
        .and_then(|l| l.videos)
        .ok_or_else(|| ApiError::missing(format!("linked.{VIDEOS_KEY}")))?;
    if videos.len() > 1 {
        return Err(ApiError::InvalidField {
            field: format!("linked.{VIDEOS_KEY}"),
            message: format!("{} videos in lecture {lecture_id}", videos.len()),
        });
    }
    let video = videos
        .pop()
        .ok_or_else(|| ApiError::VideoNotFound(lecture_id.to_string()))?;

    let sources = video.sources.map(|s| s.by_resolution).unwrap_or_default();
    let (resolution, url) = std::iter::once(prefs.resolution)
        .chain(FALLBACK_RESOLUTIONS)
        .map(|height| format!("{height}p"))
        .find_map(|label| {
            let url = sources.get(&label)?.mp4_video_url.clone()?;
            Some((label, url))
        })
        .ok_or_else(|| ApiError::VideoNotFound(lecture_id.to_string()))?;

    let mut assets = vec![LectureAsset::Video {
        lecture_id: lecture_id.to_string(),
        url,
        resolution,
    }];
    if !prefs.subtitles {
        return Ok(assets);
    }

    let mut seen = Vec::new();
    for language in prefs.languages.iter().chain(primary_languages) {
        if seen.contains(language) {
            continue;
        }
        seen.push(language.clone());
        if let Some(path) = video.subtitles_vtt.get(language) {
            assets.push(LectureAsset::Subtitles {
                lecture_id: lecture_id.to_string(),
                url: absolute_url(endpoint, path),
                language: language.clone(),
            });
        }
    }
    Ok(assets)
}

fn absolute_url(endpoint: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{endpoint}{path}")
    }
}
