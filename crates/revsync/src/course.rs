//! Course URL parsing.

use std::fmt;

use url::Url;

/// Hosts whose course pages can be resolved.
const SUPPORTED_HOSTS: &[&str] = &["coursera.org", "www.coursera.org"];

/// Why a course URL could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourseUrlError {
    #[error("invalid URL {url}: {message}")]
    Invalid { url: String, message: String },

    #[error("unsupported site: {0}")]
    UnsupportedSite(String),

    #[error("URL has no course slug: {0}")]
    MissingSlug(String),
}

/// A course page URL, stripped of query and fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseUrl {
    url: Url,
    slug: String,
}

impl CourseUrl {
    /// Parse a course page URL such as `https://www.coursera.org/learn/hanzi?trk=x`.
    ///
    /// A missing scheme is tolerated (`coursera.org/learn/hanzi`).
    pub fn parse(input: &str) -> Result<Self, CourseUrlError> {
        let input = input.trim();
        let parsed = Url::parse(input).or_else(|e| match e {
            url::ParseError::RelativeUrlWithoutBase => Url::parse(&format!("https://{input}")),
            other => Err(other),
        });
        let mut url = parsed.map_err(|e| CourseUrlError::Invalid {
            url: input.to_string(),
            message: e.to_string(),
        })?;

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if !SUPPORTED_HOSTS.contains(&host.as_str()) {
            return Err(CourseUrlError::UnsupportedSite(host));
        }

        url.set_query(None);
        url.set_fragment(None);

        let slug = url
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
            .map(str::to_string)
            .ok_or_else(|| CourseUrlError::MissingSlug(input.to_string()))?;

        Ok(Self { url, slug })
    }

    /// Last path segment, the catalogue lookup key.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// URL path without a trailing slash, e.g. `/learn/hanzi`.
    pub fn path(&self) -> &str {
        let path = self.url.path();
        path.strip_suffix('/').unwrap_or(path)
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for CourseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
