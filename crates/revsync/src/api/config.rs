//! Endpoint and credential configuration for the Coursera client.

use crate::http::HttpHeaders;

/// Default Coursera host.
pub const COURSERA_HOST: &str = "https://www.coursera.org";

/// Default host of the course search index.
pub const SEARCH_HOST: &str = "https://lua9b20g37-3.algolianet.com";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Everything the client needs to talk to the remote service.
///
/// Nothing here is compiled into request-building code: the endpoints,
/// search credentials and extra headers all come from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the course and review APIs.
    pub endpoint: String,
    /// Base URL of the course search index.
    pub search_endpoint: String,
    /// Search index application id. Search is skipped when unset.
    pub application_key: Option<String>,
    /// Search index API key. Search is skipped when unset.
    pub api_key: Option<String>,
    /// Headers sent with every request.
    pub headers: HttpHeaders,
    /// Proxy URL for all traffic, e.g. `http://127.0.0.1:8080`.
    pub proxy: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: COURSERA_HOST.to_string(),
            search_endpoint: SEARCH_HOST.to_string(),
            application_key: None,
            api_key: None,
            headers: default_headers(COURSERA_HOST),
            proxy: None,
        }
    }
}

impl ApiConfig {
    /// Point the client at another host. Trailing slashes are dropped.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_search_endpoint(mut self, endpoint: &str) -> Self {
        self.search_endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// Set the search index credentials.
    #[must_use]
    pub fn with_search_keys(
        mut self,
        application_key: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        self.application_key = Some(application_key.into());
        self.api_key = Some(api_key.into());
        self
    }

    /// Add or replace a header (case-insensitive name match).
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
        self
    }

    #[must_use]
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Search credentials, when both halves are configured.
    #[must_use]
    pub fn search_keys(&self) -> Option<(&str, &str)> {
        match (&self.application_key, &self.api_key) {
            (Some(app), Some(key)) if !app.is_empty() && !key.is_empty() => {
                Some((app.as_str(), key.as_str()))
            }
            _ => None,
        }
    }
}

/// Browser-like JSON headers accepted by the public endpoints.
#[must_use]
pub fn default_headers(origin: &str) -> HttpHeaders {
    vec![
        ("Accept".to_string(), "application/json".to_string()),
        ("Accept-Language".to_string(), "en".to_string()),
        ("Origin".to_string(), origin.to_string()),
        ("Referer".to_string(), format!("{origin}/learn/")),
        ("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::header_get;

    #[test]
    fn default_config_has_no_search_keys() {
        let config = ApiConfig::default();
        assert_eq!(config.endpoint, COURSERA_HOST);
        assert_eq!(config.search_keys(), None);
        assert_eq!(config.proxy, None);
        assert_eq!(header_get(&config.headers, "accept"), Some("application/json"));
        assert_eq!(
            header_get(&config.headers, "referer"),
            Some("https://www.coursera.org/learn/")
        );
    }

    #[test]
    fn search_keys_require_both_halves() {
        let mut config = ApiConfig::default();
        config.application_key = Some("APP".to_string());
        assert_eq!(config.search_keys(), None);

        let config = config.with_search_keys("APP", "KEY");
        assert_eq!(config.search_keys(), Some(("APP", "KEY")));
    }

    #[test]
    fn with_header_replaces_existing() {
        let config = ApiConfig::default().with_header("user-agent", "revsync-test");
        let agents: Vec<_> = config
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("user-agent"))
            .collect();
        assert_eq!(agents.len(), 1);
        assert_eq!(header_get(&config.headers, "User-Agent"), Some("revsync-test"));
    }

    #[test]
    fn endpoints_drop_trailing_slash() {
        let config = ApiConfig::default()
            .with_endpoint("http://localhost:8080/")
            .with_search_endpoint("http://search.test//");
        assert_eq!(config.endpoint, "http://localhost:8080");
        assert_eq!(config.search_endpoint, "http://search.test");
    }
}
