//! HTTP plumbing shared by the remote clients.
//!
//! Requests and responses are plain owned values so a client can be driven by
//! the reqwest adapter in production and by [`MockTransport`] in tests.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        })
    }
}

/// Ordered header pairs. Lookups ignore ASCII case.
pub type HttpHeaders = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpRequest {
    #[must_use]
    pub fn get(url: impl Into<String>, headers: HttpHeaders) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers,
            body: Vec::new(),
        }
    }

    /// POST with a JSON body. Adds `Content-Type: application/json` unless
    /// the caller already set a content type.
    #[must_use]
    pub fn post_json(url: impl Into<String>, mut headers: HttpHeaders, body: Vec<u8>) -> Self {
        if header_get(&headers, "content-type").is_none() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers,
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text; invalid UTF-8 is replaced, never rejected.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),

    #[error("no mock response registered for {method} {url}")]
    NoMockResponse { method: HttpMethod, url: String },
}

/// Sends one request and returns the whole response. Implementations never
/// retry and never interpret the status code.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// First value of header `name`, ignoring ASCII case.
#[must_use]
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(feature = "coursera")]
pub mod reqwest_transport {
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

    use super::*;

    fn transport_error(err: impl fmt::Display) -> HttpError {
        HttpError::Transport(err.to_string())
    }

    /// [`HttpTransport`] over a shared `reqwest::Client`.
    #[derive(Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new(client: reqwest::Client) -> Self {
            Self { client }
        }

        /// gzip-enabled client without a proxy.
        pub fn with_defaults() -> Result<Self, HttpError> {
            Self::with_proxy(None)
        }

        /// gzip-enabled client routing every request through `proxy`, when
        /// given (e.g. `http://127.0.0.1:8080`).
        pub fn with_proxy(proxy: Option<&str>) -> Result<Self, HttpError> {
            let mut builder = reqwest::Client::builder().gzip(true);
            if let Some(proxy) = proxy {
                builder = builder.proxy(reqwest::Proxy::all(proxy).map_err(transport_error)?);
            }
            Ok(Self::new(builder.build().map_err(transport_error)?))
        }
    }

    fn header_map(headers: &HttpHeaders) -> Result<HeaderMap, HttpError> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(transport_error)?;
            let value = HeaderValue::from_str(value).map_err(transport_error)?;
            map.append(name, value);
        }
        Ok(map)
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;

            let builder = match method {
                HttpMethod::Get => self.client.get(&url),
                HttpMethod::Post => self.client.post(&url).body(body),
            };
            let response = builder
                .headers(header_map(&headers)?)
                .send()
                .await
                .map_err(transport_error)?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    let value = value.to_str().ok()?;
                    Some((name.to_string(), value.to_string()))
                })
                .collect();
            let body = response.bytes().await.map_err(transport_error)?.to_vec();

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}

#[cfg(test)]
pub use mock::MockTransport;

#[cfg(test)]
mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex, MutexGuard};

    use super::*;

    type Route = (HttpMethod, String);

    #[derive(Default)]
    struct Routes {
        queued: HashMap<Route, VecDeque<HttpResponse>>,
        sent: Vec<HttpRequest>,
    }

    /// Canned responses per method and exact URL (query included), served
    /// once each in the order they were queued.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        routes: Arc<Mutex<Routes>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        fn routes(&self) -> MutexGuard<'_, Routes> {
            self.routes.lock().expect("mock routes lock poisoned")
        }

        pub fn push_response(&self, method: HttpMethod, url: impl Into<String>, response: HttpResponse) {
            self.routes()
                .queued
                .entry((method, url.into()))
                .or_default()
                .push_back(response);
        }

        /// Every request sent so far, oldest first.
        pub fn requests(&self) -> Vec<HttpRequest> {
            self.routes().sent.clone()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let mut routes = self.routes();
            let route = (request.method, request.url.clone());
            routes.sent.push(request);
            routes
                .queued
                .get_mut(&route)
                .and_then(VecDeque::pop_front)
                .ok_or(HttpError::NoMockResponse {
                    method: route.0,
                    url: route.1,
                })
        }
    }
}
