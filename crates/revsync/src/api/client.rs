//! Coursera API client.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::config::ApiConfig;
use super::error::{ApiError, classify_response};
use super::lecture::{
    AssetPreferences, LECTURE_FIELDS, LECTURE_INCLUDES, LectureAsset, LectureVideosResponse,
    select_assets,
};
use super::syllabus::{
    MATERIALS_FIELDS, MATERIALS_INCLUDES, MaterialsResponse, ObjectivesResponse, Syllabus,
    build_syllabus,
};
use super::types::{
    COURSE_FIELDS, Course, CourseStats, CoursesResponse, GraphqlEnvelope, GraphqlOperation,
    REVIEWS_OPERATION, REVIEWS_QUERY, ReviewVariables, SEARCH_INDEX, SearchPayload, SearchQuery,
    SearchResponse, WireReview,
};
use crate::course::CourseUrl;
use crate::error::SyncError;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpTransport, header_get};
use crate::model::{Batch, Review};
use crate::sync::ReviewSource;

const REVIEWS_PATH: &str = "reviews";

/// Number of search hits scanned for the course being looked up.
const SEARCH_HITS: u32 = 10;

/// Coursera API client.
///
/// Performs one HTTP round trip per call and never retries. Implements
/// [`ReviewSource`] so it can drive [`crate::sync::sync_reviews`].
#[derive(Clone)]
pub struct CourseraClient {
    transport: Arc<dyn HttpTransport>,
    config: ApiConfig,
}

impl CourseraClient {
    /// Create a client backed by reqwest.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = CourseraClient::new(ApiConfig::default())?;
    /// let course = client.course_by_slug("hanzi").await?;
    /// ```
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::with_proxy(config.proxy.as_deref())
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self::new_with_transport(config, Arc::new(transport)))
    }

    pub fn new_with_transport(config: ApiConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url_with_params<'a>(
        base: &str,
        path: &str,
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Url, ApiError> {
        Url::parse_with_params(&format!("{base}{path}"), params)
            .map_err(|e| ApiError::Config(format!("invalid endpoint {base}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        description: &str,
    ) -> Result<T, ApiError> {
        let request = HttpRequest::get(url.as_str(), self.config.headers.clone());
        let response = self.transport.send(request).await?;
        classify_response(description, &response)?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        description: &str,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_vec(body)?;
        let request = HttpRequest::post_json(url.as_str(), self.config.headers.clone(), body);
        let response = self.transport.send(request).await?;
        classify_response(description, &response)?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Fetch one window of reviews, newest first.
    ///
    /// `course_id` may be given bare or already prefixed with `COURSE~`.
    pub async fn fetch_reviews(
        &self,
        course_id: &str,
        start: u64,
        limit: u32,
    ) -> Result<Batch, ApiError> {
        let url = Self::url_with_params(
            &self.config.endpoint,
            "/graphql-gateway-wrapper",
            [("opname", REVIEWS_OPERATION)],
        )?;
        let payload = [GraphqlOperation {
            operation_name: REVIEWS_OPERATION,
            variables: ReviewVariables::new(course_id, start, limit),
            query: REVIEWS_QUERY,
        }];

        debug!(course_id, start, limit, "Requesting review window");

        let description = format!("cannot fetch reviews of course({course_id})");
        let envelopes: Vec<GraphqlEnvelope> = self.post_json(url, &payload, &description).await?;
        let batch = parse_review_envelopes(envelopes)?;

        debug!(
            course_id,
            start,
            count = batch.len(),
            total = batch.total,
            "Received review window"
        );
        Ok(batch)
    }

    /// Look up a course in the catalogue by its URL slug.
    pub async fn course_by_slug(&self, slug: &str) -> Result<Course, ApiError> {
        let url = Self::url_with_params(
            &self.config.endpoint,
            "/api/courses.v1",
            [("q", "slug"), ("slug", slug), ("fields", COURSE_FIELDS)],
        )?;
        let description = format!("cannot find the course by slug {slug}");
        let response: CoursesResponse = self.get_json(url, &description).await?;

        response
            .elements
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::CourseNotFound(slug.to_string()))
    }

    /// Parse a course page URL and look the course up by its slug.
    pub async fn resolve_course(&self, url: &str) -> Result<(CourseUrl, Course), ApiError> {
        let course_url = CourseUrl::parse(url)?;
        let course = self.course_by_slug(course_url.slug()).await?;
        debug!(url = %course_url, id = %course.id, "Resolved course");
        Ok((course_url, course))
    }

    /// Query the search index for popularity figures of `course`.
    ///
    /// `course_path` (e.g. `/learn/hanzi`) picks the matching hit among the
    /// results. Returns `Ok(None)` when no search credentials are configured.
    pub async fn course_stats(
        &self,
        course: &Course,
        course_path: &str,
    ) -> Result<Option<CourseStats>, ApiError> {
        let Some((application_key, api_key)) = self.config.search_keys() else {
            debug!(course = %course.slug, "Search credentials not configured, skipping stats");
            return Ok(None);
        };

        let url = Self::url_with_params(
            &self.config.search_endpoint,
            "/1/indexes/*/queries",
            [
                ("x-algolia-application-id", application_key),
                ("x-algolia-api-key", api_key),
            ],
        )?;
        let hits_per_page = SEARCH_HITS.to_string();
        let params = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("query", &course.name)
            .append_pair("hitsPerPage", &hits_per_page)
            .append_pair("page", "0")
            .finish();
        let payload = SearchPayload {
            requests: [SearchQuery {
                index_name: SEARCH_INDEX,
                params,
            }],
        };

        let description = format!("cannot find the course by query {}", course.name);
        let response: SearchResponse = self.post_json(url, &payload, &description).await?;

        response
            .results
            .into_iter()
            .flat_map(|r| r.hits)
            .find(|hit| hit.object_url.as_deref() == Some(course_path))
            .map(|hit| Some(CourseStats::from(hit)))
            .ok_or_else(|| ApiError::CourseNotFound(course.name.clone()))
    }
    /// Fetch the syllabus of a course, including each module's learning
    /// objectives.
    pub async fn course_syllabus(&self, course_id: &str) -> Result<Syllabus, ApiError> {
        let url = Self::url_with_params(
            &self.config.endpoint,
            &format!("/api/onDemandCourseMaterials.v2/{course_id}"),
            [
                ("includes", MATERIALS_INCLUDES),
                ("fields", MATERIALS_FIELDS),
                ("showLockedItems", "true"),
            ],
        )?;
        let description = format!("cannot query syllabus of course({course_id})");
        let response: MaterialsResponse = self.get_json(url, &description).await?;
        let (mut syllabus, objective_ids) = build_syllabus(course_id, response)?;

        for (module, ids) in syllabus.modules.iter_mut().zip(objective_ids) {
            if !ids.is_empty() {
                module.learning_objectives = self.learning_objectives(&ids).await?;
            }
        }

        debug!(
            course_id,
            modules = syllabus.modules.len(),
            items = syllabus.item_counts.values().sum::<usize>(),
            "Fetched syllabus"
        );
        Ok(syllabus)
    }

    /// Resolve learning objective ids to their descriptions.
    pub async fn learning_objectives(&self, ids: &[String]) -> Result<Vec<String>, ApiError> {
        let ids = ids.join(",");
        let url = Self::url_with_params(
            &self.config.endpoint,
            "/api/onDemandLearningObjectives.v2/",
            [("ids", ids.as_str()), ("fields", "id,description")],
        )?;
        let response: ObjectivesResponse =
            self.get_json(url, "no learning objective found").await?;

        response
            .elements
            .into_iter()
            .enumerate()
            .map(|(i, objective)| {
                objective
                    .description
                    .ok_or_else(|| ApiError::missing(format!("elements[{i}].description")))
            })
            .collect()
    }

    /// List the video and subtitle assets of one lecture item.
    pub async fn lecture_assets(
        &self,
        course: &Course,
        lecture_id: &str,
        prefs: &AssetPreferences,
    ) -> Result<Vec<LectureAsset>, ApiError> {
        let url = Self::url_with_params(
            &self.config.endpoint,
            &format!("/api/onDemandLectureVideos.v1/{}~{lecture_id}", course.id),
            [("includes", LECTURE_INCLUDES), ("fields", LECTURE_FIELDS)],
        )?;
        let description = format!("no item found {}~{lecture_id}", course.id);
        let response: LectureVideosResponse = self.get_json(url, &description).await?;

        let assets = select_assets(
            &self.config.endpoint,
            lecture_id,
            &course.primary_languages,
            prefs,
            response,
        )?;
        if prefs.subtitles && assets.len() == 1 {
            tracing::warn!(lecture_id, "No subtitles found in lecture");
        }
        Ok(assets)
    }

    /// Download `asset` into `directory` under [`LectureAsset::filename`].
    ///
    /// An existing file is left alone. The body is written next to the
    /// target and renamed over it once complete.
    pub async fn download_asset(
        &self,
        asset: &LectureAsset,
        directory: &Path,
    ) -> Result<Download, ApiError> {
        let path = directory.join(asset.filename());
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!(path = %path.display(), "Asset already downloaded");
            return Ok(Download::Skipped(path));
        }

        let headers = header_get(&self.config.headers, "user-agent")
            .map(|agent| vec![("User-Agent".to_string(), agent.to_string())])
            .unwrap_or_default();
        let response = self
            .transport
            .send(HttpRequest::get(asset.url(), headers))
            .await?;
        classify_response("failed to download file", &response)?;

        tokio::fs::create_dir_all(directory)
            .await
            .map_err(|e| ApiError::io(directory, e))?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".part");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, &response.body)
            .await
            .map_err(|e| ApiError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| ApiError::io(&path, e))?;

        let bytes = u64::try_from(response.body.len()).unwrap_or(u64::MAX);
        debug!(path = %path.display(), bytes, kind = %asset.kind(), "Downloaded asset");
        Ok(Download::Saved { path, bytes })
    }
}

/// Result of [`CourseraClient::download_asset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Download {
    Saved { path: PathBuf, bytes: u64 },
    /// The target file already existed.
    Skipped(PathBuf),
}

impl Download {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Download::Saved { path, .. } | Download::Skipped(path) => path,
        }
    }
}

#[async_trait]
impl ReviewSource for CourseraClient {
    async fn fetch_batch(
        &self,
        course_id: &str,
        start: u64,
        limit: u32,
    ) -> Result<Batch, SyncError> {
        self.fetch_reviews(course_id, start, limit)
            .await
            .map_err(SyncError::from)
    }
}

/// Navigate `[0].data.ProductReviewsV1Resource.reviews` and convert it.
fn parse_review_envelopes(envelopes: Vec<GraphqlEnvelope>) -> Result<Batch, ApiError> {
    let envelope = envelopes
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::missing("[0]"))?;

    let page = match envelope
        .data
        .and_then(|d| d.resource)
        .and_then(|r| r.reviews)
    {
        Some(page) => page,
        None => {
            let messages: Vec<String> = envelope
                .errors
                .unwrap_or_default()
                .into_iter()
                .filter_map(|e| e.message)
                .collect();
            if messages.is_empty() {
                return Err(ApiError::missing(
                    "[0].data.ProductReviewsV1Resource.reviews",
                ));
            }
            return Err(ApiError::GraphQl {
                message: messages.join("; "),
            });
        }
    };

    let elements = page
        .elements
        .ok_or_else(|| ApiError::missing(format!("{REVIEWS_PATH}.elements")))?;
    let total = page
        .paging
        .and_then(|p| p.total)
        .ok_or_else(|| ApiError::missing(format!("{REVIEWS_PATH}.paging.total")))?;

    let reviews = elements
        .into_iter()
        .enumerate()
        .map(|(i, wire)| to_review(i, wire))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Batch::new(reviews, total))
}

fn to_review(index: usize, wire: WireReview) -> Result<Review, ApiError> {
    let reviewed_at = wire
        .reviewed_at
        .ok_or_else(|| ApiError::missing(format!("{REVIEWS_PATH}.elements[{index}].reviewedAt")))?;
    let rating_value = wire
        .rating
        .ok_or_else(|| ApiError::missing(format!("{REVIEWS_PATH}.elements[{index}].rating")))?;
    if !(1..=5).contains(&rating_value) {
        return Err(ApiError::InvalidField {
            field: format!("{REVIEWS_PATH}.elements[{index}].rating"),
            message: format!("rating {rating_value} is outside 1..=5"),
        });
    }
    let text = wire
        .review_text
        .and_then(|t| t.cml)
        .and_then(|c| c.value)
        .unwrap_or_default();

    Ok(Review {
        rating_value,
        text,
        reviewed_at,
        helpful_count: wire.most_helpful_vote_count.unwrap_or(0),
        completed: wire.product_completed.unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, HttpResponse, MockTransport};
    use crate::sync::{Pacing, SyncRequest, StopReason, sync_reviews};

    const REVIEWS_URL: &str =
        "https://www.coursera.org/graphql-gateway-wrapper?opname=AllCourseReviews";
    const COURSE_URL: &str = "https://www.coursera.org/api/courses.v1?q=slug&slug=hanzi\
&fields=description%2CprimaryLanguages%2CsubtitleLanguages%2CphotoUrl%2ClearningObjectives";
    const SEARCH_URL: &str = "https://lua9b20g37-3.algolianet.com/1/indexes/*/queries\
?x-algolia-application-id=APP&x-algolia-api-key=KEY";

    fn response(status: u16, body: impl AsRef<[u8]>) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.as_ref().to_vec(),
        }
    }

    fn review_json(reviewed_at: i64, rating: u8) -> serde_json::Value {
        serde_json::json!({
            "reviewedAt": reviewed_at,
            "rating": rating,
            "reviewText": {
                "__typename": "ProductReviewsV1_cmlMember",
                "cml": { "value": format!("<co-content><text>review {reviewed_at}</text></co-content>") }
            },
            "productCompleted": true,
            "mostHelpfulVoteCount": null
        })
    }

    fn reviews_body(elements: Vec<serde_json::Value>, total: u64) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!([{
            "data": {
                "ProductReviewsV1Resource": {
                    "reviews": {
                        "elements": elements,
                        "paging": { "total": total }
                    }
                }
            }
        }]))
        .expect("serialize body")
    }

    fn client(transport: &MockTransport) -> CourseraClient {
        CourseraClient::new_with_transport(ApiConfig::default(), Arc::new(transport.clone()))
    }

    #[tokio::test]
    async fn fetch_reviews_sends_gateway_payload() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Post,
            REVIEWS_URL,
            response(200, reviews_body(vec![review_json(300, 5)], 1)),
        );

        client(&transport)
            .fetch_reviews("LZZg6vhQEeWfYgqbi1xsdw", 1000, 1000)
            .await
            .expect("fetch should succeed");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            header_get(&request.headers, "content-type"),
            Some("application/json")
        );
        assert_eq!(header_get(&request.headers, "origin"), Some("https://www.coursera.org"));

        let body: serde_json::Value = serde_json::from_slice(&request.body).expect("json body");
        let ops = body.as_array().expect("payload is an array");
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0]["operationName"], "AllCourseReviews");
        let vars = &ops[0]["variables"];
        assert_eq!(vars["courseId"], "COURSE~LZZg6vhQEeWfYgqbi1xsdw");
        assert_eq!(vars["limit"], 1000);
        assert_eq!(vars["start"], "1000");
        assert_eq!(vars["ratingValues"], serde_json::json!([1, 2, 3, 4, 5]));
        assert!(vars["productCompleted"].is_null());
        assert_eq!(vars["sortByHelpfulVotes"], false);
    }

    #[tokio::test]
    async fn fetch_reviews_parses_elements_and_total() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Post,
            REVIEWS_URL,
            response(
                200,
                reviews_body(vec![review_json(300, 5), review_json(200, 2)], 2500),
            ),
        );

        let batch = client(&transport)
            .fetch_reviews("abc", 0, 1000)
            .await
            .expect("fetch should succeed");

        assert_eq!(batch.total, 2500);
        assert_eq!(batch.len(), 2);
        let first = &batch.elements[0];
        assert_eq!(first.reviewed_at, 300);
        assert_eq!(first.rating_value, 5);
        assert_eq!(first.helpful_count, 0);
        assert!(first.completed);
        assert_eq!(first.text, "<co-content><text>review 300</text></co-content>");
        assert_eq!(batch.elements[1].rating_value, 2);
    }

    #[tokio::test]
    async fn server_error_becomes_protocol_error_with_body() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Post,
            REVIEWS_URL,
            response(500, "{\"errorCode\":\"internal\"}"),
        );

        let err: SyncError = client(&transport)
            .fetch_batch("abc", 0, 1000)
            .await
            .expect_err("500 should fail");

        match err {
            SyncError::Protocol {
                description,
                status_code,
                body,
            } => {
                assert_eq!(status_code, 500);
                assert_eq!(body, "{\"errorCode\":\"internal\"}");
                assert!(description.contains("abc"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_total_is_malformed() {
        let transport = MockTransport::new();
        let body = serde_json::to_vec(&serde_json::json!([{
            "data": { "ProductReviewsV1Resource": { "reviews": {
                "elements": [], "paging": {}
            }}}
        }]))
        .expect("serialize");
        transport.push_response(HttpMethod::Post, REVIEWS_URL, response(200, body));

        let err = client(&transport)
            .fetch_reviews("abc", 0, 1000)
            .await
            .expect_err("missing total should fail");
        match err {
            ApiError::MissingField { field } => assert_eq!(field, "reviews.paging.total"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_timestamp_names_element() {
        let transport = MockTransport::new();
        let mut bad = review_json(100, 4);
        bad.as_object_mut().expect("object").remove("reviewedAt");
        transport.push_response(
            HttpMethod::Post,
            REVIEWS_URL,
            response(200, reviews_body(vec![review_json(300, 5), bad], 2)),
        );

        let err = client(&transport)
            .fetch_reviews("abc", 0, 1000)
            .await
            .expect_err("missing reviewedAt should fail");
        assert!(
            matches!(&err, ApiError::MissingField { field } if field == "reviews.elements[1].reviewedAt"),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        for rating in [0, 6] {
            let transport = MockTransport::new();
            transport.push_response(
                HttpMethod::Post,
                REVIEWS_URL,
                response(200, reviews_body(vec![review_json(300, 5), review_json(200, rating)], 2)),
            );

            let err = client(&transport)
                .fetch_batch("abc", 0, 1000)
                .await
                .expect_err("rating outside 1..=5 should fail");
            match err {
                SyncError::MalformedResponse { message } => {
                    assert!(message.contains("reviews.elements[1].rating"), "{message}");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn graphql_errors_surface_as_malformed() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Post,
            REVIEWS_URL,
            response(
                200,
                r#"[{"data": null, "errors": [{"message": "Unknown course"}]}]"#,
            ),
        );

        let err = client(&transport)
            .fetch_batch("abc", 0, 1000)
            .await
            .expect_err("graphql error should fail");
        match err {
            SyncError::MalformedResponse { message } => assert_eq!(message, "Unknown course"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_success_is_malformed() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Post, REVIEWS_URL, response(200, "<html>"));

        let err = client(&transport)
            .fetch_batch("abc", 0, 1000)
            .await
            .expect_err("html should fail");
        assert!(matches!(err, SyncError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn missing_mock_is_network_error() {
        let transport = MockTransport::new();
        let err = client(&transport)
            .fetch_batch("abc", 0, 1000)
            .await
            .expect_err("no response registered");
        assert!(matches!(err, SyncError::Network { .. }));
    }

    #[tokio::test]
    async fn client_drives_full_sync() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Post,
            REVIEWS_URL,
            response(
                200,
                reviews_body(vec![review_json(500, 5), review_json(400, 4)], 4),
            ),
        );
        transport.push_response(
            HttpMethod::Post,
            REVIEWS_URL,
            response(
                200,
                reviews_body(vec![review_json(300, 3), review_json(200, 2)], 4),
            ),
        );

        let request = SyncRequest::new("abc", 250).with_window_size(2);
        let outcome = sync_reviews(&client(&transport), &request, Pacing::Disabled, None)
            .await
            .expect("sync should succeed");

        let stamps: Vec<i64> = outcome.reviews.iter().map(|r| r.reviewed_at).collect();
        assert_eq!(stamps, vec![500, 400, 300]);
        assert_eq!(outcome.stop, StopReason::Truncated { start: 2, index: 1 });

        let starts: Vec<String> = transport
            .requests()
            .iter()
            .map(|r| {
                let body: serde_json::Value = serde_json::from_slice(&r.body).expect("json");
                body[0]["variables"]["start"].as_str().unwrap_or_default().to_string()
            })
            .collect();
        assert_eq!(starts, vec!["0", "2"]);
    }

    #[tokio::test]
    async fn course_by_slug_returns_first_element() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            COURSE_URL,
            response(
                200,
                r#"{"elements": [{"id": "LZZg6vhQEeWfYgqbi1xsdw", "slug": "hanzi",
                    "name": "Chinese Characters for beginner",
                    "primaryLanguages": ["en"], "subtitleLanguages": ["zh-CN"]}]}"#,
            ),
        );

        let course = client(&transport)
            .course_by_slug("hanzi")
            .await
            .expect("course lookup");
        assert_eq!(course.id, "LZZg6vhQEeWfYgqbi1xsdw");
        assert_eq!(course.primary_languages, vec!["en".to_string()]);
    }

    #[tokio::test]
    async fn course_by_slug_empty_is_not_found() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Get, COURSE_URL, response(200, r#"{"elements": []}"#));

        let err = client(&transport)
            .course_by_slug("hanzi")
            .await
            .expect_err("empty catalogue result");
        assert!(matches!(err, ApiError::CourseNotFound(slug) if slug == "hanzi"));
    }

    #[tokio::test]
    async fn course_by_slug_404_is_api_error() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Get, COURSE_URL, response(404, "{}"));

        let err = client(&transport)
            .course_by_slug("hanzi")
            .await
            .expect_err("404 should fail");
        assert!(matches!(err, ApiError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn resolve_course_from_url() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            COURSE_URL,
            response(200, r#"{"elements": [{"id": "LZZg", "slug": "hanzi", "name": "Hanzi"}]}"#),
        );

        let (url, course) = client(&transport)
            .resolve_course("https://www.coursera.org/learn/hanzi?trk=home")
            .await
            .expect("resolve");
        assert_eq!(url.path(), "/learn/hanzi");
        assert_eq!(course.id, "LZZg");
    }

    #[tokio::test]
    async fn resolve_course_rejects_other_sites() {
        let transport = MockTransport::new();
        let err = client(&transport)
            .resolve_course("https://www.edx.org/learn/hanzi")
            .await
            .expect_err("unsupported");
        assert!(matches!(err, ApiError::UnsupportedSite(_)));
        assert!(transport.requests().is_empty());
    }

    fn course() -> Course {
        Course {
            id: "LZZg".to_string(),
            slug: "hanzi".to_string(),
            name: "Chinese Characters".to_string(),
            description: None,
            photo_url: None,
            primary_languages: Vec::new(),
            subtitle_languages: Vec::new(),
            learning_objectives: vec!["Write common characters".to_string()],
        }
    }

    #[tokio::test]
    async fn course_stats_skipped_without_credentials() {
        let transport = MockTransport::new();
        let stats = client(&transport)
            .course_stats(&course(), "/learn/hanzi")
            .await
            .expect("no-op");
        assert_eq!(stats, None);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn course_stats_matches_object_url() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Post,
            SEARCH_URL,
            response(
                200,
                r#"{"results": [{"hits": [
                    {"objectUrl": "/learn/other", "enrollments": 1},
                    {"objectUrl": "/learn/hanzi", "enrollments": 120000,
                     "partners": ["Peking University"], "numProductRatings": 3200,
                     "avgProductRating": 4.7}
                ]}]}"#,
            ),
        );

        let client = CourseraClient::new_with_transport(
            ApiConfig::default().with_search_keys("APP", "KEY"),
            Arc::new(transport.clone()),
        );
        let stats = client
            .course_stats(&course(), "/learn/hanzi")
            .await
            .expect("stats lookup")
            .expect("credentials configured");
        assert_eq!(stats.enrollments, Some(120_000));
        assert_eq!(stats.num_ratings, Some(3200));

        let body: serde_json::Value =
            serde_json::from_slice(&transport.requests()[0].body).expect("json");
        assert_eq!(
            body["requests"][0]["params"],
            "query=Chinese+Characters&hitsPerPage=10&page=0"
        );
        assert_eq!(body["requests"][0]["indexName"], SEARCH_INDEX);
    }

    #[tokio::test]
    async fn course_stats_without_match_is_not_found() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Post,
            SEARCH_URL,
            response(200, r#"{"results": [{"hits": []}]}"#),
        );

        let client = CourseraClient::new_with_transport(
            ApiConfig::default().with_search_keys("APP", "KEY"),
            Arc::new(transport),
        );
        let err = client
            .course_stats(&course(), "/learn/hanzi")
            .await
            .expect_err("no hit should fail");
        assert!(matches!(err, ApiError::CourseNotFound(_)));
    }

    fn coursera_url(path: &str, params: &[(&str, &str)]) -> String {
        Url::parse_with_params(&format!("https://www.coursera.org{path}"), params)
            .expect("url")
            .to_string()
    }

    #[tokio::test]
    async fn course_syllabus_fills_learning_objectives() {
        let transport = MockTransport::new();
        let materials_url = coursera_url(
            "/api/onDemandCourseMaterials.v2/LZZg",
            &[
                ("includes", "modules,items"),
                ("fields", MATERIALS_FIELDS),
                ("showLockedItems", "true"),
            ],
        );
        assert!(materials_url.contains("includes=modules%2Citems"));
        transport.push_response(
            HttpMethod::Get,
            materials_url,
            response(
                200,
                r#"{"elements": [], "linked": {
                    "onDemandCourseMaterialModules.v1": [
                        {"id": "m1", "name": "Strokes", "slug": "strokes",
                         "timeCommitment": 3600000, "learningObjectives": ["lo1", "lo2"]},
                        {"id": "m2", "name": "Review", "slug": "review",
                         "timeCommitment": 0, "learningObjectives": []}
                    ],
                    "onDemandCourseMaterialItems.v2": [
                        {"id": "i1", "moduleId": "m1", "name": "Intro", "slug": "intro",
                         "isLocked": false, "timeCommitment": 420000,
                         "contentSummary": {"typeName": "lecture"}}
                    ]
                }}"#,
            ),
        );
        transport.push_response(
            HttpMethod::Get,
            coursera_url(
                "/api/onDemandLearningObjectives.v2/",
                &[("ids", "lo1,lo2"), ("fields", "id,description")],
            ),
            response(
                200,
                r#"{"elements": [{"id": "lo1", "description": "Write strokes"},
                                 {"id": "lo2", "description": "Count strokes"}]}"#,
            ),
        );

        let syllabus = client(&transport)
            .course_syllabus("LZZg")
            .await
            .expect("syllabus");

        assert_eq!(syllabus.course_id, "LZZg");
        assert_eq!(
            syllabus.modules[0].learning_objectives,
            vec!["Write strokes", "Count strokes"]
        );
        assert!(syllabus.modules[1].learning_objectives.is_empty());
        assert_eq!(syllabus.item_counts.get("lecture"), Some(&1));
        // one materials request, one objectives request; none for the empty module
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn course_syllabus_for_unknown_course_is_protocol_error() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            coursera_url(
                "/api/onDemandCourseMaterials.v2/nope",
                &[
                    ("includes", "modules,items"),
                    ("fields", MATERIALS_FIELDS),
                    ("showLockedItems", "true"),
                ],
            ),
            response(404, "{}"),
        );

        let err = client(&transport)
            .course_syllabus("nope")
            .await
            .expect_err("404");
        assert!(
            matches!(&err, ApiError::Api { status: 404, description, .. } if description.contains("course(nope)"))
        );
    }

    fn lecture_url(lecture_id: &str) -> String {
        coursera_url(
            &format!("/api/onDemandLectureVideos.v1/LZZg~{lecture_id}"),
            &[("includes", "video"), ("fields", LECTURE_FIELDS)],
        )
    }

    #[tokio::test]
    async fn lecture_assets_pick_video_and_subtitles() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            lecture_url("lec1"),
            response(
                200,
                r#"{"linked": {"onDemandVideos.v1": [{
                    "sources": {"byResolution": {
                        "360p": {"mp4VideoUrl": "https://cdn.test/lec1/360.mp4"}
                    }},
                    "subtitlesVtt": {"en": "/api/subtitleAssetProxy.v1/en"}
                }]}}"#,
            ),
        );

        let assets = client(&transport)
            .lecture_assets(&course(), "lec1", &AssetPreferences::default())
            .await
            .expect("assets");

        assert_eq!(
            assets,
            vec![
                LectureAsset::Video {
                    lecture_id: "lec1".to_string(),
                    url: "https://cdn.test/lec1/360.mp4".to_string(),
                    resolution: "360p".to_string(),
                },
                LectureAsset::Subtitles {
                    lecture_id: "lec1".to_string(),
                    url: "https://www.coursera.org/api/subtitleAssetProxy.v1/en".to_string(),
                    language: "en".to_string(),
                },
            ]
        );
    }

    fn video_asset() -> LectureAsset {
        LectureAsset::Video {
            lecture_id: "lec1".to_string(),
            url: "https://cdn.test/lec1/360.mp4".to_string(),
            resolution: "360p".to_string(),
        }
    }

    #[tokio::test]
    async fn download_asset_writes_file_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("videos");
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            "https://cdn.test/lec1/360.mp4",
            response(200, b"\x00\x01video"),
        );
        let client = client(&transport);

        let first = client
            .download_asset(&video_asset(), &target)
            .await
            .expect("download");
        let path = target.join("lec1.360p.mp4");
        assert_eq!(first, Download::Saved { path: path.clone(), bytes: 7 });
        assert_eq!(std::fs::read(&path).expect("read"), b"\x00\x01video");
        assert!(!target.join("lec1.360p.mp4.part").exists());

        let second = client
            .download_asset(&video_asset(), &target)
            .await
            .expect("skip");
        assert_eq!(second, Download::Skipped(path));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(header_get(&requests[0].headers, "user-agent").is_some());
        assert!(header_get(&requests[0].headers, "origin").is_none());
    }

    #[tokio::test]
    async fn failed_download_leaves_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            "https://cdn.test/lec1/360.mp4",
            response(403, "expired"),
        );

        let err = client(&transport)
            .download_asset(&video_asset(), dir.path())
            .await
            .expect_err("403");
        assert!(matches!(err, ApiError::Api { status: 403, .. }));
        assert!(!dir.path().join("lec1.360p.mp4").exists());
    }
}
