//! Coursera wire types and the public course records built from them.
//!
//! Response structs keep every field optional so that a missing field is
//! reported by the client as [`ApiError::MissingField`](super::ApiError)
//! with its path instead of a generic deserialization failure.

use serde::{Deserialize, Serialize};

/// GraphQL operation name of the review query; also sent as `?opname=`.
pub const REVIEWS_OPERATION: &str = "AllCourseReviews";

/// Prefix the review gateway expects in front of a bare course id.
pub const COURSE_ID_PREFIX: &str = "COURSE~";

/// Search index queried for course statistics.
pub const SEARCH_INDEX: &str = "prod_all_launched_products_term_optimization";

/// Fields requested from the course catalogue.
pub const COURSE_FIELDS: &str =
    "description,primaryLanguages,subtitleLanguages,photoUrl,learningObjectives";

pub(crate) const REVIEWS_QUERY: &str = "query AllCourseReviews($courseId: String!, $limit: Int!, \
$start: String!, $ratingValues: [Int!], $productCompleted: Boolean, $sortByHelpfulVotes: Boolean!) {
ProductReviewsV1Resource {
reviews: byProduct(
productId: $courseId
ratingValues: $ratingValues
limit: $limit
start: $start
productCompleted: $productCompleted
sortByHelpfulVotes: $sortByHelpfulVotes
) {
elements {
...ReviewFragment
}
paging {
total
}
}
}
}
fragment ReviewFragment on ProductReviewsV1 {
reviewedAt
rating
reviewText {
... on ProductReviewsV1_cmlMember {
cml {
value
}
}
}
productCompleted
mostHelpfulVoteCount
}";

/// Product id for `course_id`, prefixed once.
#[must_use]
pub fn product_id(course_id: &str) -> String {
    if course_id.starts_with(COURSE_ID_PREFIX) {
        course_id.to_string()
    } else {
        format!("{COURSE_ID_PREFIX}{course_id}")
    }
}

// ---------- review query ----------

/// One GraphQL operation; the gateway takes a JSON array of these.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphqlOperation<'a> {
    pub operation_name: &'a str,
    pub variables: ReviewVariables,
    pub query: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewVariables {
    pub course_id: String,
    pub limit: u32,
    /// Offset, sent as a decimal string.
    pub start: String,
    pub rating_values: [u8; 5],
    /// Always null: reviews from completers and non-completers alike.
    pub product_completed: Option<bool>,
    pub sort_by_helpful_votes: bool,
}

impl ReviewVariables {
    pub(crate) fn new(course_id: &str, start: u64, limit: u32) -> Self {
        Self {
            course_id: product_id(course_id),
            limit,
            start: start.to_string(),
            rating_values: [1, 2, 3, 4, 5],
            product_completed: None,
            sort_by_helpful_votes: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlEnvelope {
    pub data: Option<ReviewsData>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlErrorMessage>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlErrorMessage {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewsData {
    #[serde(rename = "ProductReviewsV1Resource")]
    pub resource: Option<ReviewsResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewsResource {
    pub reviews: Option<ReviewPage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewPage {
    pub elements: Option<Vec<WireReview>>,
    pub paging: Option<WirePaging>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WirePaging {
    pub total: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireReview {
    pub reviewed_at: Option<i64>,
    pub rating: Option<u8>,
    pub review_text: Option<WireReviewText>,
    pub product_completed: Option<bool>,
    pub most_helpful_vote_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireReviewText {
    pub cml: Option<WireCml>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCml {
    pub value: Option<String>,
}

// ---------- course catalogue ----------

#[derive(Debug, Deserialize)]
pub(crate) struct CoursesResponse {
    #[serde(default)]
    pub elements: Vec<Course>,
}

/// Basic course information from the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Bare course id, used for review queries.
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub primary_languages: Vec<String>,
    #[serde(default)]
    pub subtitle_languages: Vec<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
}

// ---------- search ----------

#[derive(Debug, Serialize)]
pub(crate) struct SearchPayload<'a> {
    pub requests: [SearchQuery<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchQuery<'a> {
    pub index_name: &'a str,
    pub params: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchHit {
    #[serde(default)]
    pub object_url: Option<String>,
    #[serde(default)]
    pub enrollments: Option<u64>,
    #[serde(default)]
    pub partners: Vec<String>,
    #[serde(default)]
    pub num_product_ratings: Option<u64>,
    #[serde(default)]
    pub avg_product_rating: Option<f64>,
}

/// Popularity figures published by the search index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStats {
    pub enrollments: Option<u64>,
    pub partners: Vec<String>,
    pub num_ratings: Option<u64>,
    pub avg_rating: Option<f64>,
}

impl From<SearchHit> for CourseStats {
    fn from(hit: SearchHit) -> Self {
        Self {
            enrollments: hit.enrollments,
            partners: hit.partners,
            num_ratings: hit.num_product_ratings,
            avg_rating: hit.avg_product_rating,
        }
    }
}
