//! News backend API client.
//!
//! This module wraps the three read-only calls the views consume:
//!
//! | Call | Method | Auth |
//! |------|--------|------|
//! | `/blog/all` | GET | none |
//! | `/news/CategoryWisenews` | GET | `Authorization` token |
//! | `/news/categoryTagNewsWiseNews` | POST | `Authorization` token |
//!
//! # Architecture
//!
//! - [`NewsApi`]: the seam views load through
//! - [`HttpNewsApi`]: the `reqwest` implementation
//!
//! The backend signals an expired session either with HTTP 401 or with a
//! 200 response whose body carries `status: 401`. Both become
//! [`ApiError::Unauthorized`].
//!
//! No retries are attempted; a failed call is reported once and the caller
//! decides how to degrade.

use crate::error::ApiError;
use crate::models::{
    Article, BlogListResponse, CategoryBucket, CategoryNewsResponse, Story, StoryLookupRequest,
    StoryLookupResponse,
};
use crate::session::Session;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Async access to the news backend.
#[allow(async_fn_in_trait)]
pub trait NewsApi {
    /// Fetch every blog article, in backend order.
    async fn fetch_blogs(&self) -> Result<Vec<Article>, ApiError>;

    /// Fetch the category-bucketed story listing.
    ///
    /// The session is best-effort: without one the request goes out
    /// unauthenticated and the backend decides.
    async fn fetch_category_news(
        &self,
        session: Option<&Session>,
    ) -> Result<Vec<CategoryBucket>, ApiError>;

    /// Resolve one full story by composite key, returning the first match.
    async fn fetch_story(
        &self,
        request: &StoryLookupRequest,
        session: Option<&Session>,
    ) -> Result<Story, ApiError>;
}

/// `reqwest`-backed [`NewsApi`].
#[derive(Debug, Clone)]
pub struct HttpNewsApi {
    client: Client,
    base_url: Url,
    auth_scheme: Option<String>,
}

impl HttpNewsApi {
    /// Create a client for `base_url`.
    ///
    /// `timeout` of `None` leaves requests unbounded. `auth_scheme`, when set,
    /// prefixes the token in the `Authorization` header (e.g. `Bearer`).
    pub fn new(
        base_url: Url,
        timeout: Option<Duration>,
        auth_scheme: Option<String>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            client: builder.build()?,
            base_url,
            auth_scheme,
        })
    }

    fn endpoint(&self, path: &str) -> Url {
        // Base URLs are normalized to end in '/', so joining a relative path
        // keeps any prefix the backend is mounted under.
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }

    fn authorize(&self, req: RequestBuilder, session: Option<&Session>) -> RequestBuilder {
        match session {
            Some(s) => {
                let value = match &self.auth_scheme {
                    Some(scheme) => format!("{} {}", scheme, s.token),
                    None => s.token.clone(),
                };
                req.header(reqwest::header::AUTHORIZATION, value)
            }
            None => req,
        }
    }
}

/// Read a response body as `T`, mapping HTTP-level failures first.
async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        return Err(ApiError::Status(status.as_u16()));
    }
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

fn in_band_unauthorized(status: Option<u16>) -> bool {
    status == Some(StatusCode::UNAUTHORIZED.as_u16())
}

impl NewsApi for HttpNewsApi {
    #[instrument(level = "info", skip_all)]
    async fn fetch_blogs(&self) -> Result<Vec<Article>, ApiError> {
        let t0 = Instant::now();
        let url = self.endpoint("blog/all");
        let resp = self.client.get(url).send().await?;
        let parsed: BlogListResponse = read_json(resp).await?;

        info!(
            count = parsed.blogs.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched blog articles"
        );
        Ok(parsed.blogs)
    }

    #[instrument(level = "info", skip_all, fields(user_id = session.map(Session::user_id)))]
    async fn fetch_category_news(
        &self,
        session: Option<&Session>,
    ) -> Result<Vec<CategoryBucket>, ApiError> {
        let t0 = Instant::now();
        let mut url = self.endpoint("news/CategoryWisenews");
        if let Some(s) = session {
            url.query_pairs_mut().append_pair("userId", s.user_id());
        }

        let req = self.authorize(self.client.get(url), session);
        let parsed: CategoryNewsResponse = read_json(req.send().await?).await?;

        match parsed.category_wise_news {
            Some(buckets) => {
                info!(
                    categories = buckets.len(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Fetched category-wise news"
                );
                Ok(buckets)
            }
            None if in_band_unauthorized(parsed.status) => {
                warn!("Category listing rejected the session");
                Err(ApiError::Unauthorized)
            }
            None => {
                debug!(status = ?parsed.status, "Category listing had no buckets");
                Ok(Vec::new())
            }
        }
    }

    #[instrument(
        level = "info",
        skip_all,
        fields(
            news_id = request.news_id.as_deref(),
            category_id = request.category_id.as_deref(),
            tag_id = request.tag_id.as_deref()
        )
    )]
    async fn fetch_story(
        &self,
        request: &StoryLookupRequest,
        session: Option<&Session>,
    ) -> Result<Story, ApiError> {
        let t0 = Instant::now();
        let url = self.endpoint("news/categoryTagNewsWiseNews");
        let req = self.authorize(self.client.post(url).json(request), session);
        let parsed: StoryLookupResponse = read_json(req.send().await?).await?;

        match parsed.stories {
            Some(stories) => {
                let story = stories.into_iter().next().ok_or_else(|| {
                    ApiError::NotFound(format!(
                        "newsId={}",
                        request.news_id.as_deref().unwrap_or("<none>")
                    ))
                })?;
                info!(
                    story_id = %story.id,
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Resolved story"
                );
                Ok(story)
            }
            None if in_band_unauthorized(parsed.status) => {
                warn!("Story lookup rejected the session");
                Err(ApiError::Unauthorized)
            }
            None => Err(ApiError::NotFound(format!(
                "newsId={}",
                request.news_id.as_deref().unwrap_or("<none>")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, scheme: Option<&str>) -> HttpNewsApi {
        let base = Url::parse(&format!("{}/", server.uri())).unwrap();
        HttpNewsApi::new(base, None, scheme.map(str::to_string)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_blogs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blog/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Blogs": [
                    {"_id": "a1", "blog": "First"},
                    {"_id": "a2", "blog": "Second"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let blogs = client_for(&server, None).fetch_blogs().await.unwrap();
        assert_eq!(blogs.len(), 2);
        assert_eq!(blogs[0].id, "a1");
        assert_eq!(blogs[1].title, "Second");
    }

    #[tokio::test]
    async fn test_fetch_blogs_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blog/all"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server, None).fetch_blogs().await.unwrap_err();
        assert!(matches!(err, ApiError::Status(500)));
    }

    #[tokio::test]
    async fn test_fetch_blogs_bad_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blog/all"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server, None).fetch_blogs().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_category_news_sends_token_and_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news/CategoryWisenews"))
            .and(header("authorization", "tok-1"))
            .and(query_param("userId", "u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "categoryWiseNews": [
                    {"categoryName": "Tech", "news": [{"_id": "s1", "title": "T"}]}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new("u1", "tok-1");
        let buckets = client_for(&server, None)
            .fetch_category_news(Some(&session))
            .await
            .unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].news[0].id, "s1");
    }

    #[tokio::test]
    async fn test_auth_scheme_prefixes_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news/CategoryWisenews"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"categoryWiseNews": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new("u1", "tok-1");
        let buckets = client_for(&server, Some("Bearer"))
            .fetch_category_news(Some(&session))
            .await
            .unwrap();
        assert!(buckets.is_empty());
    }

    #[tokio::test]
    async fn test_category_news_in_band_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news/CategoryWisenews"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 401})))
            .mount(&server)
            .await;

        let session = Session::new("u1", "stale");
        let err = client_for(&server, None)
            .fetch_category_news(Some(&session))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_fetch_story_posts_composite_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/news/categoryTagNewsWiseNews"))
            .and(header("authorization", "tok"))
            .and(body_json(json!({"categoryId": "c1", "tagId": "t1", "newsId": "s1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "categoryTagAndNewsWiseNews": [
                    {"_id": "s1", "title": "Full story"},
                    {"_id": "s2", "title": "Ignored"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = StoryLookupRequest {
            category_id: Some("c1".to_string()),
            tag_id: Some("t1".to_string()),
            news_id: Some("s1".to_string()),
        };
        let session = Session::new("u1", "tok");
        let story = client_for(&server, None)
            .fetch_story(&request, Some(&session))
            .await
            .unwrap();
        assert_eq!(story.id, "s1");
        assert_eq!(story.title, "Full story");
    }

    #[tokio::test]
    async fn test_fetch_story_http_401() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/news/categoryTagNewsWiseNews"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .fetch_story(&StoryLookupRequest::default(), None)
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_fetch_story_empty_result_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/news/categoryTagNewsWiseNews"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"categoryTagAndNewsWiseNews": []})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .fetch_story(&StoryLookupRequest::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_endpoint_keeps_base_prefix() {
        let api = HttpNewsApi::new(
            Url::parse("https://host.example/api/").unwrap(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(
            api.endpoint("blog/all").as_str(),
            "https://host.example/api/blog/all"
        );
    }
}
