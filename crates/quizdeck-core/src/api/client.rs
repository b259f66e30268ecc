//! API client for the quiz backend REST API.
//!
//! `ApiClient` is the single place that knows about the bearer token: it
//! owns the token slot and attaches the `Authorization` header to every
//! request. Front-ends only ever call typed methods.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::models::{Attempt, LoginRequest, LoginResponse, Quiz, QuizSummary};

use super::{ApiError, QuizBackend};

// ============================================================================
// Constants
// ============================================================================

/// Backend address used when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the quiz backend.
/// Clone is cheap and shares both the connection pool and the token slot.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a new API client. `timeout` of `None` waits indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("API base URL cannot carry a path: {}", base_url));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Replace (or clear) the bearer token for subsequent requests
    pub fn set_token(&self, token: Option<String>) {
        let mut slot = match self.token.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = token;
    }

    pub fn token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments. Each segment is
    /// percent-encoded, so a quiz name can never escape its path position.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("API base URL cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.token() {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url.clone())
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<T> {
        let response = self
            .client
            .post(url.clone())
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// DELETE succeeds on any 2xx; the confirmation body is not interpreted.
    async fn delete(&self, url: Url) -> Result<()> {
        let response = self
            .client
            .delete(url.clone())
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send DELETE request to {}", url))?;

        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Quiz Endpoints =====

    /// Fetch every quiz owned by the signed-in user, in backend order
    pub async fn fetch_quizzes(&self) -> Result<Vec<QuizSummary>> {
        let url = self.endpoint(&["api", "quizzes"])?;
        let quizzes: Vec<QuizSummary> = self.get(url).await?;
        debug!(count = quizzes.len(), "Quiz list received");
        Ok(quizzes)
    }

    /// Delete one quiz by name
    pub async fn remove_quiz(&self, quiz_name: &str) -> Result<()> {
        let url = self.endpoint(&["api", "quizzes", quiz_name])?;
        self.delete(url).await?;
        debug!(quiz = %quiz_name, "Quiz deleted");
        Ok(())
    }

    /// Fetch the full quiz document, questions included
    pub async fn fetch_quiz_detail(&self, quiz_name: &str) -> Result<Quiz> {
        let url = self.endpoint(&["api", "quizzes", quiz_name])?;
        self.get(url).await
    }

    /// Fetch the signed-in user's attempts at a quiz
    pub async fn fetch_history(&self, quiz_name: &str) -> Result<Vec<Attempt>> {
        let url = self.endpoint(&["api", "quizzes", quiz_name, "history"])?;
        self.get(url).await
    }

    // ===== Authentication Endpoints =====

    /// Exchange username and password for a bearer token
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        let url = self.endpoint(&["api", "login"])?;
        let body = LoginRequest { username, password };
        let response: LoginResponse = self
            .post(url, &body)
            .await
            .context("Failed to authenticate")?;
        Ok(response.token)
    }

    /// Tell the backend the session ended. The server keeps no session
    /// state, so callers treat failure here as harmless.
    pub async fn end_session(&self) -> Result<()> {
        let url = self.endpoint(&["api", "logout"])?;
        let _: serde_json::Value = self.post(url, &serde_json::json!({})).await?;
        Ok(())
    }
}

#[async_trait]
impl QuizBackend for ApiClient {
    fn set_token(&self, token: Option<String>) {
        ApiClient::set_token(self, token);
    }

    async fn list_quizzes(&self) -> Result<Vec<QuizSummary>> {
        self.fetch_quizzes().await
    }

    async fn delete_quiz(&self, quiz_name: &str) -> Result<()> {
        self.remove_quiz(quiz_name).await
    }

    async fn fetch_quiz(&self, quiz_name: &str) -> Result<Quiz> {
        self.fetch_quiz_detail(quiz_name).await
    }

    async fn fetch_quiz_history(&self, quiz_name: &str) -> Result<Vec<Attempt>> {
        self.fetch_history(quiz_name).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<String> {
        self.authenticate(username, password).await
    }

    async fn logout(&self) -> Result<()> {
        self.end_session().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(DEFAULT_API_BASE_URL, None).expect("Failed to build test client")
    }

    #[test]
    fn test_endpoint_list() {
        let url = client().endpoint(&["api", "quizzes"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/quizzes");
    }

    #[test]
    fn test_endpoint_encodes_quiz_name() {
        let url = client().endpoint(&["api", "quizzes", "đề thi/1 ?"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/quizzes/%C4%91%E1%BB%81%20thi%2F1%20%3F"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = ApiClient::new("https://quiz.example.com/backend/", None).unwrap();
        let url = api.endpoint(&["api", "quizzes", "math-101"]).unwrap();
        assert_eq!(url.as_str(), "https://quiz.example.com/backend/api/quizzes/math-101");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ApiClient::new("not a url", None).is_err());
        assert!(ApiClient::new("mailto:admin@example.com", None).is_err());
    }

    #[test]
    fn test_auth_header_follows_token() {
        let api = client();
        assert!(api.auth_headers().unwrap().get(header::AUTHORIZATION).is_none());

        api.set_token(Some("abc.def".to_string()));
        let headers = api.auth_headers().unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer abc.def");

        api.set_token(None);
        assert!(api.auth_headers().unwrap().get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_clones_share_token() {
        let api = client();
        let shared = api.clone();

        api.set_token(Some("t1".to_string()));
        assert_eq!(shared.token().as_deref(), Some("t1"));
    }
}
