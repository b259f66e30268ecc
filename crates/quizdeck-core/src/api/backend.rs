use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Attempt, Quiz, QuizSummary};

/// Authenticated access to the quiz backend.
///
/// Implementations own the bearer token; callers set it once when the
/// credential changes and never pass it per request.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// Replace (or clear) the credential used for later requests
    fn set_token(&self, token: Option<String>);

    /// `GET /api/quizzes`
    async fn list_quizzes(&self) -> Result<Vec<QuizSummary>>;

    /// `DELETE /api/quizzes/{quiz_name}`
    async fn delete_quiz(&self, quiz_name: &str) -> Result<()>;

    /// `GET /api/quizzes/{quiz_name}`
    async fn fetch_quiz(&self, quiz_name: &str) -> Result<Quiz>;

    /// `GET /api/quizzes/{quiz_name}/history`
    async fn fetch_quiz_history(&self, quiz_name: &str) -> Result<Vec<Attempt>>;

    /// `POST /api/login`, returning the issued token
    async fn login(&self, username: &str, password: &str) -> Result<String>;

    /// `POST /api/logout`
    async fn logout(&self) -> Result<()>;
}
