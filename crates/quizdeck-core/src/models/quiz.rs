use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of `GET /api/quizzes`.
///
/// Only `quiz_name` is interpreted; every other field the backend sends
/// (`_id`, `questions`, `attempts`, ...) is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub quiz_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuizSummary {
    pub fn new(quiz_name: impl Into<String>) -> Self {
        Self {
            quiz_name: quiz_name.into(),
            extra: Map::new(),
        }
    }

    /// Number of questions, when the backend included them in the listing
    pub fn question_count(&self) -> Option<usize> {
        self.extra
            .get("questions")
            .and_then(Value::as_array)
            .map(Vec::len)
    }

    /// Backend document id, when present
    pub fn id(&self) -> Option<&str> {
        self.extra.get("_id").and_then(Value::as_str)
    }
}

/// A single question as stored by the backend.
///
/// Older documents carry the key as `answer`, newer ones as `correct_answer`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl Question {
    pub fn correct(&self) -> Option<&str> {
        self.correct_answer
            .as_deref()
            .or(self.answer.as_deref())
    }
}

/// Full quiz document from `GET /api/quizzes/{quiz_name}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub quiz_name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One scored submission from `GET /api/quizzes/{quiz_name}/history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub username: String,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub score: u32,
}

impl Attempt {
    pub fn score_display(&self, total: usize) -> String {
        format!("{}/{}", self.score, total)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}
