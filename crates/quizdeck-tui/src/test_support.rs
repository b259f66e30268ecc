//! Shared fixtures for the TUI's unit tests.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use quizdeck_core::auth::{MemoryStorage, TOKEN_KEY};
use quizdeck_core::models::{Attempt, Quiz, QuizSummary};
use quizdeck_core::{ApiError, Config, ListView, QuizBackend, Session};

use crate::app::App;

#[derive(Default)]
pub struct FakeState {
    pub token: Option<String>,
    pub quizzes: Vec<QuizSummary>,
    pub fail_list: bool,
    pub fail_delete: bool,
    pub calls: Vec<String>,
}

/// In-memory backend that records every call it receives
#[derive(Default)]
pub struct FakeBackend {
    pub state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn with_quizzes(names: &[&str]) -> Arc<Self> {
        let backend = Self::default();
        backend.state.lock().unwrap().quizzes =
            names.iter().map(|n| QuizSummary::new(*n)).collect();
        Arc::new(backend)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls().iter().filter(|c| c.starts_with("list")).count()
    }
}

#[async_trait]
impl QuizBackend for FakeBackend {
    fn set_token(&self, token: Option<String>) {
        self.state.lock().unwrap().token = token;
    }

    async fn list_quizzes(&self) -> Result<Vec<QuizSummary>> {
        let mut state = self.state.lock().unwrap();
        let call = format!("list {}", state.token.clone().unwrap_or_default());
        state.calls.push(call);
        if state.fail_list {
            return Err(anyhow!("status 500"));
        }
        Ok(state.quizzes.clone())
    }

    async fn delete_quiz(&self, quiz_name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete {}", quiz_name));
        if state.fail_delete {
            return Err(anyhow!("status 500"));
        }
        state.quizzes.retain(|q| q.quiz_name != quiz_name);
        Ok(())
    }

    async fn fetch_quiz(&self, quiz_name: &str) -> Result<Quiz> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("quiz {}", quiz_name));
        Ok(Quiz {
            quiz_name: quiz_name.to_string(),
            questions: Vec::new(),
            extra: Default::default(),
        })
    }

    async fn fetch_quiz_history(&self, quiz_name: &str) -> Result<Vec<Attempt>> {
        self.state.lock().unwrap().calls.push(format!("history {}", quiz_name));
        Ok(vec![Attempt {
            username: "lan".to_string(),
            answers: Vec::new(),
            score: 3,
        }])
    }

    async fn login(&self, username: &str, password: &str) -> Result<String> {
        self.state.lock().unwrap().calls.push(format!("login {}", username));
        if password == "secret" {
            Ok("issued-token".to_string())
        } else {
            Err(ApiError::BadRequest("Mật khẩu không chính xác".to_string()).into())
        }
    }

    async fn logout(&self) -> Result<()> {
        self.state.lock().unwrap().calls.push("logout".to_string());
        Ok(())
    }
}

pub fn build_app(storage: MemoryStorage, backend: Arc<FakeBackend>) -> App {
    let session = Session::load(Box::new(storage));
    let mut app = App::new(Config::default(), session, backend);
    app.disable_config_writes();
    app
}

/// Wait for exactly one background result and apply it
pub async fn settle(app: &mut App) {
    app.settle().await;
}

pub fn card_names(app: &App) -> Vec<String> {
    match app.page.view() {
        ListView::Cards(cards) => cards.iter().map(|q| q.quiz_name.clone()).collect(),
        _ => Vec::new(),
    }
}

/// An app signed in as "jwt" whose first list load has completed
pub async fn mounted(names: &[&str]) -> (App, Arc<FakeBackend>, MemoryStorage) {
    let storage = MemoryStorage::with_item(TOKEN_KEY, "jwt");
    let backend = FakeBackend::with_quizzes(names);
    let mut app = build_app(storage.clone(), Arc::clone(&backend));
    app.mount();
    settle(&mut app).await;
    (app, backend, storage)
}
