//! Application state management for quizdeck.
//!
//! This module contains the `App` struct that hosts the quiz list page:
//! it owns the session, the page state and the current route, starts
//! background requests, and applies their results when they come back.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use quizdeck_core::models::{Attempt, Quiz, QuizSummary};
use quizdeck_core::{
    card_action, ApiError, CardAction, CardTarget, Config, DeleteTicket, ListView, LoadOutcome,
    LoadTicket, QuizBackend,
    QuizListPage, Route, Session,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Number of card columns in the quiz grid
pub const GRID_COLUMNS: usize = 2;

/// Shown in the detail view when the quiz itself cannot be fetched
const DETAIL_FAILED_MESSAGE: &str = "Không thể tải quiz.";

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Username,
            LoginFocus::Button => LoginFocus::Password,
        }
    }
}

/// Movement within the quiz card grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMove {
    Up,
    Down,
    Left,
    Right,
    First,
    Last,
}

/// State of the quiz detail view
#[derive(Debug, Default)]
pub struct DetailState {
    pub quiz_name: String,
    pub loading: bool,
    pub quiz: Option<Quiz>,
    pub history: Vec<Attempt>,
    pub error: Option<String>,
    pub scroll: usize,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned request tasks back to the main loop.
enum BackgroundResult {
    /// Response to a quiz list load
    QuizzesLoaded(LoadTicket, Result<Vec<QuizSummary>>),
    /// Response to deleting the named quiz
    QuizDeleted(DeleteTicket, String, Result<()>),
    /// Quiz detail and the user's attempt history for the named quiz
    QuizDetail(String, Result<Quiz>, Vec<Attempt>),
    /// Login response for the named user
    LoggedIn(String, Result<String>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    api: Arc<dyn QuizBackend>,

    // Page and navigation
    pub page: QuizListPage,
    pub route: Route,
    pub state: AppState,
    pub selection: usize,
    pub card_target: CardTarget,
    pub detail: DetailState,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,
    pub login_pending: bool,

    // Background task channel
    result_rx: mpsc::Receiver<BackgroundResult>,
    result_tx: mpsc::Sender<BackgroundResult>,

    // Status message
    pub status_message: Option<String>,

    persist_config: bool,
}

impl App {
    /// Create the application around an already loaded session.
    /// The backend receives the session's credential immediately.
    pub fn new(config: Config, session: Session, api: Arc<dyn QuizBackend>) -> Self {
        api.set_token(session.token().map(str::to_string));

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Get credentials from env vars or config
        let login_username = std::env::var("QUIZDECK_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();

        let login_password = std::env::var("QUIZDECK_PASSWORD").unwrap_or_default();

        Self {
            config,
            session,
            api,

            page: QuizListPage::new(),
            route: Route::Home,
            state: AppState::Normal,
            selection: 0,
            card_target: CardTarget::Body,
            detail: DetailState::default(),

            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_error: None,
            login_pending: false,

            result_rx: rx,
            result_tx: tx,

            status_message: None,
            persist_config: true,
        }
    }

    // =========================================================================
    // Quiz List
    // =========================================================================

    /// Mount the quiz list page: load the list if a credential is present.
    /// Without one the page stays empty; it does not redirect to login.
    pub fn mount(&mut self) {
        self.credential_changed();
        if !self.session.is_authenticated() {
            self.status_message = Some("Not signed in. Press [i] to sign in.".to_string());
        }
    }

    /// Hand the current credential to the backend and (re)load the list
    fn credential_changed(&mut self) {
        let token = self.session.token().map(str::to_string);
        self.api.set_token(token.clone());
        if let Some(ticket) = self.page.begin_load(token.as_deref()) {
            self.spawn_list_load(ticket);
        }
    }

    /// Reload the list with the current credential
    pub fn refresh_quizzes(&mut self) {
        match self.page.begin_load(self.session.token()) {
            Some(ticket) => {
                self.status_message = Some("Refreshing...".to_string());
                self.spawn_list_load(ticket);
            }
            None => {
                self.status_message = Some("Not signed in. Press [i] to sign in.".to_string());
            }
        }
    }

    fn spawn_list_load(&self, ticket: LoadTicket) {
        let api = Arc::clone(&self.api);
        let tx = self.result_tx.clone();
        debug!(generation = ticket.generation(), "Spawning quiz list load");

        tokio::spawn(async move {
            let result = api.list_quizzes().await;
            Self::send_result(&tx, BackgroundResult::QuizzesLoaded(ticket, result)).await;
        });
    }

    /// Delete a quiz on the backend; the list changes when the response arrives
    pub fn delete_quiz(&mut self, quiz_name: String) {
        if !self.session.is_authenticated() {
            self.status_message = Some("Not signed in. Press [i] to sign in.".to_string());
            return;
        }

        info!(quiz = %quiz_name, "Deleting quiz");
        self.status_message = Some(format!("Deleting {}...", quiz_name));

        let ticket = self.page.delete_ticket();
        let api = Arc::clone(&self.api);
        let tx = self.result_tx.clone();

        tokio::spawn(async move {
            let result = api.delete_quiz(&quiz_name).await;
            Self::send_result(&tx, BackgroundResult::QuizDeleted(ticket, quiz_name, result)).await;
        });
    }

    /// The selected card, if cards are currently shown
    pub fn selected_quiz(&self) -> Option<&QuizSummary> {
        match self.page.view() {
            ListView::Cards(cards) => cards.get(self.selection),
            _ => None,
        }
    }

    /// Activate one hit target of the selected card
    pub fn activate(&mut self, target: CardTarget) {
        let quiz_name = match self.selected_quiz() {
            Some(quiz) => quiz.quiz_name.clone(),
            None => return,
        };

        match card_action(target, &quiz_name) {
            CardAction::Navigate(route) => self.navigate(route),
            CardAction::Delete(name) => self.delete_quiz(name),
        }
    }

    pub fn move_selection(&mut self, movement: GridMove) {
        let len = self.page.len();
        if len == 0 {
            return;
        }

        let current = self.selection.min(len - 1);
        let column = current % GRID_COLUMNS;
        self.selection = match movement {
            GridMove::Left if column > 0 => current - 1,
            GridMove::Right if column + 1 < GRID_COLUMNS && current + 1 < len => current + 1,
            GridMove::Up if current >= GRID_COLUMNS => current - GRID_COLUMNS,
            GridMove::Down if current + GRID_COLUMNS < len => current + GRID_COLUMNS,
            GridMove::First => 0,
            GridMove::Last => len - 1,
            _ => current,
        };
        self.card_target = CardTarget::Body;
    }

    fn clamp_selection(&mut self) {
        self.selection = self.selection.min(self.page.len().saturating_sub(1));
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Move to another view. Returning to the list mounts it again.
    pub fn navigate(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        debug!(from = %self.route, to = %route, "Navigating");

        self.route = route.clone();
        self.card_target = CardTarget::Body;
        self.status_message = None;

        match route {
            Route::Home => self.mount(),
            Route::Login => self.start_login(),
            Route::QuizDetail(name) => self.fetch_detail(name),
            Route::EditQuiz(_) | Route::AddQuiz | Route::Upload => {}
        }
    }

    fn fetch_detail(&mut self, quiz_name: String) {
        self.detail = DetailState {
            quiz_name: quiz_name.clone(),
            loading: true,
            ..Default::default()
        };

        let api = Arc::clone(&self.api);
        let tx = self.result_tx.clone();

        tokio::spawn(async move {
            let (quiz, history) = futures::future::join(
                api.fetch_quiz(&quiz_name),
                api.fetch_quiz_history(&quiz_name),
            )
            .await;

            let history = history.unwrap_or_else(|e| {
                warn!(quiz = %quiz_name, error = %e, "Quiz history fetch failed");
                Vec::new()
            });

            Self::send_result(&tx, BackgroundResult::QuizDetail(quiz_name, quiz, history)).await;
        });
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Clear the stored credential and go to the login view
    pub fn logout(&mut self) {
        info!("Logging out");

        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            if let Err(e) = api.logout().await {
                debug!(error = %e, "Logout notification failed");
            }
        });

        if let Err(e) = self.session.sign_out() {
            warn!(error = %e, "Failed to remove stored credential");
        }
        self.credential_changed();
        self.navigate(Route::Login);
    }

    /// Prepare the login form
    pub fn start_login(&mut self) {
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Submit the login form
    pub fn attempt_login(&mut self) {
        if self.login_pending {
            return;
        }

        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return;
        }

        self.login_error = None;
        self.login_pending = true;

        let api = Arc::clone(&self.api);
        let tx = self.result_tx.clone();

        tokio::spawn(async move {
            let result = api.login(&username, &password).await;
            Self::send_result(&tx, BackgroundResult::LoggedIn(username, result)).await;
        });
    }

    fn finish_login(&mut self, username: String, result: Result<String>) {
        self.login_pending = false;

        match result {
            Ok(token) => {
                if let Err(e) = self.session.sign_in(token) {
                    warn!(error = %e, "Failed to persist credential");
                }

                self.config.last_username = Some(username);
                if self.persist_config {
                    if let Err(e) = self.config.save() {
                        warn!(error = %e, "Failed to save config");
                    }
                }

                self.login_password.clear();
                info!("Login successful");
                self.navigate(Route::Home);
            }
            Err(e) => {
                error!(error = %format!("{:#}", e), "Login failed");
                self.login_error = Some(Self::login_error_message(&e));
            }
        }
    }

    /// Provide user-friendly error messages based on error type
    fn login_error_message(e: &anyhow::Error) -> String {
        match e.chain().find_map(|cause| cause.downcast_ref::<ApiError>()) {
            Some(ApiError::Unauthorized) | Some(ApiError::BadRequest(_)) => {
                "Invalid username or password".to_string()
            }
            Some(ApiError::NetworkError(err)) if err.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            Some(ApiError::NetworkError(_)) => {
                "Unable to connect to server. Check that the backend is running.".to_string()
            }
            _ => format!("Login failed: {}", e),
        }
    }

    // =========================================================================
    // Background Results
    // =========================================================================

    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if tx.send(result).await.is_err() {
            debug!("Result channel closed, dropping background result");
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            self.process_result(result);
        }
    }

    fn process_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::QuizzesLoaded(ticket, result) => {
                self.page.finish_load(ticket, result);
                self.clamp_selection();
                if !self.page.is_loading() {
                    self.status_message = None;
                }
            }
            BackgroundResult::QuizDeleted(ticket, quiz_name, result) => {
                self.status_message = match self.page.finish_delete(ticket, &quiz_name, result) {
                    LoadOutcome::Applied => Some(format!("Deleted {}", quiz_name)),
                    LoadOutcome::Failed | LoadOutcome::Stale => None,
                };
                self.clamp_selection();
            }
            BackgroundResult::QuizDetail(quiz_name, quiz, history) => {
                let current = matches!(&self.route, Route::QuizDetail(name) if *name == quiz_name);
                if !current {
                    debug!(quiz = %quiz_name, "Discarding detail for a view no longer shown");
                    return;
                }
                self.detail.loading = false;
                self.detail.history = history;
                match quiz {
                    Ok(quiz) => self.detail.quiz = Some(quiz),
                    Err(e) => {
                        warn!(quiz = %quiz_name, error = %format!("{:#}", e), "Quiz detail fetch failed");
                        self.detail.error = Some(DETAIL_FAILED_MESSAGE.to_string());
                    }
                }
            }
            BackgroundResult::LoggedIn(username, result) => {
                self.finish_login(username, result);
            }
        }
    }

    /// Status bar hint for the time of the last successful load
    pub fn last_loaded(&self) -> String {
        self.page
            .loaded_at()
            .map(crate::utils::format_time)
            .unwrap_or_else(|| "never".to_string())
    }
}

#[cfg(test)]
impl App {
    /// Wait for exactly one background result and apply it
    pub(crate) async fn settle(&mut self) {
        let result = self.result_rx.recv().await.expect("result channel closed");
        self.process_result(result);
    }

    /// True when no background result is waiting
    pub(crate) fn no_pending_results(&mut self) -> bool {
        self.result_rx.try_recv().is_err()
    }

    pub(crate) fn disable_config_writes(&mut self) {
        self.persist_config = false;
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
