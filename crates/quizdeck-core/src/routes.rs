//! Client-side routes and card hit targets.
//!
//! A card has three hit targets: its body and two nested controls. Each
//! target resolves to exactly one `CardAction`; activating a nested control
//! never also triggers the body's navigation.

use std::fmt;

/// Views the quiz list page navigates to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The quiz list itself
    Home,
    Login,
    QuizDetail(String),
    EditQuiz(String),
    AddQuiz,
    Upload,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::QuizDetail(name) => format!("/quiz/{}", name),
            Route::EditQuiz(name) => format!("/edit/{}", name),
            Route::AddQuiz => "/add-quiz".to_string(),
            Route::Upload => "/upload".to_string(),
        }
    }

    /// Unencoded path segments; a quiz name is always exactly one segment
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Route::Home => Vec::new(),
            Route::Login => vec!["login"],
            Route::QuizDetail(name) => vec!["quiz", name.as_str()],
            Route::EditQuiz(name) => vec!["edit", name.as_str()],
            Route::AddQuiz => vec!["add-quiz"],
            Route::Upload => vec!["upload"],
        }
    }

    /// Parse a path produced by `path`. Trailing slashes are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => return Some(Route::Home),
            "/login" => return Some(Route::Login),
            "/add-quiz" => return Some(Route::AddQuiz),
            "/upload" => return Some(Route::Upload),
            _ => {}
        }

        if let Some(name) = trimmed.strip_prefix("/quiz/").filter(|n| !n.is_empty()) {
            return Some(Route::QuizDetail(name.to_string()));
        }
        if let Some(name) = trimmed.strip_prefix("/edit/").filter(|n| !n.is_empty()) {
            return Some(Route::EditQuiz(name.to_string()));
        }
        None
    }

    /// Display title for the view
    pub fn title(&self) -> String {
        match self {
            Route::Home => "Quiz list".to_string(),
            Route::Login => "Login".to_string(),
            Route::QuizDetail(name) => name.clone(),
            Route::EditQuiz(name) => format!("Edit {}", name),
            Route::AddQuiz => "Add quiz".to_string(),
            Route::Upload => "Upload PDF".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Hit target inside a quiz card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTarget {
    Body,
    Delete,
    Edit,
}

impl CardTarget {
    /// Get the next target (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            CardTarget::Body => CardTarget::Delete,
            CardTarget::Delete => CardTarget::Edit,
            CardTarget::Edit => CardTarget::Body,
        }
    }

    /// Get the previous target (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            CardTarget::Body => CardTarget::Edit,
            CardTarget::Delete => CardTarget::Body,
            CardTarget::Edit => CardTarget::Delete,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardTarget::Body => "Open",
            CardTarget::Delete => "Xóa",
            CardTarget::Edit => "Sửa",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    Navigate(Route),
    Delete(String),
}

/// Resolve activation of `target` on the card for `quiz_name`
pub fn card_action(target: CardTarget, quiz_name: &str) -> CardAction {
    match target {
        CardTarget::Body => CardAction::Navigate(Route::QuizDetail(quiz_name.to_string())),
        CardTarget::Delete => CardAction::Delete(quiz_name.to_string()),
        CardTarget::Edit => CardAction::Navigate(Route::EditQuiz(quiz_name.to_string())),
    }
}
