//! State of the quiz list page.
//!
//! `QuizListPage` owns the list, the loading flag and the page error. It
//! performs no I/O: a front-end asks it for a `LoadTicket`, runs the
//! request however it likes, and hands the result back. Tickets carry a
//! generation number; only a result for the newest generation may touch
//! the page, so a slow response issued under an old credential can never
//! overwrite a newer one.
//!
//! Deletes carry a `DeleteTicket` bound to the credential they were sent
//! with. Once the credential is cleared or replaced, their responses are
//! dropped.

use std::fmt;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::QuizSummary;

/// Shown in place of the list when loading fails
pub const LIST_FETCH_FAILED_MESSAGE: &str = "Không thể tải danh sách quiz.";

/// Shown in place of the list when a delete fails
pub const DELETE_FAILED_MESSAGE: &str = "Không thể xóa quiz.";

/// Page-level failure. The cause is deliberately not kept here; it is
/// logged where the failure is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageError {
    ListFetchFailed,
    DeleteFailed,
}

impl PageError {
    pub fn message(&self) -> &'static str {
        match self {
            PageError::ListFetchFailed => LIST_FETCH_FAILED_MESSAGE,
            PageError::DeleteFailed => DELETE_FAILED_MESSAGE,
        }
    }
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Permission to deliver one list response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Permission to deliver one delete response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteTicket {
    epoch: u64,
}

/// What `finish_load` or `finish_delete` did with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// List replaced or entry removed
    Applied,
    /// Error recorded
    Failed,
    /// Issued under a superseded load or credential; page untouched
    Stale,
}

/// What the list area should show. Exactly one applies, checked in
/// this order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListView<'a> {
    Loading,
    Error(&'static str),
    Empty,
    Cards(&'a [QuizSummary]),
}

#[derive(Debug, Default)]
pub struct QuizListPage {
    quizzes: Vec<QuizSummary>,
    loading: bool,
    error: Option<PageError>,
    generation: u64,
    /// Bumped whenever the credential is cleared or replaced
    epoch: u64,
    credential: Option<String>,
    loaded_at: Option<DateTime<Utc>>,
}

impl QuizListPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// React to the credential being set, changed, re-asserted or cleared.
    ///
    /// Every call supersedes any load still in flight. With a credential a
    /// new load starts and its ticket is returned; without one nothing is
    /// fetched and the page is reset to its empty state.
    pub fn begin_load(&mut self, credential: Option<&str>) -> Option<LoadTicket> {
        self.generation += 1;
        let credential = credential.filter(|t| !t.is_empty());
        if credential != self.credential.as_deref() {
            self.epoch += 1;
            self.credential = credential.map(str::to_string);
        }

        match credential {
            Some(_) => {
                self.loading = true;
                debug!(generation = self.generation, "Quiz list load started");
                Some(LoadTicket {
                    generation: self.generation,
                })
            }
            None => {
                self.loading = false;
                self.quizzes.clear();
                self.error = None;
                self.loaded_at = None;
                debug!(generation = self.generation, "No credential, quiz list not loaded");
                None
            }
        }
    }

    /// Deliver the response for `ticket`.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<QuizSummary>>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                current = self.generation,
                "Discarding stale quiz list response"
            );
            return LoadOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(quizzes) => {
                debug!(count = quizzes.len(), "Quiz list loaded");
                self.quizzes = quizzes;
                self.error = None;
                self.loaded_at = Some(Utc::now());
                LoadOutcome::Applied
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Quiz list fetch failed");
                self.error = Some(PageError::ListFetchFailed);
                LoadOutcome::Failed
            }
        }
    }

    /// Ticket for a delete sent with the current credential
    pub fn delete_ticket(&self) -> DeleteTicket {
        DeleteTicket { epoch: self.epoch }
    }

    /// Deliver the response of a delete request. On success the quiz is
    /// dropped locally; nothing is re-fetched.
    pub fn finish_delete(
        &mut self,
        ticket: DeleteTicket,
        quiz_name: &str,
        result: Result<()>,
    ) -> LoadOutcome {
        if ticket.epoch != self.epoch {
            debug!(quiz = %quiz_name, "Discarding delete response from a previous credential");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(()) => {
                self.quizzes.retain(|q| q.quiz_name != quiz_name);
                self.error = None;
                debug!(quiz = %quiz_name, remaining = self.quizzes.len(), "Quiz removed from list");
                LoadOutcome::Applied
            }
            Err(e) => {
                warn!(quiz = %quiz_name, error = %format!("{:#}", e), "Quiz delete failed");
                self.error = Some(PageError::DeleteFailed);
                LoadOutcome::Failed
            }
        }
    }

    pub fn view(&self) -> ListView<'_> {
        if self.loading {
            ListView::Loading
        } else if let Some(error) = self.error {
            ListView::Error(error.message())
        } else if self.quizzes.is_empty() {
            ListView::Empty
        } else {
            ListView::Cards(&self.quizzes)
        }
    }

    pub fn quizzes(&self) -> &[QuizSummary] {
        &self.quizzes
    }

    pub fn get(&self, index: usize) -> Option<&QuizSummary> {
        self.quizzes.get(index)
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<PageError> {
        self.error
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn quizzes(names: &[&str]) -> Vec<QuizSummary> {
        names.iter().map(|n| QuizSummary::new(*n)).collect()
    }

    fn names(page: &QuizListPage) -> Vec<&str> {
        page.quizzes().iter().map(|q| q.quiz_name.as_str()).collect()
    }

    fn loaded(names: &[&str]) -> QuizListPage {
        let mut page = QuizListPage::new();
        let ticket = page.begin_load(Some("jwt")).unwrap();
        page.finish_load(ticket, Ok(quizzes(names)));
        page
    }

    #[test]
    fn test_initial_state_is_empty_without_error() {
        let page = QuizListPage::new();
        assert_eq!(page.view(), ListView::Empty);
        assert!(!page.is_loading());
        assert_eq!(page.error(), None);
    }

    #[test]
    fn test_no_credential_no_load() {
        let mut page = QuizListPage::new();
        assert_eq!(page.begin_load(None), None);
        assert_eq!(page.begin_load(Some("")), None);
        assert_eq!(page.view(), ListView::Empty);
    }

    #[test]
    fn test_load_keeps_response_order() {
        let mut page = QuizListPage::new();
        let ticket = page.begin_load(Some("jwt")).unwrap();
        assert_eq!(page.view(), ListView::Loading);

        let outcome = page.finish_load(ticket, Ok(quizzes(&["zeta", "alpha", "mid"])));
        assert_eq!(outcome, LoadOutcome::Applied);
        assert!(!page.is_loading());
        assert!(page.loaded_at().is_some());
        match page.view() {
            ListView::Cards(cards) => {
                let labels: Vec<_> = cards.iter().map(|q| q.quiz_name.as_str()).collect();
                assert_eq!(labels, vec!["zeta", "alpha", "mid"]);
            }
            other => panic!("expected cards, got {:?}", other),
        }
    }

    #[test]
    fn test_load_failure_clears_loading_and_sets_error() {
        let mut page = QuizListPage::new();
        let ticket = page.begin_load(Some("jwt")).unwrap();
        let outcome = page.finish_load(ticket, Err(anyhow!("connection refused")));

        assert_eq!(outcome, LoadOutcome::Failed);
        assert!(!page.is_loading());
        assert_eq!(page.view(), ListView::Error(LIST_FETCH_FAILED_MESSAGE));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut page = QuizListPage::new();
        let old = page.begin_load(Some("old-token")).unwrap();
        let fresh = page.begin_load(Some("new-token")).unwrap();

        // Fresh resolves first, then the stale one arrives
        assert_eq!(page.finish_load(fresh, Ok(quizzes(&["mine"]))), LoadOutcome::Applied);
        assert_eq!(page.finish_load(old, Ok(quizzes(&["theirs"]))), LoadOutcome::Stale);
        assert_eq!(names(&page), vec!["mine"]);
    }

    #[test]
    fn test_stale_failure_does_not_set_error_or_stop_loading() {
        let mut page = QuizListPage::new();
        let old = page.begin_load(Some("old-token")).unwrap();
        let fresh = page.begin_load(Some("new-token")).unwrap();

        assert_eq!(page.finish_load(old, Err(anyhow!("401"))), LoadOutcome::Stale);
        assert!(page.is_loading());
        assert_eq!(page.error(), None);

        page.finish_load(fresh, Ok(vec![]));
        assert!(!page.is_loading());
    }

    #[test]
    fn test_clearing_credential_drops_inflight_load() {
        let mut page = QuizListPage::new();
        let ticket = page.begin_load(Some("jwt")).unwrap();
        assert_eq!(page.begin_load(None), None);
        assert!(!page.is_loading());

        assert_eq!(page.finish_load(ticket, Ok(quizzes(&["late"]))), LoadOutcome::Stale);
        assert!(page.is_empty());
    }

    #[test]
    fn test_delete_success_removes_only_that_quiz() {
        let mut page = loaded(&["math-101", "bio-201"]);
        let generation = page.generation();

        let ticket = page.delete_ticket();
        assert_eq!(page.finish_delete(ticket, "math-101", Ok(())), LoadOutcome::Applied);
        assert_eq!(names(&page), vec!["bio-201"]);
        // No new load was started
        assert_eq!(page.generation(), generation);
        assert!(!page.is_loading());
    }

    #[test]
    fn test_delete_failure_keeps_list_and_sets_error() {
        let mut page = loaded(&["math-101", "bio-201"]);
        let before = page.quizzes().to_vec();

        let ticket = page.delete_ticket();
        assert_eq!(
            page.finish_delete(ticket, "math-101", Err(anyhow!("500"))),
            LoadOutcome::Failed
        );
        assert_eq!(page.quizzes(), before.as_slice());
        assert_eq!(page.error(), Some(PageError::DeleteFailed));
        assert_eq!(page.view(), ListView::Error(DELETE_FAILED_MESSAGE));
    }

    #[test]
    fn test_error_cleared_by_next_success() {
        let mut page = loaded(&["math-101", "bio-201"]);
        let ticket = page.delete_ticket();
        page.finish_delete(ticket, "math-101", Err(anyhow!("500")));
        assert!(page.error().is_some());

        page.finish_delete(ticket, "bio-201", Ok(()));
        assert_eq!(page.error(), None);
        assert_eq!(names(&page), vec!["math-101"]);
    }

    #[test]
    fn test_loading_takes_precedence_over_error() {
        let mut page = loaded(&["math-101"]);
        let ticket = page.delete_ticket();
        page.finish_delete(ticket, "math-101", Err(anyhow!("500")));
        page.begin_load(Some("jwt"));
        assert_eq!(page.view(), ListView::Loading);
    }

    #[test]
    fn test_deleting_last_quiz_shows_empty_state() {
        let mut page = loaded(&["solo"]);
        let ticket = page.delete_ticket();
        page.finish_delete(ticket, "solo", Ok(()));
        assert_eq!(page.view(), ListView::Empty);
    }

    #[test]
    fn test_clearing_credential_resets_list() {
        let mut page = loaded(&["math-101", "bio-201"]);
        let ticket = page.delete_ticket();
        page.finish_delete(ticket, "math-101", Err(anyhow!("500")));

        assert_eq!(page.begin_load(None), None);
        assert!(page.is_empty());
        assert_eq!(page.error(), None);
        assert_eq!(page.loaded_at(), None);
        assert_eq!(page.view(), ListView::Empty);
    }

    #[test]
    fn test_delete_from_previous_credential_is_discarded() {
        let mut page = loaded(&["math-101", "bio-201"]);
        let ticket = page.delete_ticket();

        // Signed in as someone else before the response arrived
        let load = page.begin_load(Some("other-jwt")).unwrap();
        page.finish_load(load, Ok(quizzes(&["math-101"])));

        assert_eq!(
            page.finish_delete(ticket, "math-101", Err(anyhow!("500"))),
            LoadOutcome::Stale
        );
        assert_eq!(page.error(), None);
        assert_eq!(page.finish_delete(ticket, "math-101", Ok(())), LoadOutcome::Stale);
        assert_eq!(names(&page), vec!["math-101"]);
    }

    #[test]
    fn test_reload_with_same_credential_keeps_delete_valid() {
        let mut page = loaded(&["math-101", "bio-201"]);
        let ticket = page.delete_ticket();

        page.begin_load(Some("jwt"));
        assert_eq!(page.finish_delete(ticket, "math-101", Ok(())), LoadOutcome::Applied);
    }

    #[test]
    fn test_page_error_display() {
        assert_eq!(PageError::ListFetchFailed.to_string(), LIST_FETCH_FAILED_MESSAGE);
        assert_eq!(PageError::DeleteFailed.to_string(), DELETE_FAILED_MESSAGE);
    }
}
