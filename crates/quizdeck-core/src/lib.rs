//! Core library for quizdeck.
//!
//! Everything a front-end needs to host the quiz list page:
//!
//! - `auth`: the stored bearer credential and persistent client storage
//! - `api`: the authenticated backend client
//! - `page`: list, loading and error state of the page
//! - `routes`: client-side routes and card hit targets
//! - `config`: user configuration
//!
//! Nothing in this crate draws to a screen.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod page;
pub mod routes;

pub use api::{ApiClient, ApiError, QuizBackend};
pub use auth::{ClientStorage, Session};
pub use config::Config;
pub use page::{DeleteTicket, ListView, LoadOutcome, LoadTicket, PageError, QuizListPage};
pub use routes::{card_action, CardAction, CardTarget, Route};
