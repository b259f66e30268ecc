//! REST API client module for the quiz backend.
//!
//! This module provides the `ApiClient` for listing, inspecting and
//! deleting quizzes, and the `QuizBackend` trait front-ends program
//! against so the page logic can run without a network.
//!
//! The API uses bearer token authentication obtained from `POST /api/login`.

pub mod backend;
pub mod client;
pub mod error;

pub use backend::QuizBackend;
pub use client::{ApiClient, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::ApiError;
