//! Data models for quiz backend entities.
//!
//! - `QuizSummary`: one entry of the quiz list, keyed by `quiz_name`
//! - `Quiz`, `Question`: full quiz detail
//! - `Attempt`: one scored submission from the quiz history

pub mod quiz;

pub use quiz::{Attempt, LoginRequest, LoginResponse, Question, Quiz, QuizSummary};
