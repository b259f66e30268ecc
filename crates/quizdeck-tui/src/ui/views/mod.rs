//! Route-specific content rendering.

pub mod quiz_detail;
pub mod quiz_list;
