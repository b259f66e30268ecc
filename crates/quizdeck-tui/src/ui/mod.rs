//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering, layout and overlays
//! - `input`: Keyboard event handling per route
//! - `styles`: Color schemes and text styling
//! - `views`: Route-specific content (quiz grid, quiz detail)

pub mod input;
pub mod render;
pub mod styles;
pub mod views;
