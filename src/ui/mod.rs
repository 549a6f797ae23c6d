//! Terminal User Interface module.
//!
//! The view renders the feed snapshot and search term, and forwards the
//! user's intents (commit term, dismiss, refresh) to `App`.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - Layout and header/notice rendering
//! - `search_bar` - Search input widget
//! - `stories` - Story list widget
//! - `status` - Status bar widget

mod events;
mod input;
mod loop_runner;
mod render;
mod search_bar;
mod status;
mod stories;

// Re-export the public API
pub use loop_runner::{run, Action};
