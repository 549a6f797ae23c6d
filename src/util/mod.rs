//! Utility functions for common operations.
//!
//! - **Text**: Unicode-aware truncation, control-character stripping, ages
//! - **URLs**: validation before opening a story in the browser
//! - **Tasks**: panic capture for background tasks

mod links;
mod task;
mod text;

pub use links::{validate_url_for_open, OpenUrlError};
pub use task::catch_task_panic;
pub use text::{format_age, strip_control_chars, truncate_to_width};

/// Maximum search term length accepted from the input box.
pub const MAX_SEARCH_TERM_LENGTH: usize = 256;
