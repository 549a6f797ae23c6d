//! The story feed: state, transitions, and the fetch lifecycle.
//!
//! # Architecture
//!
//! - [`state`] - `Story`, `FeedStatus`, `FeedState`
//! - [`reducer`] - the pure `reduce(state, action)` function and `FeedAction`
//! - [`store`] - sole owner of `FeedState`, with the stale-result guard
//! - [`orchestrator`] - turns committed search terms into lifecycle actions
//!
//! # Example
//!
//! ```ignore
//! use hnstories::feed::{spawn_orchestrator, FeedStore};
//!
//! let (term_tx, term_rx) = tokio::sync::watch::channel("React".to_string());
//! spawn_orchestrator(source, event_tx, term_rx);
//!
//! // in the UI loop
//! store.apply_fetch(generation, action);
//! ```

mod orchestrator;
mod reducer;
mod state;
mod store;

pub use orchestrator::{fetch_action, spawn_orchestrator, FetchOrchestrator};
pub use reducer::{reduce, FeedAction, FeedError};
pub use state::{FeedState, FeedStatus, Story, StoryId};
pub use store::{FeedStore, Generation};
