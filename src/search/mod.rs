//! Outbound search against the remote story index.
//!
//! - [`SearchClient`] - reqwest client with endpoint validation, optional
//!   timeout, and a capped response body
//! - [`StorySource`] - the seam the fetch orchestrator depends on

mod client;

pub use client::{SearchClient, SearchError, StorySource, DEFAULT_ENDPOINT};
