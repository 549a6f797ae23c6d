//! Terminal client for the Hacker News search index.
//!
//! The feed core (`feed`) is a pure reducer plus a fetch orchestrator; the
//! search client and the preference store plug into it through traits, and
//! `ui` drives everything from a single event loop.

pub mod app;
pub mod config;
pub mod feed;
pub mod search;
pub mod storage;
pub mod ui;
pub mod util;
