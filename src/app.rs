use crate::config::Config;
use crate::feed::{FeedAction, FeedState, FeedStore, Generation, Story, StoryId};
use crate::storage::PreferenceStore;
use anyhow::Result;
use reqwest::redirect::Policy;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;

/// Preference key holding the last committed search term.
pub const SEARCH_KEY: &str = "search";

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Redirect policy: at most 3 hops, loops rejected, chain logged.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// Shared HTTP client for the search endpoint.
///
/// No client-wide timeout: the per-request limit comes from config so that
/// "0 = wait forever" is honored.
pub fn build_http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .redirect(create_redirect_policy())
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(std::time::Duration::from_secs(30))
        .tcp_keepalive(std::time::Duration::from_secs(60))
        .build()?;
    Ok(client)
}

// ============================================================================
// Events and Focus
// ============================================================================

/// Events from background tasks
pub enum AppEvent {
    /// A fetch lifecycle action from the orchestrator.
    ///
    /// Fields:
    /// - `generation`: which trigger produced it (for stale result detection)
    /// - `action`: `FetchStarted`, `FetchSucceeded` or `FetchFailed`
    Feed {
        generation: Generation,
        action: FeedAction,
    },
    /// A background task panicked.
    TaskPanicked { task: &'static str, error: String },
}

/// Which widget receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Stories,
}

// ============================================================================
// App
// ============================================================================

/// View-side state plus the handles the core needs.
///
/// The feed itself lives in `FeedStore`; `App` only forwards intents to it
/// and to the committed search term channel.
pub struct App {
    pub feed: FeedStore,
    /// Committed term (what the orchestrator fetches).
    pub search_term: String,
    /// In-progress edit shown in the input box.
    pub search_input: String,
    pub focus: Focus,
    pub selected: usize,
    pub live_search: bool,
    /// Frame of the loading spinner, advanced on ticks while `Loading`.
    pub spinner_frame: usize,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    prefs: Arc<dyn PreferenceStore>,
    term_tx: watch::Sender<String>,
}

impl App {
    /// Build the view state from stored preferences.
    ///
    /// The stored term wins (an empty stored term is kept as-is); otherwise
    /// the configured default is used. The resulting term is written back, and
    /// the returned receiver is what the fetch orchestrator subscribes to.
    pub async fn mount(
        prefs: Arc<dyn PreferenceStore>,
        config: &Config,
    ) -> (Self, watch::Receiver<String>) {
        let term = match prefs.get(SEARCH_KEY).await {
            Some(stored) => stored,
            None => {
                tracing::debug!(default = %config.default_search_term, "No stored search term");
                config.default_search_term.clone()
            }
        };
        prefs.set(SEARCH_KEY, &term).await;

        let (term_tx, term_rx) = watch::channel(term.clone());

        let app = Self {
            feed: FeedStore::new(config.discard_stale_responses),
            search_input: term.clone(),
            search_term: term,
            focus: Focus::Search,
            selected: 0,
            live_search: config.live_search,
            spinner_frame: 0,
            status_message: None,
            needs_redraw: true,
            prefs,
            term_tx,
        };
        (app, term_rx)
    }

    /// Read-only snapshot of the feed.
    pub fn feed_state(&self) -> &FeedState {
        self.feed.state()
    }

    pub fn selected_story(&self) -> Option<&Story> {
        self.feed.state().get(self.selected)
    }

    // ========================================================================
    // Intents
    // ========================================================================

    /// Commit a new search term: persist it, then notify the orchestrator.
    ///
    /// Committing the current term again is a no-op; use [`App::on_refresh`]
    /// to re-run the same query.
    pub async fn on_search_term_changed(&mut self, term: String) {
        if term == self.search_term {
            return;
        }

        self.prefs.set(SEARCH_KEY, &term).await;
        tracing::debug!(term = %term, "Search term committed");

        self.search_input.clone_from(&term);
        self.search_term.clone_from(&term);
        self.term_tx.send_replace(term);
    }

    /// Remove a story from the displayed list.
    pub fn on_item_dismissed(&mut self, id: StoryId) {
        tracing::debug!(id = %id, "Dismissing story");
        self.feed.dismiss(id);
        self.clamp_selection();
    }

    /// Re-run the current query without changing the term.
    pub fn on_refresh(&mut self) {
        if self.search_term.is_empty() {
            self.set_status("Nothing to refresh: search term is empty");
            return;
        }
        self.term_tx.send_modify(|_| {});
    }

    /// Apply a lifecycle action from the orchestrator.
    pub fn apply_feed_event(&mut self, generation: Generation, action: FeedAction) {
        if self.feed.apply_fetch(generation, action) {
            self.clamp_selection();
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn select_next(&mut self) {
        let len = self.feed.state().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep the selection inside the list after it shrinks or is replaced.
    fn clamp_selection(&mut self) {
        let len = self.feed.state().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    // ========================================================================
    // Status Line
    // ========================================================================

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if older than 3 seconds.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}
