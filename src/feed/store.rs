use super::reducer::{reduce, FeedAction};
use super::state::{FeedState, StoryId};

/// Monotonic id of one fetch lifecycle (`FetchStarted` plus its terminal action).
pub type Generation = u64;

/// Owner of the single `FeedState`.
///
/// Every change goes through [`reduce`]; the state is replaced, never edited.
/// Fetch lifecycle actions arrive tagged with their generation so a terminal
/// action from a superseded request can be dropped instead of overwriting a
/// newer result.
#[derive(Debug, Default)]
pub struct FeedStore {
    state: FeedState,
    /// Newest generation whose `FetchStarted` has been applied.
    latest_started: Option<Generation>,
    discard_stale: bool,
}

impl FeedStore {
    pub fn new(discard_stale: bool) -> Self {
        Self {
            state: FeedState::default(),
            latest_started: None,
            discard_stale,
        }
    }

    /// Read-only snapshot for rendering.
    pub fn state(&self) -> &FeedState {
        &self.state
    }

    /// Apply a lifecycle action produced by the fetch orchestrator.
    ///
    /// Returns `false` when the action was discarded as stale.
    pub fn apply_fetch(&mut self, generation: Generation, action: FeedAction) -> bool {
        if action.is_terminal() && self.is_stale(generation) {
            tracing::debug!(
                generation,
                latest = ?self.latest_started,
                action = action.kind(),
                "Discarding stale fetch result"
            );
            return false;
        }

        if matches!(action, FeedAction::FetchStarted) {
            self.latest_started = Some(self.latest_started.map_or(generation, |g| g.max(generation)));
        }

        self.dispatch(action);
        true
    }

    /// Optimistic local removal; no network involved.
    pub fn dismiss(&mut self, id: StoryId) {
        self.dispatch(FeedAction::ItemRemoved(id));
    }

    fn dispatch(&mut self, action: FeedAction) {
        if tracing::enabled!(tracing::Level::TRACE) {
            match action.encode() {
                Ok(wire) => tracing::trace!(action = %wire, "Reducing feed action"),
                Err(e) => tracing::trace!(action = action.kind(), error = %e, "Reducing feed action"),
            }
        }
        self.state = reduce(&self.state, action);
    }

    fn is_stale(&self, generation: Generation) -> bool {
        self.discard_stale && self.latest_started.is_some_and(|latest| generation < latest)
    }
}
