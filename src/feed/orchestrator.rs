use crate::app::AppEvent;
use crate::search::StorySource;
use crate::util::catch_task_panic;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::reducer::FeedAction;
use super::state::Story;
use super::store::Generation;

/// Bridges the committed search term to the feed store.
///
/// Each trigger emits `FetchStarted` on the event channel, then spawns the
/// request and emits exactly one terminal action (`FetchSucceeded` or
/// `FetchFailed`) under the same generation. An empty term emits nothing.
///
/// A panic inside the request task still ends the lifecycle with `FetchFailed`.
/// Superseded requests are not cancelled; the store decides whether a late
/// terminal action still applies.
pub struct FetchOrchestrator {
    source: Arc<dyn StorySource>,
    events: mpsc::Sender<AppEvent>,
    last_generation: Generation,
}

impl FetchOrchestrator {
    pub fn new(source: Arc<dyn StorySource>, events: mpsc::Sender<AppEvent>) -> Self {
        Self {
            source,
            events,
            last_generation: 0,
        }
    }

    /// Run one fetch lifecycle for `term`.
    ///
    /// `FetchStarted` is on the channel before this returns, so it is always
    /// observed ahead of the terminal action sent by the returned task.
    /// Returns `None` when nothing was issued (empty term, or the receiver is gone).
    pub async fn trigger(&mut self, term: &str) -> Option<JoinHandle<()>> {
        if term.is_empty() {
            tracing::debug!("Empty search term, skipping fetch");
            return None;
        }

        self.last_generation = self.last_generation.wrapping_add(1);
        let generation = self.last_generation;

        let started = AppEvent::Feed {
            generation,
            action: FeedAction::FetchStarted,
        };
        if self.events.send(started).await.is_err() {
            tracing::debug!(generation, "Event receiver dropped, skipping fetch");
            return None;
        }

        let source = Arc::clone(&self.source);
        let tx = self.events.clone();
        let term = term.to_owned();

        tracing::debug!(term = %term, generation, "Spawning story fetch");

        Some(tokio::spawn(async move {
            let action = match catch_task_panic(fetch_action(source.as_ref(), &term)).await {
                Ok(action) => action,
                Err(panic_msg) => {
                    let _ = tx
                        .send(AppEvent::TaskPanicked {
                            task: "story_fetch",
                            error: panic_msg,
                        })
                        .await;
                    FeedAction::FetchFailed
                }
            };
            if let Err(e) = tx.send(AppEvent::Feed { generation, action }).await {
                tracing::warn!(error = %e, generation, "Failed to send fetch result (receiver dropped)");
            }
        }))
    }

    /// Fetch on every committed term until the sender side is dropped.
    ///
    /// The value present at subscription time counts as the first change, so
    /// the initial term is fetched on mount. Rapid commits that land before
    /// this loop wakes collapse into the latest term.
    pub async fn run(mut self, mut term_rx: watch::Receiver<String>) {
        loop {
            let term = term_rx.borrow_and_update().clone();
            self.trigger(&term).await;

            if term_rx.changed().await.is_err() {
                tracing::debug!("Search term channel closed, stopping orchestrator");
                break;
            }
        }
    }
}

/// Spawn the orchestrator loop as a background task.
pub fn spawn_orchestrator(
    source: Arc<dyn StorySource>,
    events: mpsc::Sender<AppEvent>,
    term_rx: watch::Receiver<String>,
) -> JoinHandle<()> {
    tokio::spawn(FetchOrchestrator::new(source, events).run(term_rx))
}

/// Perform the request and fold any error into `FetchFailed`.
pub async fn fetch_action(source: &dyn StorySource, term: &str) -> FeedAction {
    match source.search(term).await {
        Ok(stories) => {
            tracing::info!(term = %term, count = stories.len(), "Fetched stories");
            FeedAction::FetchSucceeded(dedup_by_id(stories))
        }
        Err(e) => {
            tracing::warn!(term = %term, error = %e, "Story fetch failed");
            FeedAction::FetchFailed
        }
    }
}

/// Keep the first story for each id, preserving response order.
fn dedup_by_id(stories: Vec<Story>) -> Vec<Story> {
    let mut seen = HashSet::with_capacity(stories.len());
    let before = stories.len();
    let unique: Vec<Story> = stories
        .into_iter()
        .filter(|s| seen.insert(s.id.clone()))
        .collect();
    if unique.len() != before {
        tracing::debug!(dropped = before - unique.len(), "Dropped duplicate story ids");
    }
    unique
}
