//! Pure state transitions for the story feed.
//!
//! `reduce` never performs I/O and never reads the clock; everything it
//! needs arrives in the action payload.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use super::state::{FeedState, FeedStatus, Story, StoryId};

#[derive(Debug, Error)]
pub enum FeedError {
    /// An action tag with no transition. This is a programming error in
    /// whatever produced the action, never a user-facing failure.
    #[error("Unknown feed action: {0}")]
    UnknownAction(String),

    #[error("Malformed feed action: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Every legal feed transition.
///
/// The enum is closed, so `reduce` is total. Tagged JSON (the `type` names
/// below) is the wire form used when actions are logged or replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum FeedAction {
    #[serde(rename = "STORIES_FETCH_INIT")]
    FetchStarted,
    #[serde(rename = "STORIES_FETCH_SUCCESS")]
    FetchSucceeded(Vec<Story>),
    #[serde(rename = "STORIES_FETCH_FAILURE")]
    FetchFailed,
    #[serde(rename = "REMOVE_ITEM")]
    ItemRemoved(StoryId),
}

impl FeedAction {
    const KNOWN_TAGS: [&'static str; 4] = [
        "STORIES_FETCH_INIT",
        "STORIES_FETCH_SUCCESS",
        "STORIES_FETCH_FAILURE",
        "REMOVE_ITEM",
    ];

    /// Short name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedAction::FetchStarted => Self::KNOWN_TAGS[0],
            FeedAction::FetchSucceeded(_) => Self::KNOWN_TAGS[1],
            FeedAction::FetchFailed => Self::KNOWN_TAGS[2],
            FeedAction::ItemRemoved(_) => Self::KNOWN_TAGS[3],
        }
    }

    /// Whether this action ends a fetch lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FeedAction::FetchSucceeded(_) | FeedAction::FetchFailed)
    }

    /// Decode an action from its tagged JSON form.
    ///
    /// An unrecognized `type` is rejected with [`FeedError::UnknownAction`]
    /// before anything reaches the reducer.
    pub fn decode(json: &str) -> Result<Self, FeedError> {
        #[derive(Deserialize)]
        struct Tag {
            #[serde(rename = "type")]
            kind: String,
        }

        let tag: Tag = serde_json::from_str(json)?;
        if !Self::KNOWN_TAGS.contains(&tag.kind.as_str()) {
            return Err(FeedError::UnknownAction(tag.kind));
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn encode(&self) -> Result<String, FeedError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Compute the next feed state.
///
/// `FetchStarted`/`FetchFailed` keep the current items (stale data stays
/// visible), `FetchSucceeded` replaces them wholesale, and `ItemRemoved`
/// filters by id without touching the status.
pub fn reduce(state: &FeedState, action: FeedAction) -> FeedState {
    match action {
        FeedAction::FetchStarted => FeedState {
            items: Arc::clone(&state.items),
            status: FeedStatus::Loading,
        },
        FeedAction::FetchSucceeded(stories) => FeedState {
            items: Arc::new(stories),
            status: FeedStatus::Success,
        },
        FeedAction::FetchFailed => FeedState {
            items: Arc::clone(&state.items),
            status: FeedStatus::Failure,
        },
        FeedAction::ItemRemoved(id) => {
            if !state.items.iter().any(|s| s.id == id) {
                return state.clone();
            }
            let items = state
                .items
                .iter()
                .filter(|s| s.id != id)
                .cloned()
                .collect();
            FeedState {
                items: Arc::new(items),
                status: state.status,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::state::test_story;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn state_with(ids: &[u64], status: FeedStatus) -> FeedState {
        FeedState {
            items: Arc::new(ids.iter().map(|&id| test_story(id, "t")).collect()),
            status,
        }
    }

    fn ids(state: &FeedState) -> Vec<String> {
        state.items.iter().map(|s| s.id.to_string()).collect()
    }

    #[test]
    fn test_fetch_started_sets_loading_and_keeps_items() {
        let state = state_with(&[1, 2], FeedStatus::Success);
        let next = reduce(&state, FeedAction::FetchStarted);
        assert_eq!(next.status, FeedStatus::Loading);
        assert_eq!(next.items, state.items);
    }

    #[test]
    fn test_fetch_succeeded_replaces_items() {
        let state = state_with(&[1, 2], FeedStatus::Loading);
        let payload = vec![test_story(9, "new"), test_story(3, "other")];
        let next = reduce(&state, FeedAction::FetchSucceeded(payload.clone()));
        assert_eq!(next.status, FeedStatus::Success);
        assert_eq!(*next.items, payload);
    }

    #[test]
    fn test_fetch_failed_keeps_last_good_items() {
        let state = state_with(&[1, 2], FeedStatus::Loading);
        let next = reduce(&state, FeedAction::FetchFailed);
        assert_eq!(next.status, FeedStatus::Failure);
        assert_eq!(ids(&next), vec!["1", "2"]);
    }

    #[test]
    fn test_item_removed_filters_by_id() {
        let state = state_with(&[0, 1], FeedStatus::Success);
        let next = reduce(&state, FeedAction::ItemRemoved(StoryId::from(1)));
        assert_eq!(ids(&next), vec!["0"]);
        assert_eq!(next.status, FeedStatus::Success);
    }

    #[test]
    fn test_item_removed_absent_id_is_noop() {
        let state = state_with(&[0, 1], FeedStatus::Failure);
        let next = reduce(&state, FeedAction::ItemRemoved(StoryId::from(7)));
        assert_eq!(next, state);
    }

    #[test]
    fn test_reduce_does_not_mutate_input() {
        let state = state_with(&[0, 1], FeedStatus::Success);
        let before = state.clone();
        let _ = reduce(&state, FeedAction::ItemRemoved(StoryId::from(0)));
        let _ = reduce(&state, FeedAction::FetchSucceeded(Vec::new()));
        assert_eq!(state, before);
    }

    #[test]
    fn test_decode_known_actions() {
        assert_eq!(
            FeedAction::decode(r#"{"type":"STORIES_FETCH_INIT"}"#).unwrap(),
            FeedAction::FetchStarted
        );
        assert_eq!(
            FeedAction::decode(r#"{"type":"REMOVE_ITEM","payload":"42"}"#).unwrap(),
            FeedAction::ItemRemoved(StoryId::from(42))
        );
        let success = FeedAction::decode(
            r#"{"type":"STORIES_FETCH_SUCCESS","payload":[{"objectID":0,"title":"React"}]}"#,
        )
        .unwrap();
        match success {
            FeedAction::FetchSucceeded(stories) => assert_eq!(&*stories[0].title, "React"),
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_decode_unknown_action_rejected() {
        let err = FeedAction::decode(r#"{"type":"STORIES_SHUFFLE"}"#).unwrap_err();
        assert!(matches!(err, FeedError::UnknownAction(ref t) if t == "STORIES_SHUFFLE"));
    }

    #[test]
    fn test_decode_without_tag_is_malformed() {
        let err = FeedAction::decode(r#"{"payload":1}"#).unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
    }

    #[test]
    fn test_encode_uses_wire_tags() {
        let json = FeedAction::FetchFailed.encode().unwrap();
        assert!(json.contains("STORIES_FETCH_FAILURE"));
        assert_eq!(FeedAction::decode(&json).unwrap(), FeedAction::FetchFailed);
    }

    fn arb_action() -> impl Strategy<Value = FeedAction> {
        prop_oneof![
            Just(FeedAction::FetchStarted),
            Just(FeedAction::FetchFailed),
            (0u64..8).prop_map(|id| FeedAction::ItemRemoved(StoryId::from(id))),
            prop::collection::btree_set(0u64..8, 0..6).prop_map(|ids| {
                FeedAction::FetchSucceeded(ids.into_iter().map(|id| test_story(id, "p")).collect())
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_items_never_hold_duplicate_ids(actions in prop::collection::vec(arb_action(), 0..40)) {
            let mut state = FeedState::default();
            for action in actions {
                state = reduce(&state, action);
                let mut seen = std::collections::HashSet::new();
                for story in state.items.iter() {
                    prop_assert!(seen.insert(story.id.clone()));
                }
            }
        }

        #[test]
        fn prop_non_success_actions_preserve_items(
            start in prop::collection::btree_set(0u64..8, 0..6),
            action in arb_action(),
        ) {
            let ids: Vec<u64> = start.into_iter().collect();
            let state = state_with(&ids, FeedStatus::Success);
            let next = reduce(&state, action.clone());
            match action {
                FeedAction::FetchStarted => {
                    prop_assert_eq!(next.status, FeedStatus::Loading);
                    prop_assert_eq!(&next.items, &state.items);
                }
                FeedAction::FetchFailed => {
                    prop_assert_eq!(next.status, FeedStatus::Failure);
                    prop_assert_eq!(&next.items, &state.items);
                }
                FeedAction::FetchSucceeded(payload) => {
                    prop_assert_eq!(&*next.items, &payload);
                }
                FeedAction::ItemRemoved(id) => {
                    let expected: Vec<Story> =
                        state.items.iter().filter(|s| s.id != id).cloned().collect();
                    prop_assert_eq!(&*next.items, &expected);
                    prop_assert_eq!(next.status, state.status);
                }
            }
        }
    }
}
