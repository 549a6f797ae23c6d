use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Story
// ============================================================================

/// Opaque story identifier (the search index's `objectID`).
///
/// The index serves it as a string, but numeric ids are accepted too and
/// normalized to their decimal form so `0` and `"0"` name the same story.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StoryId(Arc<str>);

impl StoryId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoryId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<u64> for StoryId {
    fn from(n: u64) -> Self {
        Self::new(n.to_string())
    }
}

impl<'de> Deserialize<'de> for StoryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => StoryId::new(s),
            RawId::Number(n) => StoryId::from(n),
        })
    }
}

/// One indexed article as returned by the search endpoint.
///
/// PERF: text fields are `Arc<str>` so snapshots handed to the view clone in O(1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    #[serde(rename = "objectID")]
    pub id: StoryId,
    #[serde(default = "empty_text", deserialize_with = "null_as_empty")]
    pub title: Arc<str>,
    #[serde(default = "empty_text", deserialize_with = "null_as_empty")]
    pub url: Arc<str>,
    #[serde(default = "empty_text", deserialize_with = "null_as_empty")]
    pub author: Arc<str>,
    #[serde(
        rename = "num_comments",
        default,
        deserialize_with = "null_as_zero"
    )]
    pub comment_count: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub points: u64,
    /// Unix timestamp of submission, when the index reports one.
    #[serde(rename = "created_at_i", default)]
    pub created_at: Option<i64>,
}

fn empty_text() -> Arc<str> {
    Arc::from("")
}

/// Comments and Ask HN posts come back with `null` titles/urls.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Arc<str>, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(Arc::from(value.unwrap_or_default().as_str()))
}

fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value: Option<u64> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or(0))
}

// ============================================================================
// Feed State
// ============================================================================

/// Lifecycle of the most recent fetch.
///
/// A single tagged status instead of separate loading/error flags, so
/// "loading and failed at once" cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Failure,
}

/// The aggregate owned by the reducer.
///
/// Invariants:
/// - `items` never contains two stories with the same id
/// - `Loading` and `Failure` keep the previous `items` visible
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedState {
    pub items: Arc<Vec<Story>>,
    pub status: FeedStatus,
}

impl FeedState {
    pub fn is_loading(&self) -> bool {
        self.status == FeedStatus::Loading
    }

    pub fn get(&self, index: usize) -> Option<&Story> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn test_story(id: u64, title: &str) -> Story {
    Story {
        id: StoryId::from(id),
        title: Arc::from(title),
        url: Arc::from(format!("https://example.com/{}", id).as_str()),
        author: Arc::from("pg"),
        comment_count: 3,
        points: 42,
        created_at: Some(1_700_000_000),
    }
}
