use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Organic post or comment as read from the content store
///
/// Counters are signed so malformed upstream records can be rejected instead
/// of wrapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub author_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    pub like_count: i64,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Sponsored item (ad). Counters are maintained by the tracking collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SponsoredItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub target_url: Option<String>,
    /// Empty means untargeted
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub is_active: bool,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub impressions: i64,
    #[serde(default)]
    pub max_impressions: Option<i64>,
    #[serde(default)]
    pub clicks: i64,
    /// Informational only; placement does not read it
    #[serde(default)]
    pub priority: Option<i32>,
}

/// Category/tag affinities accumulated for a viewer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerContext {
    pub interests: HashSet<String>,
}

impl ViewerContext {
    pub fn new<I, S>(interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            interests: interests.into_iter().map(Into::into).collect(),
        }
    }

    /// Viewer with no recorded interests (anonymous or new user)
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// One slot in a composed feed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedEntry<T> {
    Organic(T),
    Sponsored(SponsoredItem),
}

impl<T> FeedEntry<T> {
    pub fn is_sponsored(&self) -> bool {
        matches!(self, FeedEntry::Sponsored(_))
    }
}

/// Organic item annotated with its relevance score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: ContentItem,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedResponse {
    pub entries: Vec<FeedEntry<ScoredItem>>,
    pub organic_count: usize,
    pub sponsored_count: usize,
    /// True when a collaborator fetch failed and the feed was served partially
    pub degraded: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub starts_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub id: String,
    /// Attempts left in the current throttle window
    pub remaining_attempts: u32,
}
