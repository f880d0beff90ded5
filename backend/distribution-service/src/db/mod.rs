//! Persistence collaborator
//!
//! The distribution core never talks to storage directly. Handlers go through
//! [`ContentRepository`]; the in-memory implementation backs local runs and
//! tests.

use crate::error::Result;
use crate::models::{ContentItem, CreateEventRequest, CreatePostRequest, SponsoredItem};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use throttle::SharedClock;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Most recent organic items, newest first
    async fn recent_items(&self, limit: usize) -> Result<Vec<ContentItem>>;

    /// Sponsored items with up-to-date counters
    async fn active_sponsored_items(&self) -> Result<Vec<SponsoredItem>>;

    /// Interest set for a viewer (empty if unknown)
    async fn viewer_interests(&self, user_id: Uuid) -> Result<HashSet<String>>;

    /// Persist a post, returning its id
    async fn create_post(&self, author_id: Uuid, request: CreatePostRequest) -> Result<String>;

    /// Persist an event, returning its id
    async fn create_event(&self, organizer_id: Uuid, request: CreateEventRequest) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub id: String,
    pub organizer_id: Uuid,
    pub request: CreateEventRequest,
}

/// Process-local repository
pub struct InMemoryContentRepository {
    clock: SharedClock,
    items: RwLock<Vec<ContentItem>>,
    sponsored: RwLock<Vec<SponsoredItem>>,
    interests: RwLock<HashMap<Uuid, HashSet<String>>>,
    events: RwLock<Vec<StoredEvent>>,
}

impl InMemoryContentRepository {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            items: RwLock::new(Vec::new()),
            sponsored: RwLock::new(Vec::new()),
            interests: RwLock::new(HashMap::new()),
            events: RwLock::new(Vec::new()),
        }
    }

    pub fn insert_item(&self, item: ContentItem) {
        self.items.write().push(item);
    }

    pub fn insert_sponsored(&self, ad: SponsoredItem) {
        self.sponsored.write().push(ad);
    }

    pub fn set_interests<I, S>(&self, user_id: Uuid, interests: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests
            .write()
            .insert(user_id, interests.into_iter().map(Into::into).collect());
    }

    pub fn events(&self) -> Vec<StoredEvent> {
        self.events.read().clone()
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn recent_items(&self, limit: usize) -> Result<Vec<ContentItem>> {
        let mut items = self.items.read().clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit);
        Ok(items)
    }

    async fn active_sponsored_items(&self) -> Result<Vec<SponsoredItem>> {
        Ok(self
            .sponsored
            .read()
            .iter()
            .filter(|ad| ad.is_active)
            .cloned()
            .collect())
    }

    async fn viewer_interests(&self, user_id: Uuid) -> Result<HashSet<String>> {
        Ok(self
            .interests
            .read()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_post(&self, author_id: Uuid, request: CreatePostRequest) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.items.write().push(ContentItem {
            id: id.clone(),
            author_id: author_id.to_string(),
            content: request.content,
            category: request.category,
            like_count: 0,
            view_count: 0,
            created_at: self.clock.now(),
        });
        Ok(id)
    }

    async fn create_event(&self, organizer_id: Uuid, request: CreateEventRequest) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.events.write().push(StoredEvent {
            id: id.clone(),
            organizer_id,
            request,
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;
    use throttle::{Clock, ManualClock};

    fn repo() -> (InMemoryContentRepository, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap());
        (InMemoryContentRepository::new(Arc::new(clock.clone())), clock)
    }

    #[tokio::test]
    async fn test_recent_items_newest_first_with_limit() {
        let (repo, clock) = repo();
        for hours in [5, 1, 3] {
            repo.insert_item(ContentItem {
                id: format!("{}h", hours),
                author_id: "a".to_string(),
                content: String::new(),
                category: None,
                like_count: 0,
                view_count: 0,
                created_at: clock.now() - Duration::hours(hours),
            });
        }

        let items = repo.recent_items(2).await.unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();

        assert_eq!(ids, vec!["1h", "3h"]);
    }

    #[tokio::test]
    async fn test_create_post_uses_clock() {
        let (repo, clock) = repo();
        let author = Uuid::new_v4();

        let id = repo
            .create_post(
                author,
                CreatePostRequest {
                    content: "hello".to_string(),
                    category: Some("music".to_string()),
                },
            )
            .await
            .unwrap();

        let items = repo.recent_items(10).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].created_at, clock.now());
        assert_eq!(items[0].author_id, author.to_string());
    }

    #[tokio::test]
    async fn test_unknown_viewer_has_no_interests() {
        let (repo, _clock) = repo();
        let known = Uuid::new_v4();
        repo.set_interests(known, ["music"]);

        assert!(repo.viewer_interests(Uuid::new_v4()).await.unwrap().is_empty());
        assert!(repo.viewer_interests(known).await.unwrap().contains("music"));
    }
}
