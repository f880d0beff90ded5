//! Feed assembly
//!
//! Fetches organic items, sponsored items and viewer interests from the
//! repository, then scores, filters and composes them. Collaborator failures
//! degrade the feed (organic-only, or empty) instead of failing the request.

use crate::db::ContentRepository;
use crate::metrics;
use crate::models::{FeedResponse, SponsoredItem, ViewerContext};
use crate::services::{composer, eligibility, scoring};
use std::sync::Arc;
use throttle::SharedClock;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct FeedAssembler {
    repository: Arc<dyn ContentRepository>,
    clock: SharedClock,
}

impl FeedAssembler {
    pub fn new(repository: Arc<dyn ContentRepository>, clock: SharedClock) -> Self {
        Self { repository, clock }
    }

    /// Build the feed for `viewer` (None for anonymous)
    pub async fn assemble(&self, viewer: Option<Uuid>, limit: usize) -> FeedResponse {
        let (organic, sponsored, context) = tokio::join!(
            self.repository.recent_items(limit),
            self.repository.active_sponsored_items(),
            self.viewer_context(viewer),
        );

        let mut degraded = false;

        let organic = organic.unwrap_or_else(|e| {
            warn!(error = %e, "Organic item fetch failed, serving empty feed");
            degraded = true;
            Vec::new()
        });

        let sponsored: Vec<SponsoredItem> = sponsored.unwrap_or_else(|e| {
            warn!(error = %e, "Sponsored item fetch failed, serving organic-only feed");
            degraded = true;
            Vec::new()
        });

        let now = self.clock.now();
        let scored = scoring::annotate(organic, &context.interests, now);
        let eligible = eligibility::filter_eligible(sponsored, &context.interests, now);

        let mode = if scored.is_empty() {
            "empty"
        } else if eligible.is_empty() {
            "organic_only"
        } else {
            "full"
        };
        metrics::record_composition(mode);

        let organic_count = scored.len();
        let entries = composer::compose(scored, eligible);
        let sponsored_count = entries.len() - organic_count;

        debug!(
            viewer = ?viewer,
            organic = organic_count,
            sponsored = sponsored_count,
            degraded = degraded,
            "Feed assembled"
        );

        FeedResponse {
            entries,
            organic_count,
            sponsored_count,
            degraded,
        }
    }

    async fn viewer_context(&self, viewer: Option<Uuid>) -> ViewerContext {
        let Some(user_id) = viewer else {
            return ViewerContext::anonymous();
        };

        match self.repository.viewer_interests(user_id).await {
            Ok(interests) => ViewerContext::new(interests),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Interest lookup failed, using none");
                ViewerContext::anonymous()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockContentRepository;
    use crate::error::AppError;
    use crate::models::{ContentItem, FeedEntry};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::collections::BTreeSet;
    use throttle::ManualClock;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 12, 0, 0).unwrap()
    }

    fn items(n: usize) -> Vec<ContentItem> {
        (0..n)
            .map(|i| ContentItem {
                id: format!("post-{}", i),
                author_id: "author".to_string(),
                content: String::new(),
                category: Some("music".to_string()),
                like_count: 10,
                view_count: 100,
                created_at: now() - Duration::hours(i as i64),
            })
            .collect()
    }

    fn ad(id: &str, tags: &[&str]) -> SponsoredItem {
        SponsoredItem {
            id: id.to_string(),
            title: String::new(),
            target_url: None,
            tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
            is_active: true,
            start_date: None,
            end_date: None,
            impressions: 0,
            max_impressions: None,
            clicks: 0,
            priority: None,
        }
    }

    fn assembler(repo: MockContentRepository) -> FeedAssembler {
        FeedAssembler::new(Arc::new(repo), Arc::new(ManualClock::new(now())))
    }

    #[tokio::test]
    async fn test_assemble_full_feed() {
        let viewer = Uuid::new_v4();
        let mut repo = MockContentRepository::new();
        repo.expect_recent_items().returning(|_| Ok(items(9)));
        repo.expect_active_sponsored_items()
            .returning(|| Ok(vec![ad("music-ad", &["music"]), ad("sports-ad", &["sports"])]));
        repo.expect_viewer_interests()
            .returning(|_| Ok(["music".to_string()].into_iter().collect()));

        let feed = assembler(repo).assemble(Some(viewer), 9).await;

        assert!(!feed.degraded);
        assert_eq!(feed.organic_count, 9);
        assert_eq!(feed.sponsored_count, 1);
        // 9 / 2 = 4
        assert!(matches!(&feed.entries[4], FeedEntry::Sponsored(a) if a.id == "music-ad"));
        match &feed.entries[0] {
            FeedEntry::Organic(scored) => {
                let expected = 20.0 + 10.0;
                assert!((scored.score - expected / 2f64.powf(1.8) * 1.5).abs() < 1e-9);
            }
            FeedEntry::Sponsored(_) => panic!("first entry should be organic"),
        }
    }

    #[tokio::test]
    async fn test_ads_failure_degrades_to_organic_only() {
        let mut repo = MockContentRepository::new();
        repo.expect_recent_items().returning(|_| Ok(items(6)));
        repo.expect_active_sponsored_items()
            .returning(|| Err(AppError::Repository("ads store down".to_string())));

        let feed = assembler(repo).assemble(None, 6).await;

        assert!(feed.degraded);
        assert_eq!(feed.organic_count, 6);
        assert_eq!(feed.sponsored_count, 0);
        assert!(feed.entries.iter().all(|e| !e.is_sponsored()));
    }

    #[tokio::test]
    async fn test_organic_failure_serves_empty_feed() {
        let mut repo = MockContentRepository::new();
        repo.expect_recent_items()
            .returning(|_| Err(AppError::Repository("timeout".to_string())));
        repo.expect_active_sponsored_items()
            .returning(|| Ok(vec![ad("a", &[])]));

        let feed = assembler(repo).assemble(None, 10).await;

        assert!(feed.degraded);
        assert!(feed.entries.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_item_is_excluded_not_fatal() {
        let mut repo = MockContentRepository::new();
        repo.expect_recent_items().returning(|_| {
            let mut list = items(3);
            list[1].like_count = -1;
            Ok(list)
        });
        repo.expect_active_sponsored_items().returning(|| Ok(vec![]));

        let feed = assembler(repo).assemble(None, 3).await;

        assert!(!feed.degraded);
        assert_eq!(feed.organic_count, 2);
    }

    #[tokio::test]
    async fn test_interest_lookup_failure_falls_back_to_no_interests() {
        let mut repo = MockContentRepository::new();
        repo.expect_recent_items().returning(|_| Ok(items(9)));
        repo.expect_active_sponsored_items()
            .returning(|| Ok(vec![ad("sports-ad", &["sports"])]));
        repo.expect_viewer_interests()
            .returning(|_| Err(AppError::Repository("profile store down".to_string())));

        let feed = assembler(repo).assemble(Some(Uuid::new_v4()), 9).await;

        // no interests → targeted ads are still eligible
        assert_eq!(feed.sponsored_count, 1);
        assert!(!feed.degraded);
    }
}
