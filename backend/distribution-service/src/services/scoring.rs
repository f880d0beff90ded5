//! Time-decay relevance scoring
//!
//! ```text
//! engagement = likes * 2 + views * 0.1
//! decay      = (age_hours + 2) ^ 1.8
//! score      = engagement / decay * (1.5 if category ∈ interests else 1.0)
//! ```
//!
//! Age is measured in fractional hours and clamped to zero under clock skew.
//! Negative counters are rejected, never clamped.
//!
//! Feeds are served in persistence order by default; `rank_by_score` is for
//! callers that opt into score ordering.

use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{ContentItem, ScoredItem};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Gravity exponent applied to item age
pub const GRAVITY: f64 = 1.8;
/// Hours added to age so brand-new items do not divide by ~0
pub const AGE_OFFSET_HOURS: f64 = 2.0;
pub const LIKE_WEIGHT: f64 = 2.0;
pub const VIEW_WEIGHT: f64 = 0.1;
/// Boost for items whose category matches a viewer interest
pub const INTEREST_MULTIPLIER: f64 = 1.5;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Relevance score for one item as seen by a viewer at `now`
pub fn score(
    item: &ContentItem,
    viewer_interests: &HashSet<String>,
    now: DateTime<Utc>,
) -> Result<f64> {
    validate(item)?;

    let age_hours = ((now - item.created_at).num_milliseconds() as f64 / MILLIS_PER_HOUR).max(0.0);
    let engagement = item.like_count as f64 * LIKE_WEIGHT + item.view_count as f64 * VIEW_WEIGHT;
    let decay = (age_hours + AGE_OFFSET_HOURS).powf(GRAVITY);

    let multiplier = match item.category.as_deref() {
        Some(category) if !category.is_empty() && viewer_interests.contains(category) => {
            INTEREST_MULTIPLIER
        }
        _ => 1.0,
    };

    Ok((engagement / decay) * multiplier)
}

fn validate(item: &ContentItem) -> Result<()> {
    if item.like_count < 0 {
        return Err(AppError::Validation(format!(
            "item {} has negative like_count {}",
            item.id, item.like_count
        )));
    }
    if item.view_count < 0 {
        return Err(AppError::Validation(format!(
            "item {} has negative view_count {}",
            item.id, item.view_count
        )));
    }
    Ok(())
}

/// Score every item, keeping input order and excluding invalid items
pub fn annotate(
    items: Vec<ContentItem>,
    viewer_interests: &HashSet<String>,
    now: DateTime<Utc>,
) -> Vec<ScoredItem> {
    items
        .into_iter()
        .filter_map(|item| match score(&item, viewer_interests, now) {
            Ok(score) => Some(ScoredItem { item, score }),
            Err(e) => {
                warn!(item_id = %item.id, error = %e, "Excluding invalid item from feed");
                metrics::record_rejected("organic");
                None
            }
        })
        .collect()
}

/// Score and sort items, highest score first
///
/// Ties keep their input order.
pub fn rank_by_score(
    items: Vec<ContentItem>,
    viewer_interests: &HashSet<String>,
    now: DateTime<Utc>,
) -> Vec<ScoredItem> {
    let mut scored = annotate(items, viewer_interests, now);
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    debug!("Score ranking applied to {} items", scored.len());

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 14, 18, 0, 0).unwrap()
    }

    fn create_test_item(id: &str, age: Duration, likes: i64, views: i64) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            author_id: "author".to_string(),
            content: "Test content".to_string(),
            category: None,
            like_count: likes,
            view_count: views,
            created_at: now() - age,
        }
    }

    fn interests(tags: &[&str]) -> HashSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_newer_item_scores_higher() {
        let fresh = create_test_item("1h", Duration::hours(1), 10, 100);
        let stale = create_test_item("10h", Duration::hours(10), 10, 100);

        let s1 = score(&fresh, &HashSet::new(), now()).unwrap();
        let s10 = score(&stale, &HashSet::new(), now()).unwrap();

        assert!(s1 > s10);
    }

    #[test]
    fn test_decay_is_strictly_decreasing_over_fractional_hours() {
        let mut previous = f64::MAX;
        for minutes in [0, 15, 30, 45, 90, 600, 6000] {
            let item = create_test_item("x", Duration::minutes(minutes), 3, 7);
            let s = score(&item, &HashSet::new(), now()).unwrap();
            assert!(s < previous, "score should fall at {} minutes", minutes);
            previous = s;
        }
    }

    #[test]
    fn test_engagement_monotonicity() {
        let age = Duration::hours(3);
        let base = score(&create_test_item("a", age, 4, 40), &HashSet::new(), now()).unwrap();
        let more_likes = score(&create_test_item("b", age, 5, 40), &HashSet::new(), now()).unwrap();
        let more_views = score(&create_test_item("c", age, 4, 41), &HashSet::new(), now()).unwrap();

        assert!(more_likes >= base);
        assert!(more_views >= base);
    }

    #[test]
    fn test_interest_multiplier_reference_values() {
        // engagement = 5 * 2 = 10, age 0h → 10 / 2^1.8
        let mut item = create_test_item("x", Duration::zero(), 5, 0);
        item.category = Some("music".to_string());

        let unmatched = score(&item, &interests(&["sports"]), now()).unwrap();
        let matched = score(&item, &interests(&["music"]), now()).unwrap();

        assert!((unmatched - 2.872).abs() < 1e-3, "unmatched = {}", unmatched);
        assert!((matched - 4.308).abs() < 1e-3, "matched = {}", matched);
        assert!((matched - unmatched * 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_category_never_matches() {
        let mut item = create_test_item("x", Duration::hours(1), 5, 0);
        item.category = Some(String::new());

        let with_blank_interest = score(&item, &interests(&[""]), now()).unwrap();
        item.category = None;
        let uncategorized = score(&item, &HashSet::new(), now()).unwrap();

        assert_eq!(with_blank_interest, uncategorized);
    }

    #[test]
    fn test_zero_engagement_scores_zero() {
        let item = create_test_item("x", Duration::hours(5), 0, 0);
        assert_eq!(score(&item, &HashSet::new(), now()).unwrap(), 0.0);
    }

    #[test]
    fn test_future_timestamp_is_treated_as_age_zero() {
        let future = create_test_item("f", Duration::hours(-2), 5, 10);
        let current = create_test_item("c", Duration::zero(), 5, 10);

        assert_eq!(
            score(&future, &HashSet::new(), now()).unwrap(),
            score(&current, &HashSet::new(), now()).unwrap()
        );
    }

    #[test]
    fn test_negative_counters_are_rejected() {
        let negative_likes = create_test_item("l", Duration::hours(1), -1, 0);
        let negative_views = create_test_item("v", Duration::hours(1), 0, -5);

        assert!(matches!(
            score(&negative_likes, &HashSet::new(), now()),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            score(&negative_views, &HashSet::new(), now()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_annotate_keeps_order_and_drops_invalid() {
        let items = vec![
            create_test_item("old", Duration::hours(30), 100, 0),
            create_test_item("bad", Duration::hours(1), -3, 0),
            create_test_item("new", Duration::hours(1), 1, 0),
        ];

        let scored = annotate(items, &HashSet::new(), now());
        let ids: Vec<_> = scored.iter().map(|s| s.item.id.as_str()).collect();

        assert_eq!(ids, vec!["old", "new"]);
    }

    #[test]
    fn test_rank_by_score_orders_descending() {
        let items = vec![
            create_test_item("low", Duration::hours(12), 1, 0),
            create_test_item("high", Duration::hours(1), 50, 500),
            create_test_item("mid", Duration::hours(2), 10, 10),
        ];

        let ranked = rank_by_score(items, &HashSet::new(), now());
        let ids: Vec<_> = ranked.iter().map(|s| s.item.id.as_str()).collect();

        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_rank_by_score_empty_list() {
        assert!(rank_by_score(vec![], &HashSet::new(), now()).is_empty());
    }
}
