//! Sponsored placement into an organic feed
//!
//! Placement is deterministic:
//! - `interval = organic_len / (ads + 1)`, or 3 when that is zero
//! - ad `i` goes after `(i + 1) * interval` organic items, i.e. at index
//!   `(i + 1) * interval + ads_already_placed` of the growing feed
//! - an ad whose index is past the end of the feed is dropped, not appended
//!
//! Organic order is never changed.

use crate::metrics;
use crate::models::{FeedEntry, SponsoredItem};
use tracing::debug;

/// Spacing used when there are too few organic items to divide evenly
pub const FALLBACK_INTERVAL: usize = 3;

/// Interleave `eligible_ads` into `organic`
pub fn compose<T>(organic: Vec<T>, eligible_ads: Vec<SponsoredItem>) -> Vec<FeedEntry<T>> {
    let mut feed: Vec<FeedEntry<T>> = organic.into_iter().map(FeedEntry::Organic).collect();
    if eligible_ads.is_empty() {
        return feed;
    }

    let interval = placement_interval(feed.len(), eligible_ads.len());
    let total = eligible_ads.len();
    let mut placed = 0;

    for (i, ad) in eligible_ads.into_iter().enumerate() {
        let insert_at = (i + 1) * interval + placed;
        if insert_at <= feed.len() {
            feed.insert(insert_at, FeedEntry::Sponsored(ad));
            placed += 1;
        } else {
            debug!(
                ad_id = %ad.id,
                insert_at = insert_at,
                feed_len = feed.len(),
                "Dropping sponsored item past end of feed"
            );
        }
    }

    metrics::record_sponsored_placement(placed, total - placed);
    feed
}

fn placement_interval(organic_len: usize, ad_count: usize) -> usize {
    match organic_len / (ad_count + 1) {
        0 => FALLBACK_INTERVAL,
        interval => interval,
    }
}
