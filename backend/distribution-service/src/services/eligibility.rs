//! Sponsored item eligibility
//!
//! Rules, first failure wins:
//! 1. impression cap reached
//! 2. before `start_date`
//! 3. after `end_date` (window is inclusive)
//! 4. inactive
//! 5. untargeted (no tags) → eligible
//! 6. viewer has no interests → eligible
//! 7. otherwise eligible iff tags and interests intersect

use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::SponsoredItem;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Decide eligibility, rejecting malformed items
pub fn check(
    ad: &SponsoredItem,
    viewer_interests: &HashSet<String>,
    now: DateTime<Utc>,
) -> Result<bool> {
    validate(ad)?;

    if let Some(max) = ad.max_impressions {
        if ad.impressions >= max {
            return Ok(false);
        }
    }
    if let Some(start) = ad.start_date {
        if now < start {
            return Ok(false);
        }
    }
    if let Some(end) = ad.end_date {
        if now > end {
            return Ok(false);
        }
    }
    if !ad.is_active {
        return Ok(false);
    }
    if ad.tags.is_empty() || viewer_interests.is_empty() {
        return Ok(true);
    }

    Ok(ad.tags.iter().any(|tag| viewer_interests.contains(tag)))
}

/// Eligibility as a plain predicate; malformed items are never eligible
pub fn is_eligible(ad: &SponsoredItem, viewer_interests: &HashSet<String>, now: DateTime<Utc>) -> bool {
    check(ad, viewer_interests, now).unwrap_or(false)
}

/// Keep eligible items in their given order, dropping malformed ones
pub fn filter_eligible(
    ads: Vec<SponsoredItem>,
    viewer_interests: &HashSet<String>,
    now: DateTime<Utc>,
) -> Vec<SponsoredItem> {
    let total = ads.len();
    let eligible: Vec<SponsoredItem> = ads
        .into_iter()
        .filter(|ad| match check(ad, viewer_interests, now) {
            Ok(eligible) => eligible,
            Err(e) => {
                warn!(ad_id = %ad.id, error = %e, "Excluding malformed sponsored item");
                metrics::record_rejected("sponsored");
                false
            }
        })
        .collect();

    debug!(total = total, eligible = eligible.len(), "Sponsored eligibility filtered");
    eligible
}

fn validate(ad: &SponsoredItem) -> Result<()> {
    if ad.impressions < 0 || ad.clicks < 0 {
        return Err(AppError::Validation(format!(
            "sponsored item {} has negative counters (impressions={}, clicks={})",
            ad.id, ad.impressions, ad.clicks
        )));
    }
    if let Some(max) = ad.max_impressions {
        if max < 0 {
            return Err(AppError::Validation(format!(
                "sponsored item {} has negative max_impressions {}",
                ad.id, max
            )));
        }
    }
    if let (Some(start), Some(end)) = (ad.start_date, ad.end_date) {
        if start > end {
            return Err(AppError::Validation(format!(
                "sponsored item {} ends before it starts",
                ad.id
            )));
        }
    }
    Ok(())
}
