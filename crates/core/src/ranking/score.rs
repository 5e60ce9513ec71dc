use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::listing::{EligibleItem, Tier};
use crate::ranking::slot::is_boosted_at;
use crate::time::rotation::RotationClock;

pub const PREMIUM_BOOST: f64 = 1000.0;
pub const PRO_BOOSTED: f64 = 500.0;
pub const PRO_BASELINE: f64 = 300.0;
pub const STARTER_BOOSTED: f64 = 100.0;

pub const MAX_RATING: f64 = 5.0;
const RATING_WEIGHT: f64 = 10.0;

// Saturates at 25 reviews.
const POINTS_PER_REVIEW: u32 = 2;
const REVIEW_BONUS_CAP: u32 = 50;

pub const FRESHNESS_BONUS: f64 = 30.0;
const FRESHNESS_WINDOW_DAYS: i64 = 7;

/// Additive terms of a listing's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub tier: f64,
    pub quality: f64,
    pub reviews: f64,
    pub freshness: f64,
    pub boosted: bool,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.tier + self.quality + self.reviews + self.freshness
    }
}

pub fn score(item: &EligibleItem, now: DateTime<Utc>) -> f64 {
    score_breakdown(item, now).total()
}

pub fn score_breakdown(item: &EligibleItem, now: DateTime<Utc>) -> ScoreBreakdown {
    breakdown_at(item, now, RotationClock::at(now))
}

pub(crate) fn breakdown_at(
    item: &EligibleItem,
    now: DateTime<Utc>,
    clock: RotationClock,
) -> ScoreBreakdown {
    let boosted = is_boosted_at(&item.id, item.tier, clock);
    let tier = match (item.tier, boosted) {
        (Tier::Premium, _) => PREMIUM_BOOST,
        (Tier::Pro, true) => PRO_BOOSTED,
        (Tier::Pro, false) => PRO_BASELINE,
        (Tier::Starter, true) => STARTER_BOOSTED,
        (Tier::Starter, false) | (Tier::Free, _) => 0.0,
    };

    ScoreBreakdown {
        tier,
        quality: clamp_rating(item.rating) * RATING_WEIGHT,
        reviews: review_bonus(item.review_count),
        freshness: freshness_bonus(item.created_at, now),
        boosted,
    }
}

/// Ratings outside [0, 5] are clamped; NaN counts as 0.
pub fn clamp_rating(rating: f64) -> f64 {
    if rating.is_nan() {
        return 0.0;
    }
    rating.clamp(0.0, MAX_RATING)
}

fn review_bonus(review_count: u32) -> f64 {
    review_count
        .saturating_mul(POINTS_PER_REVIEW)
        .min(REVIEW_BONUS_CAP) as f64
}

fn freshness_bonus(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    if now.signed_duration_since(created_at) < Duration::days(FRESHNESS_WINDOW_DAYS) {
        FRESHNESS_BONUS
    } else {
        0.0
    }
}
