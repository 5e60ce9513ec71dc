use crate::domain::listing::{EligibleItem, RankedItem, Tier};
use crate::ranking::score::{clamp_rating, score_breakdown};
use crate::time::rotation::RotationClock;
use anyhow::ensure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Listing as handed over by the catalog collaborator, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibleItemInput {
    pub id: String,
    /// Raw upstream value; anything but a known tier name ranks as free.
    #[serde(default)]
    pub tier: Option<Value>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedRequest {
    pub items: Vec<EligibleItemInput>,
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
    #[serde(default)]
    pub k: Option<usize>,
    /// Attach the per-term score breakdown to every ranked item.
    #[serde(default)]
    pub explain: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub now: DateTime<Utc>,
    pub slot_index: u32,
    pub day_index: i64,
    pub items: Vec<RankedItem>,
}

impl FeedResponse {
    pub fn new(now: DateTime<Utc>, items: Vec<RankedItem>) -> Self {
        let clock = RotationClock::at(now);
        Self {
            now,
            slot_index: clock.slot_index,
            day_index: clock.day_index,
            items,
        }
    }

    pub fn with_breakdowns(mut self) -> Self {
        for ranked in &mut self.items {
            ranked.breakdown = Some(score_breakdown(&ranked.item, self.now));
        }
        self
    }
}

/// Normalizes a batch of catalog listings, keeping input order.
///
/// Only structural problems (blank or duplicate ids) fail the batch. Out-of-range values are
/// clamped and reported as data-quality warnings.
pub fn validate_and_into_items(
    inputs: Vec<EligibleItemInput>,
) -> anyhow::Result<Vec<EligibleItem>> {
    let mut seen_ids = BTreeSet::<String>::new();
    let mut items = Vec::with_capacity(inputs.len());
    for input in inputs {
        items.push(input.validate_and_into_item(&mut seen_ids)?);
    }
    Ok(items)
}

impl EligibleItemInput {
    fn validate_and_into_item(
        self,
        seen_ids: &mut BTreeSet<String>,
    ) -> anyhow::Result<EligibleItem> {
        let id = self.id.trim().to_string();
        ensure!(!id.is_empty(), "listing id must be non-empty");
        ensure!(seen_ids.insert(id.clone()), "duplicate listing id: {id}");

        let tier = match &self.tier {
            None | Some(Value::Null) => Tier::Free,
            Some(raw) => match Tier::recognize(raw.as_str()) {
                Some(tier) => tier,
                None => {
                    tracing::warn!(%id, tier = %raw, "unrecognized tier; ranking as free");
                    Tier::Free
                }
            },
        };

        let raw_rating = self.rating.unwrap_or_else(|| {
            tracing::warn!(%id, "missing rating; using 0");
            0.0
        });
        let rating = clamp_rating(raw_rating);
        if rating != raw_rating {
            tracing::warn!(
                %id,
                rating = raw_rating,
                clamped = rating,
                "rating outside 0..=5; clamped"
            );
        }

        let raw_review_count = self.review_count.unwrap_or_else(|| {
            tracing::warn!(%id, "missing review count; using 0");
            0
        });
        let review_count = u32::try_from(raw_review_count.max(0)).unwrap_or(u32::MAX);
        if raw_review_count < 0 {
            tracing::warn!(%id, review_count = raw_review_count, "negative review count; using 0");
        }

        Ok(EligibleItem {
            id,
            tier,
            rating,
            review_count,
            created_at: self.created_at,
        })
    }
}
