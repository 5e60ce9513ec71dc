use chrono::{DateTime, Utc};

use crate::domain::listing::{EligibleItem, RankedItem};
use crate::ranking::score::breakdown_at;
use crate::time::rotation::RotationClock;

pub const DEFAULT_FEED_SIZE: usize = 20;

/// Scores, orders and truncates a feed to `k` entries.
///
/// `items` must arrive newest-first: the sort is stable, so equal scores keep that order and
/// ties go to the more recent listing.
pub fn rank(items: Vec<EligibleItem>, now: DateTime<Utc>, k: usize) -> Vec<RankedItem> {
    let clock = RotationClock::at(now);
    let input_len = items.len();

    let mut ranked: Vec<RankedItem> = items
        .into_iter()
        .map(|item| {
            let breakdown = breakdown_at(&item, now, clock);
            RankedItem {
                score: breakdown.total(),
                boosted: breakdown.boosted,
                breakdown: None,
                item,
            }
        })
        .collect();

    // `sort_by` is stable.
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(k);

    tracing::debug!(
        input_len,
        k,
        output_len = ranked.len(),
        slot_index = clock.slot_index,
        day_index = clock.day_index,
        "ranked feed"
    );

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::Tier;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    fn listing(id: &str, tier: Tier, rating: f64, review_count: u32, age_days: i64) -> EligibleItem {
        EligibleItem {
            id: id.to_string(),
            tier,
            rating,
            review_count,
            created_at: now() - Duration::days(age_days),
        }
    }

    fn catalog(n: usize) -> Vec<EligibleItem> {
        let tiers = [Tier::Free, Tier::Starter, Tier::Pro, Tier::Premium];
        (0..n)
            .map(|i| {
                listing(
                    &format!("lst-{i:04}"),
                    tiers[i % tiers.len()],
                    (i % 6) as f64,
                    (i * 3 % 40) as u32,
                    (i / 2) as i64,
                )
            })
            .collect()
    }

    #[test]
    fn output_length_is_min_of_k_and_input() {
        for n in [0, 1, 5, 20, 45] {
            for k in [0, 1, 20, 100] {
                let out = rank(catalog(n), now(), k);
                assert_eq!(out.len(), n.min(k), "n={n} k={k}");
            }
        }
    }

    #[test]
    fn empty_input_yields_empty_feed() {
        assert!(rank(Vec::new(), now(), DEFAULT_FEED_SIZE).is_empty());
    }

    #[test]
    fn ranking_is_deterministic() {
        let a = rank(catalog(60), now(), DEFAULT_FEED_SIZE);
        let b = rank(catalog(60), now(), DEFAULT_FEED_SIZE);
        assert_eq!(a, b);
    }

    #[test]
    fn output_is_sorted_by_score_descending() {
        let out = rank(catalog(60), now(), 60);
        assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn premium_outranks_every_other_tier() {
        let mut items = catalog(40);
        // Best possible non-premium listing against the weakest premium one.
        items.push(listing("strong-pro", Tier::Pro, 5.0, 500, 0));
        items.push(listing("weak-premium", Tier::Premium, 0.0, 0, 400));

        let out = rank(items, now(), 100);
        let last_premium = out
            .iter()
            .rposition(|r| r.item.tier == Tier::Premium)
            .unwrap();
        let first_other = out
            .iter()
            .position(|r| r.item.tier != Tier::Premium)
            .unwrap();
        assert!(last_premium < first_other);
    }

    #[test]
    fn ties_keep_input_order() {
        let items = vec![
            listing("newest", Tier::Free, 3.0, 2, 30),
            listing("middle", Tier::Free, 3.0, 2, 31),
            listing("oldest", Tier::Free, 3.0, 2, 32),
        ];
        let out = rank(items, now(), 3);
        let ids: Vec<&str> = out.iter().map(|r| r.item.id.as_str()).collect();
        assert_eq!(ids, ["newest", "middle", "oldest"]);
    }

    #[test]
    fn worked_example_orders_premium_before_pro() {
        // Pick a Pro id whose slot is the current one.
        let clock = RotationClock::at(now());
        let pro_id = (0..)
            .map(|i| format!("pro-{i}"))
            .find(|id| crate::ranking::slot::boosted_slot(id) == clock.slot_index)
            .unwrap();

        let items = vec![
            listing("premium", Tier::Premium, 4.0, 10, 1),
            listing(&pro_id, Tier::Pro, 5.0, 30, 40),
        ];
        let out = rank(items, now(), DEFAULT_FEED_SIZE);

        assert_eq!(out[0].item.id, "premium");
        assert_eq!(out[0].score, 1090.0);
        assert!(out[0].boosted);
        assert_eq!(out[1].item.id, pro_id);
        assert_eq!(out[1].score, 600.0);
        assert!(out[1].boosted);
    }
}
