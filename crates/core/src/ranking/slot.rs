use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::listing::Tier;
use crate::time::rotation::{slot_window, RotationClock, SLOTS_PER_DAY};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a 64-bit over the id's UTF-8 bytes. Stable across platforms and releases.
pub fn bucket_hash(id: &str) -> u64 {
    let mut h = FNV_OFFSET;
    for &b in id.as_bytes() {
        h ^= b as u64;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// The one two-hour slot per day in which a Pro listing gets its boost.
pub fn boosted_slot(id: &str) -> u32 {
    (bucket_hash(id) % SLOTS_PER_DAY as u64) as u32
}

pub fn is_boosted(id: &str, tier: Tier, now: DateTime<Utc>) -> bool {
    is_boosted_at(id, tier, RotationClock::at(now))
}

pub(crate) fn is_boosted_at(id: &str, tier: Tier, clock: RotationClock) -> bool {
    match tier {
        Tier::Premium => true,
        Tier::Pro => boosted_slot(id) == clock.slot_index,
        Tier::Starter => starter_boosted_on_day(id, clock.day_index),
        Tier::Free => false,
    }
}

// (day_index + hash) is even, without summing an i64 and a u64.
fn starter_boosted_on_day(id: &str, day_index: i64) -> bool {
    let day_parity = day_index.rem_euclid(2) as u64;
    (day_parity + bucket_hash(id) % 2) % 2 == 0
}

/// Where a listing sits in the rotation on a given UTC date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSchedule {
    pub id: String,
    pub date: NaiveDate,
    pub pro_slot: u32,
    pub pro_window_start_hour: u32,
    pub pro_window_end_hour: u32,
    pub starter_boosted: bool,
}

impl ListingSchedule {
    pub fn for_date(id: &str, date: NaiveDate) -> Self {
        let pro_slot = boosted_slot(id);
        let (start, end) = slot_window(pro_slot);
        Self {
            id: id.to_string(),
            date,
            pro_slot,
            pro_window_start_hour: start,
            pro_window_end_hour: end,
            starter_boosted: starter_boosted_on_day(id, RotationClock::start_of(date).day_index),
        }
    }
}
