use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

pub const SLOT_HOURS: u32 = 2;
pub const SLOTS_PER_DAY: u32 = 24 / SLOT_HOURS;

const SECONDS_PER_DAY: i64 = 86_400;
// 1970-01-01 counted from 0001-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Time buckets the rotation is keyed on. Hours are UTC so every replica agrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationClock {
    /// Two-hour window of the day, 0..=11.
    pub slot_index: u32,
    /// Whole days since the Unix epoch.
    pub day_index: i64,
}

impl RotationClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            slot_index: now.hour() / SLOT_HOURS,
            day_index: now.timestamp().div_euclid(SECONDS_PER_DAY),
        }
    }

    /// Clock at 00:00 UTC on `date`.
    pub fn start_of(date: NaiveDate) -> Self {
        Self {
            slot_index: 0,
            day_index: date.num_days_from_ce() as i64 - UNIX_EPOCH_DAYS_FROM_CE,
        }
    }
}

/// UTC hour range `[start, end)` covered by a slot.
pub fn slot_window(slot_index: u32) -> (u32, u32) {
    let start = (slot_index % SLOTS_PER_DAY) * SLOT_HOURS;
    (start, start + SLOT_HOURS)
}
