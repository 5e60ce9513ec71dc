//! Featured-listing ranking: tier rotation, scoring and feed assembly.
//!
//! Everything here is a pure function of its inputs and an injected `now`. Nothing reads the
//! system clock and nothing is remembered between calls.

pub mod feed;
pub mod score;
pub mod slot;

pub use feed::{rank, DEFAULT_FEED_SIZE};
pub use score::{score, score_breakdown, ScoreBreakdown};
pub use slot::{bucket_hash, is_boosted, ListingSchedule};
