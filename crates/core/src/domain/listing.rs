use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ranking::score::ScoreBreakdown;

/// Paid visibility level of the seller behind a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Starter,
    Pro,
    Premium,
}

impl Tier {
    /// Lenient parse for upstream tier values. Unknown or missing tiers rank as `Free`.
    pub fn from_wire(raw: Option<&str>) -> Self {
        Self::recognize(raw).unwrap_or_default()
    }

    /// `None` when the value is missing or not a tier we know about.
    pub fn recognize(raw: Option<&str>) -> Option<Self> {
        match raw?.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Self::Free),
            "starter" => Some(Self::Starter),
            "pro" => Some(Self::Pro),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(Self::from_wire(raw.as_ref().and_then(serde_json::Value::as_str)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleItem {
    pub id: String,
    #[serde(default)]
    pub tier: Tier,
    pub rating: f64,
    pub review_count: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    #[serde(flatten)]
    pub item: EligibleItem,
    pub score: f64,
    pub boosted: bool,
    /// Per-term score, only filled when a caller asks for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}
