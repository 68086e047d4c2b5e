use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::CollectorRecord;

/// Which metric decided a collector's overall tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierSource {
    Points,
    Minifigs,
}

impl TierSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierSource::Points => "Points",
            TierSource::Minifigs => "Minifigs",
        }
    }
}

impl fmt::Display for TierSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAssessment {
    pub points_tier: String,
    pub minifig_tier: String,
    pub overall_tier: String,
    pub tier_source: TierSource,
}

impl TierAssessment {
    /// CSS-friendly form of the overall tier, e.g. `grand-master`.
    pub fn overall_slug(&self) -> String {
        tier_slug(&self.overall_tier)
    }
}

pub fn tier_slug(tier: &str) -> String {
    tier.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// A record together with its classification, as shown on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCollector {
    #[serde(flatten)]
    pub record: CollectorRecord,
    #[serde(flatten)]
    pub tiers: TierAssessment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_slug() {
        assert_eq!(tier_slug("Grand Master"), "grand-master");
        assert_eq!(tier_slug(" Gold "), "gold");
    }

    #[test]
    fn test_source_display() {
        assert_eq!(TierSource::Points.to_string(), "Points");
        assert_eq!(TierSource::Minifigs.to_string(), "Minifigs");
    }
}
