use tracing::debug;

use crate::{
    config::TierSettings,
    models::{Result, TierAssessment, TierSource},
    scoring::{ThresholdTable, TierOrder},
};

/// A validated threshold table with the tier-order rank of every entry
/// resolved up front, so classification itself cannot fail.
#[derive(Debug, Clone)]
struct RankedTable {
    table: ThresholdTable,
    ranks: Vec<usize>,
}

impl RankedTable {
    fn build(table: &ThresholdTable, metric: &str, order: &TierOrder) -> Result<Self> {
        table.validate(metric)?;
        let ranks = table
            .entries()
            .iter()
            .map(|entry| order.require(&entry.tier))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            table: table.clone(),
            ranks,
        })
    }

    fn lookup(&self, value: i64) -> (&str, usize) {
        // Non-empty after validation.
        let i = self.table.position(value).unwrap_or(0);
        (self.table.entries()[i].tier.as_str(), self.ranks[i])
    }
}

#[derive(Debug, Clone)]
pub struct TierClassifier {
    points: RankedTable,
    minifigs: RankedTable,
}

impl TierClassifier {
    /// Validates both tables against the tier order. Any configuration
    /// problem surfaces here, before a single record is classified.
    pub fn new(settings: &TierSettings) -> Result<Self> {
        let order = TierOrder::new(&settings.order)?;
        let points = RankedTable::build(&settings.points, "points", &order)?;
        let minifigs = RankedTable::build(&settings.minifigs, "minifigs", &order)?;

        debug!(
            "Tier classifier ready: {} points tiers, {} minifig tiers",
            points.ranks.len(),
            minifigs.ranks.len()
        );

        Ok(Self { points, minifigs })
    }

    /// Classifies both metrics and picks the higher tier. Equal ranks go to
    /// points.
    pub fn classify(&self, points: i64, minifigs: i64) -> TierAssessment {
        let (points_tier, points_rank) = self.points.lookup(points);
        let (minifig_tier, minifig_rank) = self.minifigs.lookup(minifigs);

        let (overall_tier, tier_source) = if points_rank >= minifig_rank {
            (points_tier, TierSource::Points)
        } else {
            (minifig_tier, TierSource::Minifigs)
        };

        TierAssessment {
            points_tier: points_tier.to_string(),
            minifig_tier: minifig_tier.to_string(),
            overall_tier: overall_tier.to_string(),
            tier_source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HallOfFameError;
    use crate::scoring::Threshold;
    use pretty_assertions::assert_eq;

    fn classifier() -> TierClassifier {
        TierClassifier::new(&TierSettings::default()).unwrap()
    }

    fn assessment(points: &str, minifigs: &str, overall: &str, source: TierSource) -> TierAssessment {
        TierAssessment {
            points_tier: points.to_string(),
            minifig_tier: minifigs.to_string(),
            overall_tier: overall.to_string(),
            tier_source: source,
        }
    }

    #[test]
    fn test_equal_tiers_resolve_to_points() {
        assert_eq!(
            classifier().classify(400, 90),
            assessment("Platinum", "Platinum", "Platinum", TierSource::Points)
        );
    }

    #[test]
    fn test_points_tier_higher() {
        assert_eq!(
            classifier().classify(50, 5),
            assessment("Bronze", "Beginner", "Bronze", TierSource::Points)
        );
    }

    #[test]
    fn test_minifig_tier_higher() {
        assert_eq!(
            classifier().classify(0, 200),
            assessment("Beginner", "Grand Master", "Grand Master", TierSource::Minifigs)
        );
    }

    #[test]
    fn test_negative_points_do_not_panic() {
        let result = classifier().classify(-5, 0);
        assert_eq!(result.points_tier, "Beginner");
        assert_eq!(result.tier_source, TierSource::Points);
    }

    #[test]
    fn test_tables_with_distinct_tier_names() {
        let settings = TierSettings {
            order: vec!["Rookie".into(), "Hobbyist".into(), "Curator".into(), "Legend".into()],
            points: ThresholdTable::new(vec![
                Threshold::new(1000, "Legend"),
                Threshold::new(0, "Rookie"),
            ]),
            minifigs: ThresholdTable::new(vec![
                Threshold::new(100, "Curator"),
                Threshold::new(0, "Hobbyist"),
            ]),
        };
        let classifier = TierClassifier::new(&settings).unwrap();

        assert_eq!(
            classifier.classify(10, 0),
            assessment("Rookie", "Hobbyist", "Hobbyist", TierSource::Minifigs)
        );
        assert_eq!(
            classifier.classify(1000, 500),
            assessment("Legend", "Curator", "Legend", TierSource::Points)
        );
    }

    #[test]
    fn test_unmapped_tier_fails_construction() {
        let mut settings = TierSettings::default();
        settings.minifigs = ThresholdTable::new(vec![
            Threshold::new(10, "Diamond"),
            Threshold::new(0, "Beginner"),
        ]);
        match TierClassifier::new(&settings) {
            Err(HallOfFameError::UnmappedTier { tier }) => assert_eq!(tier, "Diamond"),
            other => panic!("expected unmapped tier error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_table_fails_construction() {
        let mut settings = TierSettings::default();
        settings.points = ThresholdTable::new(vec![Threshold::new(5, "Beginner")]);
        assert!(matches!(
            TierClassifier::new(&settings),
            Err(HallOfFameError::InvalidTierTable { .. })
        ));
    }
}
