use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    models::{CollectorRecord, RankedCollector},
    scoring::TierClassifier,
};

/// Classified collectors, highest point total first.
#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard {
    pub collectors: Vec<RankedCollector>,
    pub generated_at: DateTime<Utc>,
}

impl Leaderboard {
    pub fn build(records: Vec<CollectorRecord>, classifier: &TierClassifier) -> Self {
        let mut collectors: Vec<RankedCollector> = records
            .into_iter()
            .map(|record| {
                let tiers = classifier.classify(record.total_points, record.total_minifigs);
                RankedCollector { record, tiers }
            })
            .collect();

        // Stable, so equal totals keep spreadsheet order.
        collectors.sort_by(|a, b| b.record.total_points.cmp(&a.record.total_points));

        Self {
            collectors,
            generated_at: Utc::now(),
        }
    }

    pub fn top(&self, n: usize) -> &[RankedCollector] {
        &self.collectors[..n.min(self.collectors.len())]
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}
