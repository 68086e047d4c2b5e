use serde::{Deserialize, Serialize};

use crate::models::{HallOfFameError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub minimum: i64,
    pub tier: String,
}

impl Threshold {
    pub fn new(minimum: i64, tier: &str) -> Self {
        Self {
            minimum,
            tier: tier.to_string(),
        }
    }
}

/// Tier cut points, highest minimum first, ending in a zero catch-all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdTable {
    entries: Vec<Threshold>,
}

impl ThresholdTable {
    pub fn new(entries: Vec<Threshold>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Threshold] {
        &self.entries
    }

    /// Position of the entry `value` falls into.
    ///
    /// Values below every minimum (negative input, or a table missing its
    /// catch-all) land on the last entry. Returns `None` only for an empty
    /// table.
    pub fn position(&self, value: i64) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        Some(
            self.entries
                .iter()
                .position(|entry| value >= entry.minimum)
                .unwrap_or(self.entries.len() - 1),
        )
    }

    pub fn classify(&self, value: i64) -> Option<&str> {
        self.position(value).map(|i| self.entries[i].tier.as_str())
    }

    pub fn validate(&self, metric: &str) -> Result<()> {
        let invalid = |message: String| HallOfFameError::InvalidTierTable {
            metric: metric.to_string(),
            message,
        };

        let last = self
            .entries
            .last()
            .ok_or_else(|| invalid("table is empty".to_string()))?;

        if last.minimum != 0 {
            return Err(invalid(format!(
                "last entry must have minimum 0, got {}",
                last.minimum
            )));
        }

        for pair in self.entries.windows(2) {
            if pair[0].minimum <= pair[1].minimum {
                return Err(invalid(format!(
                    "minimums must be strictly descending ({} '{}' then {} '{}')",
                    pair[0].minimum, pair[0].tier, pair[1].minimum, pair[1].tier
                )));
            }
        }

        if let Some(entry) = self.entries.iter().find(|e| e.tier.trim().is_empty()) {
            return Err(invalid(format!("entry with minimum {} has no tier name", entry.minimum)));
        }

        Ok(())
    }
}

/// Tier name for `value`, scanning `table` from the highest minimum down.
pub fn classify_by_threshold(value: i64, table: &ThresholdTable) -> Option<&str> {
    table.classify(value)
}
