use serde::{Deserialize, Serialize};

/// Substituted for any display field the spreadsheet leaves empty.
pub const MISSING_VALUE: &str = "—";

/// One spreadsheet row after column mapping.
///
/// Only the two totals take part in tier classification; everything else is
/// carried through to the pages untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorRecord {
    pub rank: String,
    pub profile_image: String,
    pub collector_name: String,
    pub nickname: String,
    pub total_minifigs: i64,
    pub total_points: i64,
    pub special_title: String,
}

impl CollectorRecord {
    pub fn new(collector_name: impl Into<String>, total_points: i64, total_minifigs: i64) -> Self {
        Self {
            rank: MISSING_VALUE.to_string(),
            profile_image: MISSING_VALUE.to_string(),
            collector_name: collector_name.into(),
            nickname: MISSING_VALUE.to_string(),
            total_minifigs,
            total_points,
            special_title: MISSING_VALUE.to_string(),
        }
    }

    pub fn has_profile_image(&self) -> bool {
        let image = self.profile_image.trim();
        !image.is_empty() && image != MISSING_VALUE
    }

    pub fn has_special_title(&self) -> bool {
        let title = self.special_title.trim();
        !title.is_empty() && title != MISSING_VALUE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_fields_are_not_displayable() {
        let record = CollectorRecord::new("Brick Baron", 10, 2);
        assert!(!record.has_profile_image());
        assert!(!record.has_special_title());

        let record = CollectorRecord {
            profile_image: "https://img.example/baron.png".to_string(),
            special_title: "Founder".to_string(),
            ..record
        };
        assert!(record.has_profile_image());
        assert!(record.has_special_title());
    }
}
