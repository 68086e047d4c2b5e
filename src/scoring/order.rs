use std::collections::HashMap;

use crate::models::{HallOfFameError, Result};

/// Total order over tier names; index 0 is the lowest tier.
#[derive(Debug, Clone)]
pub struct TierOrder {
    ranks: HashMap<String, usize>,
}

impl TierOrder {
    pub fn new(names: &[String]) -> Result<Self> {
        let mut ranks = HashMap::with_capacity(names.len());
        for (rank, name) in names.iter().enumerate() {
            if ranks.insert(name.clone(), rank).is_some() {
                return Err(HallOfFameError::ConfigError(format!(
                    "Tier '{}' appears more than once in the tier order",
                    name
                )));
            }
        }
        Ok(Self { ranks })
    }

    pub fn rank(&self, tier: &str) -> Option<usize> {
        self.ranks.get(tier).copied()
    }

    pub fn require(&self, tier: &str) -> Result<usize> {
        self.rank(tier).ok_or_else(|| HallOfFameError::UnmappedTier {
            tier: tier.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rank_follows_list_position() {
        let order = TierOrder::new(&names(&["Beginner", "Bronze", "Gold"])).unwrap();
        assert_eq!(order.rank("Beginner"), Some(0));
        assert_eq!(order.rank("Gold"), Some(2));
        assert_eq!(order.rank("Diamond"), None);
        assert!(matches!(order.require("Diamond"), Err(HallOfFameError::UnmappedTier { .. })));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        assert!(TierOrder::new(&names(&["Gold", "Silver", "Gold"])).is_err());
    }
}
