pub mod threshold;
pub mod order;
pub mod classifier;
pub mod leaderboard;

pub use threshold::{classify_by_threshold, Threshold, ThresholdTable};
pub use order::TierOrder;
pub use classifier::TierClassifier;
pub use leaderboard::Leaderboard;
