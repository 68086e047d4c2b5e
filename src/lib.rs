pub mod models;
pub mod config;
pub mod scoring;
pub mod sheet;
pub mod web;

pub use models::{CollectorRecord, RankedCollector, TierAssessment, TierSource, HallOfFameError, Result};
pub use crate::config::{Settings, TierSettings};
pub use scoring::{Leaderboard, TierClassifier};
