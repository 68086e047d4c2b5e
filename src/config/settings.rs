use serde::{Deserialize, Serialize};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

use crate::models::{HallOfFameError, Result};
use crate::scoring::{Threshold, ThresholdTable, TierClassifier};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub data: DataSettings,
    pub tiers: TierSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    pub workbook_path: PathBuf,
    pub columns: ColumnSettings,
}

/// Header name to look for in row 1, and the column index used when the
/// header is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub header: String,
    pub fallback: usize,
}

impl ColumnSpec {
    pub fn new(header: &str, fallback: usize) -> Self {
        Self {
            header: header.to_string(),
            fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSettings {
    pub rank: ColumnSpec,
    pub profile_image: ColumnSpec,
    pub collector_name: ColumnSpec,
    pub nickname: ColumnSpec,
    pub total_minifigs: ColumnSpec,
    pub total_points: ColumnSpec,
    pub special_title: ColumnSpec,
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            rank: ColumnSpec::new("Rank", 0),
            profile_image: ColumnSpec::new("ProfileImage", 1),
            collector_name: ColumnSpec::new("CollectorName", 2),
            nickname: ColumnSpec::new("Nickname", 3),
            total_minifigs: ColumnSpec::new("Total_Minifigs", 4),
            total_points: ColumnSpec::new("Total_Points", 5),
            special_title: ColumnSpec::new("Special_Title", 6),
        }
    }
}

/// Threshold tables and the tier order, lowest tier first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSettings {
    pub order: Vec<String>,
    pub points: ThresholdTable,
    pub minifigs: ThresholdTable,
}

impl Default for TierSettings {
    fn default() -> Self {
        Self {
            order: ["Beginner", "Bronze", "Silver", "Gold", "Platinum", "Grand Master"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            points: ThresholdTable::new(vec![
                Threshold::new(500, "Grand Master"),
                Threshold::new(375, "Platinum"),
                Threshold::new(250, "Gold"),
                Threshold::new(100, "Silver"),
                Threshold::new(50, "Bronze"),
                Threshold::new(0, "Beginner"),
            ]),
            minifigs: ThresholdTable::new(vec![
                Threshold::new(150, "Grand Master"),
                Threshold::new(80, "Platinum"),
                Threshold::new(40, "Gold"),
                Threshold::new(20, "Silver"),
                Threshold::new(10, "Bronze"),
                Threshold::new(0, "Beginner"),
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub submit_url: String,
    pub top_count: usize,
}

impl ServerSettings {
    /// `--port` wins, then `$PORT`, then the configured port. An unparsable
    /// `$PORT` is ignored.
    pub fn resolve_port(&self, cli: Option<u16>, env: Option<&str>) -> u16 {
        cli.or_else(|| env.and_then(|p| p.trim().parse().ok()))
            .unwrap_or(self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "Hall of Fame".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                log_level: "info".to_string(),
            },
            data: DataSettings {
                workbook_path: PathBuf::from("hall_of_fame.xlsx"),
                columns: ColumnSettings::default(),
            },
            tiers: TierSettings::default(),
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 5000,
                submit_url: "https://forms.gle/5wYMhzYjZS9vY9Sv8".to_string(),
                top_count: 3,
            },
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self> {
        Self::layered(Self::environment())
    }

    /// Settings file when one is given, the layered sources otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::new(),
        }
    }

    /// `HALL_OF_FAME__SERVER__PORT=8080` overrides `server.port`.
    fn environment() -> Environment {
        Environment::with_prefix("HALL_OF_FAME")
            .separator("__")
            .try_parsing(true)
    }

    fn layered(env: Environment) -> Result<Self> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(env)
            .build()?;

        Ok(s.try_deserialize()?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(path.as_ref()))
            .build()?;

        Ok(s.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.data.workbook_path.as_os_str().is_empty() {
            return Err(HallOfFameError::ConfigError("Workbook path must not be empty".to_string()));
        }

        if !self.server.submit_url.starts_with("http://") && !self.server.submit_url.starts_with("https://") {
            return Err(HallOfFameError::ConfigError(format!(
                "Submission URL must be absolute, got '{}'",
                self.server.submit_url
            )));
        }

        if self.server.top_count == 0 {
            return Err(HallOfFameError::ConfigError("Top collector count must be at least 1".to_string()));
        }

        TierClassifier::new(&self.tiers)?;
        Ok(())
    }
}
