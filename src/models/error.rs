use thiserror::Error;

#[derive(Error, Debug)]
pub enum HallOfFameError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid tier table for {metric}: {message}")]
    InvalidTierTable { metric: String, message: String },

    #[error("Tier '{tier}' is missing from the tier order")]
    UnmappedTier { tier: String },

    #[error("Workbook format error: {0}")]
    WorkbookFormat(String),

    #[error("Workbook archive error: {0}")]
    ArchiveError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    ServerError(String),
}

impl From<config::ConfigError> for HallOfFameError {
    fn from(err: config::ConfigError) -> Self {
        HallOfFameError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HallOfFameError>;
