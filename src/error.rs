use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheatSheetError {
    #[error("Task error: {0}")]
    Task(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid glob pattern: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Failed to expand glob: {0}")]
    GlobExpansion(#[from] glob::GlobError),
}

pub type Result<T> = std::result::Result<T, CheatSheetError>;
