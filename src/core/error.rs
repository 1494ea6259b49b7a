use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown reindeer: {0}")]
    UnknownReindeer(String),

    #[error("No tokio runtime available to drive the {0} simulator")]
    NoRuntime(&'static str),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
