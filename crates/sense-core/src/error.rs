use thiserror::Error;

/// Errors at the configuration boundary.
///
/// Perception itself never fails: an agent that notices nothing is the
/// expected outcome, not an error.
#[derive(Error, Debug)]
pub enum PerceptionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown perception profile: {0}")]
    UnknownProfile(String),
}

pub type Result<T> = std::result::Result<T, PerceptionError>;
