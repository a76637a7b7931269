use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldError {
    #[error("invalid field dimensions: {width}x{height} (need at least 2 nodes per axis)")]
    InvalidDimensions { width: usize, height: usize },

    #[error("field size mismatch: expected {expected} vectors, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("non-finite vector at node ({x}, {y})")]
    NonFinite { x: usize, y: usize },

    #[error("failed to read field file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

pub type FieldResult<T> = Result<T, FieldError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
