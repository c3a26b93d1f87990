use thiserror::Error;

/// Errors surfaced by the analysis engine.
///
/// Only `InputTooLarge` and `EmptyInput` can come out of `analyze`. The other
/// variants are raised while building an engine from configuration.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The submitted code is larger than the configured cap.
    #[error("input too large: {size} bytes exceeds the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },

    /// The submitted code is empty or only whitespace.
    #[error("input is empty")]
    EmptyInput,

    #[error("configuration error: {0}")]
    Config(String),

    /// Trained coefficients that would break the scoring contract.
    #[error("invalid scoring model: {0}")]
    InvalidModel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
