use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VideoForgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid choice: {0}")]
    InvalidChoice(String),

    #[error("No more answers available for prompt: {0}")]
    InputExhausted(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Step {step} failed: {reason}")]
    StepFailed { step: usize, reason: String },

    #[error("Step {step} reported success but produced no video in {}", dir.display())]
    MissingArtifact { step: usize, dir: PathBuf },

    #[error("Step {step} produced {found} candidate videos, expected exactly one")]
    InconsistentResult { step: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, VideoForgeError>;
