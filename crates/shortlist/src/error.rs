use std::time::Duration;

use logo_kit_common::CommonError;
use thiserror::Error;

/// Errors surfaced to callers of the pipeline. Collaborator failures never
/// show up here; they are absorbed into the candidate they belong to.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid options: {reason}")]
    InvalidOptions { reason: String },

    #[error("Invalid configuration value {value:?} for {key}: {reason}")]
    InvalidConfig {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Pipeline is missing a {0}")]
    MissingCollaborator(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Common(#[from] CommonError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Classification consumed by [`crate::retry::RetryPolicy`]
pub trait Retryable {
    /// Whether another attempt could plausibly succeed
    fn is_retryable(&self) -> bool;

    /// The error reported when a single attempt exceeds its timeout
    fn timed_out(after: Duration) -> Self;
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Provider {provider} rate limited the request")]
    RateLimited { provider: String },

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    #[error("Transient provider error: {0}")]
    Transient(String),

    #[error("Provider returned no image")]
    EmptyOutput,

    #[error("No image sources available: {0}")]
    NoSources(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Retryable for GenerationError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Transient(_)
        )
    }

    fn timed_out(after: Duration) -> Self {
        Self::Timeout(after)
    }
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Store write timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store temporarily unavailable: {0}")]
    Unavailable(String),

    #[error("Store rejected the object: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Retryable for PersistError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Unavailable(_))
    }

    fn timed_out(after: Duration) -> Self {
        Self::Timeout(after)
    }
}

#[derive(Error, Debug)]
pub enum JudgeError {
    #[error("Judge timed out after {0:?}")]
    Timeout(Duration),

    #[error("Judge rate limited the request")]
    RateLimited,

    #[error("Judge transport error: {0}")]
    Transport(String),

    #[error("Malformed verdict: {0}")]
    MalformedVerdict(String),

    #[error("No verdict available for candidate {0}")]
    NoVerdict(u32),

    #[error("Judge reported failure: {0}")]
    Failed(String),
}

impl Retryable for JudgeError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::RateLimited | Self::Transport(_))
    }

    fn timed_out(after: Duration) -> Self {
        Self::Timeout(after)
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Fetch of {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Fetch transport error: {0}")]
    Transport(String),

    #[error("Unsupported URL: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Unsupported(_) | Self::Io(_) => false,
        }
    }

    fn timed_out(after: Duration) -> Self {
        Self::Timeout(after)
    }
}

#[derive(Error, Debug)]
pub enum RasterizeError {
    #[error("Rasterization failed: {0}")]
    Failed(String),
}
