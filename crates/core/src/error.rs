//! Error types for the sunbae domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all sunbae operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Remote service errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Assistant run errors ---
    #[error("Orchestration error: {0}")]
    Orchestration(#[from] OrchestrationError),

    // --- Dataset errors ---
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response shape: {0}")]
    InvalidResponse(String),
}

/// Failures of a single remote assistant run.
#[derive(Debug, Clone, Error)]
pub enum OrchestrationError {
    #[error("Assistant run ended with status '{status}'")]
    RunFailed { status: String },

    #[error("Assistant run still pending after {attempts} polls")]
    TimedOut { attempts: u32 },

    #[error(transparent)]
    Remote(#[from] ProviderError),
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset at {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse {dataset} dataset: {reason}")]
    Parse { dataset: String, reason: String },

    #[error("Event {id} ends before it starts")]
    InvalidEvent { id: String },

    #[error("Unknown calendar year: {0}")]
    UnknownYear(String),
}
