// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum EdgarError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("SEC request rate-limited after retries: url={url}")]
    RateLimited { url: String },

    #[error("SEC request failed after retries: url={url} | last_error={last_error}")]
    RetriesExhausted { url: String, last_error: String },

    #[error("SEC request failed: {status} {reason} | url={url} | body_snippet={body_snippet:?}")]
    Http {
        status: u16,
        reason: String,
        url: String,
        body_snippet: String,
    },

    #[error("Expected JSON but got non-JSON response from {url}: {source}")]
    NonJsonResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected submissions JSON shape: {0}")]
    MalformedSubmissions(String),

    #[error("No {} found in recent filings for this company", .forms.join(" or "))]
    NoQualifyingFiling { forms: Vec<String> },

    #[error("Ticker not found in SEC mapping: {0}")]
    TickerNotFound(String),

    #[error("Invalid CIK {raw:?}: {source}")]
    InvalidIdentifier {
        raw: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Failed to parse EDGAR response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("PDF renderer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("EDGAR interaction failed: {0}")]
    Edgar(#[from] EdgarError), // Automatically convert Edgar errors

    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConvertError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
