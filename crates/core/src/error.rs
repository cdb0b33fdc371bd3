//! Error types for presentation extraction and upload.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting or uploading a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// The HTTP transport failed before a status was received.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// A CSS selector could not be parsed.
    #[error("Invalid selector '{selector}': {reason}")]
    SelectorError { selector: String, reason: String },

    /// A bounded wait expired before the condition matched.
    #[error("Element {0} not found")]
    Timeout(String),

    /// No slides could be discovered on the page.
    #[error("No slides could be extracted from this page")]
    NoSlides,

    /// A presentation record violates one of its invariants.
    #[error("Invalid presentation record: {0}")]
    InvalidRecord(String),

    /// The identity grant was denied or could not be obtained.
    ///
    /// The message is the provider's own text, surfaced verbatim.
    #[error("{0}")]
    AuthError(String),

    /// The create call returned a non-success status.
    #[error("Failed to create presentation: {body}")]
    CreateFailed { status: u16, body: String },

    /// The batch update returned a non-success status.
    ///
    /// The presentation created in the previous step is left in place.
    #[error("Failed to add slides: {body}")]
    PopulateFailed {
        presentation_id: String,
        status: u16,
        body: String,
    },

    /// A response body was not the JSON we expected.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The uploader task is gone.
    #[error("Uploader worker is not running")]
    WorkerClosed,
}
