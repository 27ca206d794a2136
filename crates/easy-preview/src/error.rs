// Error types for easy-preview

use thiserror::Error;

/// Result type alias for easy-preview operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when driving the preview core
///
/// None of these are fatal: every failure degrades to a presentational state
/// and the user can retry by submitting a URL again or dragging again.
#[derive(Debug, Error)]
pub enum Error {
    /// URL input was empty after trimming
    #[error("Please enter a URL")]
    EmptyUrl,

    /// URL input could not be parsed as an absolute http(s) URL
    ///
    /// `input` is the normalized text (after `https://` was prepended).
    #[error("Please enter a valid URL: '{input}' ({reason})")]
    InvalidUrl { input: String, reason: String },

    /// Sharing was requested before any URL was loaded
    #[error("Please load a URL first before sharing")]
    NothingToShare,

    /// Feedback form failed validation
    ///
    /// Holds every validation message, in form order.
    #[error("Invalid feedback: {}", .0.join("; "))]
    InvalidFeedback(Vec<String>),

    /// Feedback backend rejected or failed the submission
    #[error("Feedback backend error: {0}")]
    Backend(String),

    /// Invalid argument provided to method
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, #[source] Box<Error>),
}

impl Error {
    /// Adds context to the error
    pub fn context(self, msg: impl Into<String>) -> Self {
        Error::Context(msg.into(), Box::new(self))
    }

    /// Returns true for errors caused by user input rather than the environment.
    ///
    /// Input errors are reported inline and return focus to the offending field.
    pub fn is_input_error(&self) -> bool {
        match self {
            Error::EmptyUrl | Error::InvalidUrl { .. } | Error::InvalidFeedback(_) => true,
            Error::Context(_, inner) => inner.is_input_error(),
            _ => false,
        }
    }
}
