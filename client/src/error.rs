use thiserror::Error;

/// Errors returned by `SnackApiClient` parse methods.
///
/// `NotFound` keeps the server's message because the admin screens display
/// it as-is ("Child not found", "Snack not found"). Everything else non-2xx
/// lands in `Http` with the status and the extracted error string.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404 for the referenced row.
    #[error("{0}")]
    NotFound(String),

    /// The server returned an unexpected non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body was missing or malformed.
    #[error("unexpected response body: {0}")]
    Deserialization(String),

    /// The request payload could not be encoded as JSON.
    #[error("could not encode request body: {0}")]
    Serialization(String),
}

impl ApiError {
    /// The string a component should display inline, falling back to the
    /// action's generic retry message when the server gave no usable text.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            ApiError::NotFound(message) | ApiError::Http { message, .. }
                if !message.is_empty() =>
            {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }
}
