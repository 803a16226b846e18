use thiserror::Error;

/// Top-level error type for the `rabbitscope-api` crate.
///
/// Covers every failure mode of a management-API fetch: URI parsing,
/// transport, non-success HTTP statuses, and payload decoding.
/// `rabbitscope-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    /// The broker URI could not be parsed or is missing a host.
    #[error("Invalid broker URI: {message}")]
    InvalidUri { message: String },

    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status from the management API.
    #[error("Unexpected HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on the
    /// next refresh tick.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
