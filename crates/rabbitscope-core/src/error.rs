// ── Core error types ──
//
// User-facing errors from rabbitscope-core. Consumers never see reqwest
// or serde_json failures directly; the `From<rabbitscope_api::Error>`
// impl translates transport-layer errors into domain-appropriate
// variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The broker URI is malformed or the host is unreachable.
    #[error("Cannot connect to broker at {uri}: {reason}")]
    ConnectionFailed { uri: String, reason: String },

    /// A topology fetch failed (non-success status or transport failure).
    #[error("Topology fetch failed: {message}")]
    FetchFailed { message: String },

    /// The broker returned a payload we could not decode.
    #[error("Malformed broker response: {message}")]
    DecodeFailed { message: String },
}

impl From<rabbitscope_api::Error> for CoreError {
    fn from(err: rabbitscope_api::Error) -> Self {
        match err {
            rabbitscope_api::Error::InvalidUri { message } => Self::ConnectionFailed {
                uri: "(invalid)".into(),
                reason: message,
            },
            rabbitscope_api::Error::Transport(e) => {
                if e.is_connect() {
                    Self::ConnectionFailed {
                        uri: e
                            .url()
                            .map_or_else(|| "(unknown)".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    Self::FetchFailed {
                        message: e.to_string(),
                    }
                }
            }
            rabbitscope_api::Error::Http { status, .. } => Self::FetchFailed {
                message: format!("broker returned HTTP {status}"),
            },
            rabbitscope_api::Error::Deserialization { message, .. } => {
                Self::DecodeFailed { message }
            }
        }
    }
}
