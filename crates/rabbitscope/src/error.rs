//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable
//! help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use rabbitscope_core::CoreError;

/// Exit codes for process termination.
#[allow(dead_code)]
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(dead_code)]
pub enum CliError {
    #[error("Could not connect to broker at {uri}")]
    #[diagnostic(
        code(rabbitscope::connection_failed),
        help(
            "Check that the RabbitMQ management plugin is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { uri: String, reason: String },

    #[error("Topology fetch failed: {message}")]
    #[diagnostic(
        code(rabbitscope::fetch_failed),
        help("Verify the management URI and credentials, then try again.")
    )]
    FetchFailed { message: String },

    #[error("Malformed broker response: {message}")]
    #[diagnostic(
        code(rabbitscope::decode_failed),
        help("The URI may point at something other than the management API.")
    )]
    DecodeFailed { message: String },

    #[error("Could not write output to {path}")]
    #[diagnostic(code(rabbitscope::write_failed))]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rabbitscope::validation))]
    Validation { field: String, reason: String },

    #[error("Terminal UI failed: {message}")]
    #[diagnostic(code(rabbitscope::terminal))]
    Terminal { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { uri, reason } => Self::ConnectionFailed { uri, reason },
            CoreError::FetchFailed { message } => Self::FetchFailed { message },
            CoreError::DecodeFailed { message } => Self::DecodeFailed { message },
        }
    }
}

impl From<rabbitscope_api::Error> for CliError {
    fn from(err: rabbitscope_api::Error) -> Self {
        CoreError::from(err).into()
    }
}
