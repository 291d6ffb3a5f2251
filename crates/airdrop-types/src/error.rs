//! Error types for the airdrop claimer.
//!
//! All errors use the `AD_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Identifier encoding errors
//! - 2xx: Claim request errors
//! - 3xx: Settlement binding errors (see `airdrop-settlement`)
//! - 4xx: Replay guard errors (see `airdrop-settlement`)
//! - 9xx: General / internal errors

use thiserror::Error;

/// Central error enum for local airdrop claimer failures.
///
/// Failures raised by the settlement contract itself never pass through this
/// enum; they are forwarded verbatim by the submitter.
#[derive(Debug, Error)]
pub enum AirdropError {
    // =================================================================
    // Identifier Encoding Errors (1xx)
    // =================================================================
    /// An identifier's encoding is wider than the contract's fixed field.
    #[error(
        "AD_ERR_100: Identifier `{field}` encodes to {bytes} bytes, field holds {max}"
    )]
    IdentifierTooWide {
        field: &'static str,
        bytes: usize,
        max: usize,
    },

    // =================================================================
    // Claim Request Errors (2xx)
    // =================================================================
    /// The incoming event could not be read as a claim request.
    #[error("AD_ERR_200: Invalid claim request: {reason}")]
    InvalidClaimRequest { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Configuration error (missing or malformed environment values).
    #[error("AD_ERR_900: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("AD_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// I/O error (stdin, stdout).
    #[error("AD_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, AirdropError>;

impl From<std::io::Error> for AirdropError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AirdropError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
