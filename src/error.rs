//! Error taxonomy for the search client.
//!
//! Every fallible operation in this crate returns [`Result`]. The variants
//! mirror the failure classes a caller can meaningfully react to:
//!
//! | Variant | Meaning | Retried internally? |
//! |---------|---------|---------------------|
//! | [`Error::Configuration`] | Invalid or incomplete filter/option setup | no |
//! | [`Error::Authorization`] | HTTP 401/403 from the endpoint | no (fatal) |
//! | [`Error::RateLimited`] | `retry_after` directives exhausted the retry budget | yes, up to the budget |
//! | [`Error::MalformedResponse`] | Payload missing `total_results`/`messages` or not JSON | no |
//! | [`Error::Transport`] | Connection-level failure from the transport | no |

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building queries, fetching pages, or decoding results.
#[derive(Debug, Error)]
pub enum Error {
    /// The filter configuration cannot produce a valid request
    /// (missing guild id, no effective filters, zero amount).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The endpoint rejected the credential (401) or the access (403).
    /// Fatal: never retried, no further requests are issued.
    #[error("authorization failed (HTTP {status}): {message}")]
    Authorization { status: u16, message: String },

    /// The endpoint kept answering with `retry_after` until the retry
    /// budget ran out.
    #[error("still rate limited after {retries} waits (last retry_after: {retry_after}s)")]
    RateLimited { retries: u32, retry_after: f64 },

    /// The response decoded, but its shape is not the expected search payload.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A connection-level failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap any transport-level failure. Custom [`Transport`](crate::transport::Transport)
    /// implementations use this for their own error types.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Transport(Box::new(err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::transport(err)
    }
}
