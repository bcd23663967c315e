//! Single request/response cycle with rate-limit handling.
//!
//! Wraps one GET against the search endpoint: fatal authorization statuses
//! surface immediately, a `retry_after` directive in the decoded body
//! suspends and reissues the identical request, and anything else is
//! returned as the page payload.

use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::transport::Transport;

/// Issue one search request, retrying while the endpoint keeps answering
/// with a positive `retry_after` directive. A `retry_after` of zero is not
/// a directive; such a payload is returned as-is.
///
/// The retry loop is bounded by `max_retries` waits; exhausting the budget
/// yields [`Error::RateLimited`] rather than spinning on the upstream
/// signal forever.
///
/// # Errors
///
/// - [`Error::Authorization`] for HTTP 401/403 — fatal, never retried.
/// - [`Error::MalformedResponse`] if the body is not JSON.
/// - [`Error::RateLimited`] when the retry budget runs out.
/// - [`Error::Transport`] for connection-level failures.
pub(crate) async fn execute(
    transport: &dyn Transport,
    url: &str,
    params: &[(String, String)],
    max_retries: u32,
) -> Result<Value> {
    let mut waits = 0u32;
    loop {
        let response = transport.get(url, params).await?;
        match response.status {
            401 => {
                return Err(Error::Authorization {
                    status: 401,
                    message: "invalid token".to_string(),
                })
            }
            403 => {
                return Err(Error::Authorization {
                    status: 403,
                    message: "no access to this guild; check the guild id and permissions"
                        .to_string(),
                })
            }
            _ => {}
        }

        let payload: Value = serde_json::from_str(&response.body).map_err(|e| {
            Error::MalformedResponse(format!("response body is not valid JSON: {}", e))
        })?;

        // A zero (or negative) directive means no wait; let the payload
        // fall through like any other.
        let retry_after = payload.get("retry_after").and_then(Value::as_f64);
        let Some(retry_after) = retry_after.filter(|&secs| secs > 0.0) else {
            return Ok(payload);
        };

        if waits >= max_retries {
            return Err(Error::RateLimited {
                retries: waits,
                retry_after,
            });
        }
        waits += 1;
        warn!(retry_after, attempt = waits, "rate limited, backing off");
        tokio::time::sleep(Duration::from_secs_f64(retry_after)).await;
    }
}
