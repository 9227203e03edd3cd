//! Retry policy and status classification.
//!
//! Responses are classified once, here: 2xx succeeds, 5xx and 409 are
//! retryable, any other 4xx fails immediately with a typed error. Transport
//! failures (connect, timeout) are retryable as well. Cluster API calls are
//! never retried but share the same classification.

use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ApiError;

/// Default number of attempts against the control plane.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay; attempt `n` waits `base * 2^n`.
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Maximum length of a response body kept in an error message.
const MAX_BODY_LEN: usize = 512;

/// Attempt ceiling and backoff for a class of requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    max_attempts: u32,
    /// Base backoff delay.
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

impl RetryPolicy {
    /// Creates a policy; at least one attempt is always made.
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            base_delay,
        }
    }

    /// Returns a copy with a different attempt ceiling.
    #[must_use]
    pub const fn with_max_attempts(self, max_attempts: u32) -> Self {
        Self::new(max_attempts, self.base_delay)
    }

    /// Returns the attempt ceiling.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the attempt following the zero-based `attempt`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt))
    }

    /// Returns true if a response with this status may succeed on retry.
    #[must_use]
    pub fn is_retryable(status: StatusCode) -> bool {
        status.is_server_error() || status == StatusCode::CONFLICT
    }

    /// Sends a request built by `build`, retrying per this policy.
    ///
    /// `resource` names the target in not-found errors.
    ///
    /// # Errors
    ///
    /// Returns the classified error for a non-retryable status, or
    /// [`ApiError::RequestFailed`] once all attempts are used.
    pub async fn send<F>(&self, resource: &str, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_error = String::new();

        for attempt in 0..self.max_attempts {
            match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!(resource, status = status.as_u16(), "Request succeeded");
                        return Ok(response);
                    }

                    let body = response.text().await.unwrap_or_default();
                    if !Self::is_retryable(status) {
                        return Err(classify(status, resource, body));
                    }
                    last_error = format!("{status}: {}", truncate(&body));
                }
                Err(e) => {
                    last_error = format!("Request failed: {e}");
                }
            }

            if attempt + 1 < self.max_attempts {
                let delay = self.backoff(attempt);
                warn!(
                    resource,
                    attempt = attempt + 1,
                    max_attempts = self.max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Retrying after transient failure: {last_error}"
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(ApiError::RequestFailed {
            attempts: self.max_attempts,
            message: last_error,
        })
    }
}

/// Maps the status of a call made exactly once onto an error.
pub(super) fn status_error(status: StatusCode, resource: &str, body: String) -> ApiError {
    if RetryPolicy::is_retryable(status) {
        ApiError::RequestFailed {
            attempts: 1,
            message: format!("{status}: {}", truncate(&body)),
        }
    } else {
        classify(status, resource, body)
    }
}

/// Maps a non-retryable status onto an error.
fn classify(status: StatusCode, resource: &str, body: String) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::AuthenticationFailed {
            message: truncate(&body),
        },
        StatusCode::FORBIDDEN => ApiError::AuthorizationFailed {
            message: truncate(&body),
        },
        StatusCode::NOT_FOUND => ApiError::NotFound {
            resource: resource.to_string(),
        },
        _ => ApiError::ClientError {
            status: status.as_u16(),
            message: truncate(&body),
        },
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_BODY_LEN {
        return body.to_string();
    }
    let mut end = MAX_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
