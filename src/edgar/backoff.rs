// src/edgar/backoff.rs
use reqwest::header::HeaderValue;
use std::future::Future;
use std::time::Duration;

/// Exponential backoff bounded by a ceiling, with server hints taking priority.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    base: Duration,
    max: Duration,
}

/// Transient state for one retrying request: how many attempts were already
/// made, and what the last response asked us to wait.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackoffState {
    pub attempt: u32,
    pub retry_after: Option<u64>,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    /// `min(retry_after, max)` when the server sent a hint, otherwise
    /// `min(base * 2^attempt, max)`.
    pub fn delay(&self, state: &BackoffState) -> Duration {
        match state.retry_after {
            Some(secs) => Duration::from_secs(secs).min(self.max),
            None => {
                // powi overflows to infinity long before i32 runs out; min() then clamps it.
                let factor = 2f64.powi(state.attempt.min(i32::MAX as u32) as i32);
                let secs = (self.base.as_secs_f64() * factor).min(self.max.as_secs_f64());
                Duration::from_secs_f64(secs)
            }
        }
    }
}

/// Reads a `Retry-After` header. Only the delay-seconds form (plain ASCII
/// digits) is honoured; HTTP dates and anything else are ignored.
pub fn parse_retry_after(value: Option<&HeaderValue>) -> Option<u64> {
    let raw = value?.to_str().ok()?.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Where the retry loop goes to wait. Production uses tokio's timer.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
