// src/edgar/client.rs
use crate::edgar::backoff::{parse_retry_after, BackoffPolicy, BackoffState, Sleeper, TokioSleeper};
use crate::utils::error::EdgarError;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use std::fmt;
use std::future::Future;
use std::time::Duration;

const ACCEPT_HEADER: &str = "application/json,text/html;q=0.9,*/*;q=0.8";
const BODY_SNIPPET_CHARS: usize = 200;

/// Settings for talking to EDGAR. The SEC asks that every request carries a
/// User-Agent naming the caller with contact details.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl ClientConfig {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff_base: Duration::from_millis(800),
            backoff_max: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.backoff_base = base;
        self.backoff_max = max;
        self
    }

    pub fn validate(&self) -> Result<(), EdgarError> {
        let ua = self.user_agent.trim();
        if ua.is_empty() {
            return Err(EdgarError::InvalidConfig("user agent must not be empty".to_string()));
        }
        if !ua.contains('@') {
            tracing::warn!(user_agent = ua, "User-Agent has no contact email; SEC may block these requests");
        }
        if self.backoff_max < self.backoff_base {
            return Err(EdgarError::InvalidConfig(format!(
                "backoff max ({:?}) is smaller than backoff base ({:?})",
                self.backoff_max, self.backoff_base
            )));
        }
        Ok(())
    }
}

/// What one attempt produced, with the body already decoded.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub(crate) status: StatusCode,
    pub(crate) retry_after: Option<u64>,
    pub(crate) body: String,
}

/// Why the previous attempt did not succeed.
enum LastFailure {
    RateLimited,
    Status(StatusCode),
    Transport(String),
}

/// EDGAR HTTP client with retry, exponential backoff and 429 handling.
/// One instance is meant to be reused for every request in a run.
#[derive(Debug)]
pub struct SecClient<S = TokioSleeper> {
    http: reqwest::Client,
    config: ClientConfig,
    backoff: BackoffPolicy,
    sleeper: S,
}

impl SecClient<TokioSleeper> {
    pub fn new(config: ClientConfig) -> Result<Self, EdgarError> {
        Self::with_sleeper(config, TokioSleeper)
    }
}

impl<S: Sleeper> SecClient<S> {
    pub fn with_sleeper(config: ClientConfig, sleeper: S) -> Result<Self, EdgarError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_HEADER));

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.trim()) // Set the required User-Agent
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?; // Propagates reqwest::Error as EdgarError::Client

        let backoff = BackoffPolicy::new(config.backoff_base, config.backoff_max);
        Ok(Self { http, config, backoff, sleeper })
    }

    /// GETs `url` and parses the body as JSON.
    pub async fn fetch_json(
        &self,
        url: &str,
        params: Option<&[(&str, &str)]>,
    ) -> Result<serde_json::Value, EdgarError> {
        let reply = self.get(url, params).await?;
        serde_json::from_str(&reply.body).map_err(|source| EdgarError::NonJsonResponse {
            url: url.to_string(),
            source,
        })
    }

    /// GETs `url` and returns the body as text. Without a declared charset the
    /// body is decoded as UTF-8.
    pub async fn fetch_text(&self, url: &str, params: Option<&[(&str, &str)]>) -> Result<String, EdgarError> {
        let reply = self.get(url, params).await?;
        tracing::debug!("Successfully downloaded {} bytes from {}", reply.body.len(), url);
        Ok(reply.body)
    }

    async fn get(&self, url: &str, params: Option<&[(&str, &str)]>) -> Result<Reply, EdgarError> {
        tracing::debug!(url, "GET");
        self.execute(url, || self.send_once(url, params)).await
    }

    async fn send_once(&self, url: &str, params: Option<&[(&str, &str)]>) -> Result<Reply, reqwest::Error> {
        let mut request = self.http.get(url);
        if let Some(params) = params {
            request = request.query(params);
        }
        let response = request.send().await?;
        let status = response.status();
        let retry_after = parse_retry_after(response.headers().get(header::RETRY_AFTER));
        // reqwest falls back to UTF-8 when the response declares no charset
        let body = response.text().await?;
        Ok(Reply { status, retry_after, body })
    }

    /// The retry loop shared by every GET: at most `max_retries + 1` attempts.
    /// 429, 500, 502, 503, 504 and transport failures are retried after a
    /// backoff sleep; any other error status fails at once.
    pub(crate) async fn execute<F, Fut, E>(&self, url: &str, mut attempt_once: F) -> Result<Reply, EdgarError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Reply, E>>,
        E: fmt::Display,
    {
        let mut last_failure: Option<LastFailure> = None;

        for attempt in 0..=self.config.max_retries {
            match attempt_once().await {
                Ok(reply) if !is_error_status(reply.status) => return Ok(reply),
                Ok(reply) if reply.status == StatusCode::TOO_MANY_REQUESTS => {
                    tracing::warn!(attempt, url, "SEC rate limited (429)");
                    self.pause(BackoffState { attempt, retry_after: reply.retry_after }).await;
                    last_failure = Some(LastFailure::RateLimited);
                }
                Ok(reply) if is_retryable_status(reply.status) => {
                    tracing::debug!(attempt, url, status = reply.status.as_u16(), "SEC server error, retrying");
                    self.pause(BackoffState { attempt, retry_after: reply.retry_after }).await;
                    last_failure = Some(LastFailure::Status(reply.status));
                }
                Ok(reply) => {
                    tracing::error!("HTTP error status: {} for URL: {}", reply.status, url);
                    return Err(EdgarError::Http {
                        status: reply.status.as_u16(),
                        reason: reply.status.canonical_reason().unwrap_or("").to_string(),
                        url: url.to_string(),
                        body_snippet: reply.body.chars().take(BODY_SNIPPET_CHARS).collect(),
                    });
                }
                Err(e) => {
                    tracing::warn!(attempt, url, error = %e, "SEC request exception");
                    self.pause(BackoffState { attempt, retry_after: None }).await;
                    last_failure = Some(LastFailure::Transport(e.to_string()));
                }
            }
        }

        let url = url.to_string();
        Err(match last_failure {
            Some(LastFailure::RateLimited) => EdgarError::RateLimited { url },
            Some(LastFailure::Status(status)) => EdgarError::RetriesExhausted {
                url,
                last_error: format!("HTTP {}", status),
            },
            Some(LastFailure::Transport(msg)) => EdgarError::RetriesExhausted { url, last_error: msg },
            None => EdgarError::RetriesExhausted { url, last_error: "no attempts made".to_string() },
        })
    }

    async fn pause(&self, state: BackoffState) {
        let delay = self.backoff.delay(&state);
        tracing::debug!(attempt = state.attempt, ?delay, "Backing off");
        self.sleeper.sleep(delay).await;
    }
}

fn is_error_status(status: StatusCode) -> bool {
    status.is_client_error() || status.is_server_error()
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 502 | 503 | 504)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::sync::{Arc, Mutex};
    use tokio_test::{assert_err, assert_ok};

    const UA: &str = "Jane Doe jane.doe@example.com";

    /// Records requested sleeps instead of waiting.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct RecordingSleeper(pub(crate) Arc<Mutex<Vec<Duration>>>);

    impl RecordingSleeper {
        pub(crate) fn sleeps(&self) -> Vec<Duration> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
            self.0.lock().unwrap().push(duration);
            std::future::ready(())
        }
    }

    pub(crate) fn test_client(max_retries: u32) -> (SecClient<RecordingSleeper>, RecordingSleeper) {
        let sleeper = RecordingSleeper::default();
        let config = ClientConfig::new(UA)
            .with_max_retries(max_retries)
            .with_timeout(Duration::from_secs(5))
            .with_backoff(Duration::from_millis(800), Duration::from_secs(10));
        let client = SecClient::with_sleeper(config, sleeper.clone()).unwrap();
        (client, sleeper)
    }

    fn reply(status: u16) -> Reply {
        Reply {
            status: StatusCode::from_u16(status).unwrap(),
            retry_after: None,
            body: format!("status {}", status),
        }
    }

    #[test]
    fn config_rejects_blank_user_agent() {
        assert!(matches!(
            ClientConfig::new("   ").validate(),
            Err(EdgarError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_rejects_max_below_base() {
        let config = ClientConfig::new(UA).with_backoff(Duration::from_secs(5), Duration::from_secs(1));
        assert!(matches!(config.validate(), Err(EdgarError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn three_503s_then_success_sleeps_three_times() {
        let (client, sleeper) = test_client(3);
        let mut script = vec![Ok(reply(503)), Ok(reply(503)), Ok(reply(503)), Ok(reply(200))].into_iter();

        let result = client
            .execute("https://sec.test/x", || {
                let next: Result<Reply, String> = script.next().expect("script exhausted");
                async move { next }
            })
            .await;

        let reply = assert_ok!(result);
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(
            sleeper.sleeps(),
            vec![
                Duration::from_millis(800),
                Duration::from_millis(1600),
                Duration::from_millis(3200)
            ]
        );
    }

    #[tokio::test]
    async fn transport_errors_exhaust_retries() {
        let (client, sleeper) = test_client(2);
        let mut calls = 0;

        let result = client
            .execute("https://sec.test/down", || {
                calls += 1;
                async { Err::<Reply, _>("connection reset") }
            })
            .await;

        assert_eq!(calls, 3);
        assert_eq!(sleeper.sleeps().len(), 3);
        match assert_err!(result) {
            EdgarError::RetriesExhausted { url, last_error } => {
                assert_eq!(url, "https://sec.test/down");
                assert_eq!(last_error, "connection reset");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limit_then_server_error_reports_generic_exhaustion() {
        let (client, _sleeper) = test_client(1);
        let mut script = vec![Ok(reply(429)), Ok(reply(502))].into_iter();

        let result = client
            .execute("https://sec.test/mixed", || {
                let next: Result<Reply, String> = script.next().expect("script exhausted");
                async move { next }
            })
            .await;

        assert!(matches!(result, Err(EdgarError::RetriesExhausted { .. })));
    }

    #[tokio::test]
    async fn non_retryable_server_error_fails_at_once() {
        let (client, sleeper) = test_client(3);
        let mut calls = 0;

        let result = client
            .execute("https://sec.test/unsupported", || {
                calls += 1;
                async { Ok::<_, String>(reply(501)) }
            })
            .await;

        assert_eq!(calls, 1);
        assert!(sleeper.sleeps().is_empty());
        match assert_err!(result) {
            EdgarError::Http { status, reason, url, body_snippet } => {
                assert_eq!(status, 501);
                assert_eq!(reason, "Not Implemented");
                assert_eq!(url, "https://sec.test/unsupported");
                assert_eq!(body_snippet, "status 501");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn recovers_after_rate_limit() {
        let (client, sleeper) = test_client(3);
        let mut limited = reply(429);
        limited.retry_after = Some(2);
        let mut script = vec![Ok(limited), Ok(reply(200))].into_iter();

        let result = client
            .execute("https://sec.test/busy-then-ok", || {
                let next: Result<Reply, String> = script.next().expect("script exhausted");
                async move { next }
            })
            .await;

        let reply = assert_ok!(result);
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, "status 200");
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let (client, sleeper) = test_client(0);
        let mut calls = 0;
        let result = client
            .execute("https://sec.test/once", || {
                calls += 1;
                async { Ok::<_, String>(reply(500)) }
            })
            .await;
        assert_eq!(calls, 1);
        assert_eq!(sleeper.sleeps().len(), 1);
        assert!(matches!(result, Err(EdgarError::RetriesExhausted { .. })));
    }

    #[tokio::test]
    async fn fetch_json_sends_user_agent_and_params() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/submissions")
                    .query_param("page", "1")
                    .header("user-agent", UA);
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"cik":"320193","name":"Apple Inc."}"#);
            })
            .await;

        let (client, sleeper) = test_client(3);
        let value = client
            .fetch_json(&server.url("/submissions"), Some(&[("page", "1")]))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(value["name"], "Apple Inc.");
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn fetch_json_rejects_non_json_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/not-json");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let (client, _) = test_client(3);
        let url = server.url("/not-json");
        match client.fetch_json(&url, None).await {
            Err(EdgarError::NonJsonResponse { url: got, .. }) => assert_eq!(got, url),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_text_defaults_to_utf8() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/doc.htm");
                then.status(200).header("content-type", "text/html").body("Société Générale");
            })
            .await;

        let (client, _) = test_client(3);
        let text = client.fetch_text(&server.url("/doc.htm"), None).await.unwrap();
        assert_eq!(text, "Société Générale");
    }

    #[tokio::test]
    async fn not_found_fails_immediately_with_snippet() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404).body("x".repeat(500));
            })
            .await;

        let (client, sleeper) = test_client(3);
        let url = server.url("/missing");
        let err = client.fetch_text(&url, None).await.unwrap_err();

        mock.assert_hits_async(1).await;
        assert!(sleeper.sleeps().is_empty());
        match err {
            EdgarError::Http { status, reason, url: got, body_snippet } => {
                assert_eq!(status, 404);
                assert_eq!(reason, "Not Found");
                assert_eq!(got, url);
                assert_eq!(body_snippet.len(), 200);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn persistent_429_honours_retry_after_and_reports_rate_limit() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/busy");
                then.status(429).header("Retry-After", "2");
            })
            .await;

        let (client, sleeper) = test_client(2);
        let url = server.url("/busy");
        let err = client.fetch_json(&url, None).await.unwrap_err();

        mock.assert_hits_async(3).await;
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(2); 3]);
        match err {
            EdgarError::RateLimited { url: got } => assert_eq!(got, url),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn long_retry_after_is_capped() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/busy");
                then.status(503).header("Retry-After", "50");
            })
            .await;

        let (client, sleeper) = test_client(1);
        let err = client.fetch_text(&server.url("/busy"), None).await.unwrap_err();

        assert!(matches!(err, EdgarError::RetriesExhausted { .. }));
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(10); 2]);
    }
}
