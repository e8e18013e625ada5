//! HTTP fetcher implementation
//!
//! This module handles all outbound HTTP requests, including:
//! - Building the shared HTTP client with the checker's user agent
//! - Liveness probes (HEAD first, GET when the server rejects HEAD)
//! - Page fetches that return the body for link extraction
//! - Retry with exponential backoff on network-level failures
//! - Error classification (timeout, DNS, network, other)

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{redirect::Policy, Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Maximum number of redirects followed before a request fails
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Largest response body read for a page, sitemap or robots.txt
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Bytes inspected when the Content-Type does not say HTML
const SNIFF_BYTES: usize = 1024;

/// Upper bound for a single backoff delay
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Substrings that identify a name-resolution failure in an error chain
const DNS_MARKERS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "nodename nor servname",
    "no such host",
    "name resolution",
];

/// Network-level failure class of a request that got no HTTP response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// The request exceeded its timeout and was aborted
    Timeout,
    /// Connection refused, reset, or failed mid-transfer
    Network,
    /// The host name could not be resolved
    Dns,
    /// Anything else (invalid request, redirect loop, ...)
    Other,
}

impl ErrorKind {
    /// Returns true if a failure of this kind is worth retrying
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Other)
    }

    /// Returns the lowercase name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Dns => "dns",
            Self::Other => "other",
        }
    }

    /// Returns a short human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Timeout => "Timeout",
            Self::Network => "Connection Error",
            Self::Dns => "DNS Error",
            Self::Other => "Request Error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP method used for a liveness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMethod {
    Head,
    Get,
}

impl FetchMethod {
    fn as_reqwest(self) -> Method {
        match self {
            Self::Head => Method::HEAD,
            Self::Get => Method::GET,
        }
    }
}

/// Per-request settings for the fetcher
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Probe method; HEAD falls back to GET on 405/501
    pub method: FetchMethod,

    /// Per-request timeout
    pub timeout: Duration,

    /// Overrides the client's default user agent when set
    pub user_agent: Option<String>,

    /// Retries after a network-level failure (HTTP errors are never retried)
    pub max_retries: u32,

    /// Base delay between retries, doubled after each attempt
    pub retry_backoff: Duration,

    /// Page bodies are truncated after this many bytes
    pub max_body_bytes: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: FetchMethod::Head,
            timeout: Duration::from_secs(10),
            user_agent: None,
            max_retries: 2,
            retry_backoff: Duration::from_millis(250),
            max_body_bytes: MAX_BODY_BYTES,
        }
    }
}

impl FetchOptions {
    /// Returns a copy of these options using a different method
    pub fn with_method(&self, method: FetchMethod) -> Self {
        Self {
            method,
            ..self.clone()
        }
    }
}

/// Outcome of a liveness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchStatus {
    /// True if the final response was 2xx/3xx
    pub ok: bool,

    /// Final HTTP status code, if any response was received
    pub status_code: Option<u16>,

    /// Canonical reason phrase, or the error label for network failures
    pub status_text: String,

    /// Set when no HTTP response was received
    pub error_kind: Option<ErrorKind>,

    /// Root cause of a network failure
    pub error_message: Option<String>,

    /// URL after following redirects
    pub final_url: Option<String>,

    /// Number of attempts made (1 + retries used)
    pub attempts: u32,
}

impl FetchStatus {
    fn from_http(status: StatusCode, final_url: String, attempts: u32) -> Self {
        Self {
            ok: is_live_status(status),
            status_code: Some(status.as_u16()),
            status_text: status_text(status),
            error_kind: None,
            error_message: None,
            final_url: Some(final_url),
            attempts,
        }
    }

    fn from_error(kind: ErrorKind, message: String, attempts: u32) -> Self {
        Self {
            ok: false,
            status_code: None,
            status_text: kind.label().to_string(),
            error_kind: Some(kind),
            error_message: Some(message),
            final_url: None,
            attempts,
        }
    }

    /// Returns true if the server answered with an error status
    pub fn is_http_error(&self) -> bool {
        !self.ok && self.status_code.is_some()
    }
}

/// A page fetched for link extraction
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value (empty if absent)
    pub content_type: String,

    /// Page body content
    pub body: String,

    /// Number of attempts made
    pub attempts: u32,
}

impl FetchedPage {
    /// Returns true if the page declares an HTML (or no) content type, or
    /// its body starts like an HTML document despite the declared type
    pub fn is_html(&self) -> bool {
        let content_type = self.content_type.to_ascii_lowercase();
        content_type.is_empty() || content_type.contains("html") || looks_like_html(&self.body)
    }
}

/// Reason a page could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server answered with a non-2xx status
    Status { status_code: u16, status_text: String },

    /// No usable response after exhausting retries
    Network {
        kind: ErrorKind,
        message: String,
        attempts: u32,
    },
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status {
                status_code,
                status_text,
            } => write!(f, "HTTP {} {}", status_code, status_text),
            Self::Network {
                kind,
                message,
                attempts,
            } => write!(f, "{} after {} attempt(s): {}", kind, attempts, message),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed (up to [`DEFAULT_MAX_REDIRECTS`]) so that the final
/// status code decides liveness. Timeouts are applied per request.
///
/// # Example
///
/// ```no_run
/// use linkscout::crawler::build_http_client;
///
/// let client = build_http_client("LinkScout/1.0 (+https://example.com/bot)").unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(DEFAULT_MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Probes a URL for liveness
///
/// # Request Flow
///
/// 1. Send the configured method (normally HEAD)
///    - 405 or 501 to a HEAD request → repeat the attempt with GET
/// 2. Any HTTP response is conclusive and is never retried
/// 3. A network-level failure is retried up to `max_retries` times with
///    exponential backoff
///
/// | Condition | Action |
/// |-----------|--------|
/// | 2xx / 3xx | `ok = true` |
/// | 4xx / 5xx | `ok = false`, one attempt |
/// | Timeout / DNS / connection error | Retry, then `ok = false` with `error_kind` |
/// | Invalid request, redirect loop | `ok = false`, no retry |
pub async fn fetch_status(client: &Client, url: &str, options: &FetchOptions) -> FetchStatus {
    let (outcome, attempts) =
        with_retries(url, options, || probe_once(client, url, options)).await;

    match outcome {
        Ok((status, final_url)) => {
            tracing::debug!("{} {} -> {}", options.method.as_reqwest(), url, status);
            FetchStatus::from_http(status, final_url, attempts)
        }
        Err(error) => {
            let kind = classify_error(&error);
            let message = describe_error(&error);
            tracing::debug!("{} unreachable ({}): {}", url, kind, message);
            FetchStatus::from_error(kind, message, attempts)
        }
    }
}

/// Fetches a page body with GET
///
/// Network failures are retried like [`fetch_status`]; a non-2xx final status
/// is returned as [`FetchFailure::Status`] without retrying.
pub async fn fetch_page(
    client: &Client,
    url: &str,
    options: &FetchOptions,
) -> Result<FetchedPage, FetchFailure> {
    let (outcome, attempts) =
        with_retries(url, options, || get_page_once(client, url, options)).await;

    match outcome {
        Ok((status, final_url, content_type, Some(body))) => {
            tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
            Ok(FetchedPage {
                final_url,
                status_code: status.as_u16(),
                content_type,
                body,
                attempts,
            })
        }
        Ok((status, _, _, None)) => {
            tracing::debug!("GET {} -> {}", url, status);
            Err(FetchFailure::Status {
                status_code: status.as_u16(),
                status_text: status_text(status),
            })
        }
        Err(error) => Err(FetchFailure::Network {
            kind: classify_error(&error),
            message: describe_error(&error),
            attempts,
        }),
    }
}

/// Classifies a request error into an [`ErrorKind`]
pub fn classify_error(error: &reqwest::Error) -> ErrorKind {
    if error.is_timeout() {
        ErrorKind::Timeout
    } else if error.is_builder() || error.is_redirect() {
        ErrorKind::Other
    } else if mentions_dns(error) {
        ErrorKind::Dns
    } else {
        ErrorKind::Network
    }
}

/// Returns true for statuses that count as a live link
pub fn is_live_status(status: StatusCode) -> bool {
    status.is_success() || status.is_redirection()
}

/// Delay before the retry that follows `attempt` (1-based)
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32 << attempt.saturating_sub(1).min(16);
    base.saturating_mul(factor).min(MAX_BACKOFF)
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// retry budget is spent. Returns the last outcome and the attempt count.
async fn with_retries<T, F, Fut>(
    url: &str,
    options: &FetchOptions,
    mut op: F,
) -> (Result<T, reqwest::Error>, u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let max_attempts = options.max_retries.saturating_add(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return (Ok(value), attempt),
            Err(error) => {
                let kind = classify_error(&error);
                if !kind.is_retryable() || attempt >= max_attempts {
                    return (Err(error), attempt);
                }

                let delay = backoff_delay(options.retry_backoff, attempt);
                tracing::debug!(
                    "{} failed with {} (attempt {}/{}), retrying in {:?}",
                    url,
                    kind,
                    attempt,
                    max_attempts,
                    delay
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

async fn probe_once(
    client: &Client,
    url: &str,
    options: &FetchOptions,
) -> Result<(StatusCode, String), reqwest::Error> {
    let response = send_once(client, options.method.as_reqwest(), url, options).await?;
    let status = response.status();

    if options.method == FetchMethod::Head && head_not_supported(status) {
        tracing::debug!("HEAD rejected by {} ({}), retrying with GET", url, status);
        let response = send_once(client, Method::GET, url, options).await?;
        return Ok((response.status(), response.url().to_string()));
    }

    Ok((status, response.url().to_string()))
}

async fn send_once(
    client: &Client,
    method: Method,
    url: &str,
    options: &FetchOptions,
) -> Result<reqwest::Response, reqwest::Error> {
    let mut request = client.request(method, url).timeout(options.timeout);
    if let Some(user_agent) = &options.user_agent {
        request = request.header(USER_AGENT, user_agent.as_str());
    }
    request.send().await
}

/// Status, final URL, content type and (for 2xx only) body of one GET
type PageResponse = (StatusCode, String, String, Option<String>);

async fn get_page_once(
    client: &Client,
    url: &str,
    options: &FetchOptions,
) -> Result<PageResponse, reqwest::Error> {
    let response = send_once(client, Method::GET, url, options).await?;
    let status = response.status();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !status.is_success() {
        return Ok((status, final_url, content_type, None));
    }

    let body = read_body_limited(response, url, options.max_body_bytes).await?;
    Ok((status, final_url, content_type, Some(body)))
}

async fn read_body_limited(
    mut response: reqwest::Response,
    url: &str,
    limit: usize,
) -> Result<String, reqwest::Error> {
    let mut out: Vec<u8> = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        if out.len() + chunk.len() > limit {
            let remaining = limit.saturating_sub(out.len());
            out.extend_from_slice(&chunk[..remaining]);
            tracing::warn!("{} is larger than {} bytes, body truncated", url, limit);
            break;
        }
        out.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn looks_like_html(body: &str) -> bool {
    let start = body.trim_start();
    let mut end = start.len().min(SNIFF_BYTES);
    while !start.is_char_boundary(end) {
        end -= 1;
    }
    let head = start[..end].to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.contains("<html")
}

fn head_not_supported(status: StatusCode) -> bool {
    status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown Status")
        .to_string()
}

fn mentions_dns(error: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(error as &(dyn StdError + 'static));
    while let Some(err) = source {
        let message = err.to_string().to_lowercase();
        if DNS_MARKERS.iter().any(|marker| message.contains(marker)) {
            return true;
        }
        source = err.source();
    }
    false
}

/// Returns the innermost error message, which names the actual cause
fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        return "request timed out".to_string();
    }

    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        message = err.to_string();
        source = err.source();
    }
    message
}
