//! Concurrent URL checking with deduplication and a retry/redirect state
//! machine.
//!
//! The checker probes each unique URL exactly once per invocation with a
//! HEAD request (falling back to GET on 405), follows redirects itself with
//! transport-level redirect handling disabled, retries transport failures
//! with a short exponential backoff, and classifies the terminal response
//! into the [`Status`] taxonomy. Results stream back in completion order
//! through a bounded channel; a shared cancellation token stops all pending
//! and in-flight work.

use reqwest::{Client, StatusCode};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

use crate::recognize::is_http_url;
use crate::types::{CheckResult, Link, RedirectStep, Status};
use crate::{Error, Result};

/// Maximum length of a reported transport error message.
const ERROR_MESSAGE_LIMIT: usize = 256;

/// Base delay of the retry backoff; doubles per attempt.
const BACKOFF_BASE: Duration = Duration::from_millis(100);

/// Tuning knobs for a [`Checker`].
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Number of URLs probed concurrently.
    pub concurrency: usize,
    /// Deadline for each individual HTTP attempt.
    pub timeout_per_request: Duration,
    /// Additional attempts after a transport failure.
    pub max_retries: usize,
    /// Cap on redirect chain length.
    pub max_redirects: usize,
    /// User-Agent header sent with every probe.
    pub user_agent: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            concurrency: 50,
            timeout_per_request: Duration::from_secs(5),
            max_retries: 1,
            max_redirects: 10,
            user_agent: concat!("linkvet/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Concurrent, deduplicating URL checker.
///
/// The HTTP client is shared by all workers; its connection pool is sized
/// to the configured concurrency so slots never wait on connections.
pub struct Checker {
    client: Client,
    config: CheckerConfig,
    cancel: CancellationToken,
}

impl Checker {
    /// Creates a checker with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] when the client cannot be constructed.
    pub fn new(config: CheckerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout_per_request)
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::none())
            .pool_max_idle_per_host(config.concurrency.max(1))
            .build()
            .map_err(Error::Network)?;
        Ok(Self {
            client,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Token that cancels all pending and in-flight work when triggered.
    ///
    /// Already-emitted results remain valid; the result stream closes in
    /// bounded time after cancellation.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Checks every link, returning once each input has produced a result.
    ///
    /// Results arrive in completion order; consumers that need
    /// deterministic order sort by `(file, line)`. Each `Duplicate` result
    /// appears after its canonical counterpart.
    ///
    /// # Errors
    ///
    /// Per-URL failures never error; they are recorded as `Error`-status
    /// results. Only resource exhaustion propagates.
    #[instrument(skip_all, fields(links = links.len()))]
    pub async fn check_all(&self, links: Vec<Link>) -> Result<Vec<CheckResult>> {
        let mut results = Vec::with_capacity(links.len());
        let mut stream = self.check(links);
        while let Some(result) = stream.next().await {
            results.push(result);
        }
        Ok(results)
    }

    /// Checks every link, streaming results in completion order.
    ///
    /// Dropping the stream cancels remaining work implicitly: workers stop
    /// as soon as the channel closes.
    #[must_use]
    pub fn check(&self, links: Vec<Link>) -> ReceiverStream<CheckResult> {
        let (tx, rx) = mpsc::channel(self.config.concurrency.max(1) * 2);
        let jobs = dedup_jobs(links);
        let client = self.client.clone();
        let config = self.config.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let slots = Arc::new(Semaphore::new(config.concurrency.max(1)));
            for job in jobs {
                let permit = tokio::select! {
                    () = cancel.cancelled() => break,
                    permit = Arc::clone(&slots).acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break,
                    },
                };
                let tx = tx.clone();
                let client = client.clone();
                let config = config.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    let _slot = permit;
                    let outcome = tokio::select! {
                        () = cancel.cancelled() => return,
                        outcome = probe_url(&client, &config, &job.canonical.url) => outcome,
                    };
                    let canonical = outcome.into_result(job.canonical);
                    let shared = Arc::new(canonical.clone());
                    if tx.send(canonical).await.is_err() {
                        return;
                    }
                    // Duplicates only ever trail their canonical result, so
                    // a duplicate's back-reference is never pending.
                    for duplicate in job.duplicates {
                        let result = CheckResult::duplicate(duplicate, Arc::clone(&shared));
                        if tx.send(result).await.is_err() {
                            return;
                        }
                    }
                });
            }
        });

        ReceiverStream::new(rx)
    }
}

/// One unique URL with its canonical link and any further occurrences.
struct UrlJob {
    canonical: Link,
    duplicates: Vec<Link>,
}

/// Groups links by exact URL, preserving first-occurrence order.
fn dedup_jobs(links: Vec<Link>) -> Vec<UrlJob> {
    let mut order = Vec::new();
    let mut jobs: HashMap<String, UrlJob> = HashMap::new();
    for link in links {
        match jobs.entry(link.url.clone()) {
            Entry::Occupied(mut entry) => entry.get_mut().duplicates.push(link),
            Entry::Vacant(entry) => {
                order.push(link.url.clone());
                entry.insert(UrlJob {
                    canonical: link,
                    duplicates: Vec::new(),
                });
            }
        }
    }
    order.into_iter().filter_map(|url| jobs.remove(&url)).collect()
}

/// Everything learned about one URL, before pairing with its link.
struct ProbeOutcome {
    status: Status,
    status_code: Option<u16>,
    error_message: Option<String>,
    redirect_chain: Vec<RedirectStep>,
    final_url: Option<String>,
    final_status: Option<u16>,
}

impl ProbeOutcome {
    fn into_result(self, link: Link) -> CheckResult {
        CheckResult {
            link,
            status: self.status,
            status_code: self.status_code,
            error_message: self.error_message,
            redirect_chain: self.redirect_chain,
            final_url: self.final_url,
            final_status: self.final_status,
            duplicate_of: None,
        }
    }
}

/// Result of following one redirect chain to its end.
enum ChainResult {
    /// A terminal HTTP response was received.
    Terminal {
        code: u16,
        chain: Vec<RedirectStep>,
        terminal_url: String,
    },
    /// Transport failure or redirect overflow; retried while budget lasts.
    Transient {
        message: String,
        chain: Vec<RedirectStep>,
        last_url: String,
    },
}

/// Runs the full attempt loop for one URL.
///
/// HTTP status codes are classified, never retried; transport failures are
/// retried up to `max_retries` with exponential backoff, each attempt
/// restarting from the original URL with a fresh chain.
async fn probe_url(client: &Client, config: &CheckerConfig, url: &str) -> ProbeOutcome {
    let mut last_failure: Option<(String, Vec<RedirectStep>, String)> = None;
    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            tokio::time::sleep(backoff(attempt, config.timeout_per_request)).await;
        }
        match follow_redirects(client, config, url).await {
            ChainResult::Terminal {
                code,
                chain,
                terminal_url,
            } => return classify(code, chain, terminal_url),
            ChainResult::Transient {
                message,
                chain,
                last_url,
            } => {
                debug!(url, attempt, %message, "probe attempt failed");
                last_failure = Some((message, chain, last_url));
            }
        }
    }

    let (message, chain, last_url) = last_failure.unwrap_or_else(|| {
        ("request failed".to_string(), Vec::new(), url.to_string())
    });
    let redirected = !chain.is_empty();
    ProbeOutcome {
        status: Status::Error,
        status_code: None,
        error_message: Some(message),
        final_url: redirected.then_some(last_url),
        final_status: None,
        redirect_chain: chain,
    }
}

/// Follows redirects from `start` until a terminal response, a transport
/// failure, or chain overflow.
async fn follow_redirects(client: &Client, config: &CheckerConfig, start: &str) -> ChainResult {
    let mut chain = Vec::new();
    let mut current = start.to_string();
    loop {
        let response = match send_probe(client, &current).await {
            Ok(response) => response,
            Err(message) => {
                return ChainResult::Transient {
                    message,
                    chain,
                    last_url: current,
                };
            }
        };
        let code = response.status().as_u16();
        if matches!(code, 301 | 302 | 307 | 308) {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            if let Some(location) = location {
                if chain.len() >= config.max_redirects {
                    return ChainResult::Transient {
                        message: "too many redirects".to_string(),
                        chain,
                        last_url: current,
                    };
                }
                let next = resolve_location(&current, &location);
                chain.push(RedirectStep {
                    url: current,
                    status_code: code,
                });
                current = next;
                continue;
            }
            // A redirect without Location cannot be followed; fall through
            // and classify it like any other non-2xx terminal.
        }
        return ChainResult::Terminal {
            code,
            chain,
            terminal_url: current,
        };
    }
}

/// Issues one HEAD probe, falling back to GET when the origin forbids HEAD.
async fn send_probe(client: &Client, url: &str) -> std::result::Result<reqwest::Response, String> {
    let response = client
        .head(url)
        .send()
        .await
        .map_err(|e| concise_error(&e))?;
    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        debug!(url, "HEAD not allowed, retrying with GET");
        return client.get(url).send().await.map_err(|e| concise_error(&e));
    }
    Ok(response)
}

fn classify(code: u16, chain: Vec<RedirectStep>, terminal_url: String) -> ProbeOutcome {
    let redirected = !chain.is_empty();
    let status = match code {
        200..=299 if redirected => Status::Redirect,
        200..=299 => Status::Alive,
        403 => Status::Blocked,
        _ => Status::Dead,
    };
    ProbeOutcome {
        status,
        status_code: Some(code),
        error_message: None,
        final_url: redirected.then_some(terminal_url),
        final_status: redirected.then_some(code),
        redirect_chain: chain,
    }
}

/// Resolves a `Location` header against the URL that produced it.
fn resolve_location(current: &str, location: &str) -> String {
    if is_http_url(location) {
        return location.to_string();
    }
    Url::parse(current)
        .ok()
        .and_then(|base| base.join(location).ok())
        .map_or_else(|| location.to_string(), |joined| joined.to_string())
}

/// Exponential backoff bounded by the per-request timeout.
fn backoff(attempt: usize, timeout: Duration) -> Duration {
    let shift = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(6);
    BACKOFF_BASE.saturating_mul(1 << shift).min(timeout)
}

/// Reduces a transport error to a single concise line.
///
/// Walks to the root cause so messages read "connection refused" rather
/// than reqwest's URL-laden wrapper text.
fn concise_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        return "timeout".to_string();
    }
    let mut cause: &dyn std::error::Error = error;
    while let Some(source) = cause.source() {
        cause = source;
    }
    let message = if error.is_connect() {
        format!("connection failed: {cause}")
    } else {
        cause.to_string()
    };
    message
        .replace(['\n', '\r'], " ")
        .chars()
        .take(ERROR_MESSAGE_LIMIT)
        .collect()
}
