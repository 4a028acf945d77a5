use anyhow::{Context, Error, Result, anyhow};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("fundscope/", env!("CARGO_PKG_VERSION"));

/// Builds an HTTP client whose requests give up after `timeout`.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(anyhow::Error::from) {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// GETs `url` and returns the body of a successful, non-empty response.
pub async fn fetch_text(
    client: &reqwest::Client,
    url: &str,
    retries: usize,
    delay_ms: u64,
) -> Result<String> {
    let response = with_retry(
        || async { client.get(url).send().await?.error_for_status() },
        retries,
        delay_ms,
    )
    .await
    .with_context(|| format!("Request to {url} failed"))?;

    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read response body from {url}"))?;

    if body.trim().is_empty() {
        return Err(anyhow!("Received empty response from {url}"));
    }
    Ok(body)
}
