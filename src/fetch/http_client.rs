//! Reqwest-backed [`PageFetcher`].
//!
//! Not a browser. Handles redirects, timeouts, retry on 5xx, backoff on
//! 429, and an HTTP/1.1 fallback for CDNs that reject HTTP/2. Non-success
//! statuses surface as [`ResolveError::Transport`]; an accepted response is
//! parsed into a [`FetchedPage`] off the async threads because scraper's
//! DOM types are not `Send`.

use crate::error::{ResolveError, ResolveResult};
use crate::fetch::{page_view, FetchedPage, PageFetcher};
use async_trait::async_trait;
use std::time::Duration;

/// Desktop Chrome user agent; mirror sites serve bot-unfriendly pages to
/// default library UAs.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/131.0.0.0 Safari/537.36";

/// HTTP fetcher returning structured page views.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    /// HTTP/1.1-only fallback client.
    h1_client: reqwest::Client,
    row_selector: String,
    timeout_ms: u64,
}

impl HttpFetcher {
    /// Create a fetcher with the given request timeout and row selector.
    pub fn new(timeout_ms: u64, row_selector: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        let h1_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .http1_only()
            .build()
            .unwrap_or_default();

        Self {
            client,
            h1_client,
            row_selector: row_selector.to_string(),
            timeout_ms,
        }
    }

    async fn get(&self, url: &str) -> ResolveResult<(String, String, u16)> {
        match self.get_inner(&self.client, url).await {
            Ok(resp) => Ok(resp),
            Err(ResolveError::Transport { reason, .. })
                if reason.contains("http2")
                    || reason.contains("protocol")
                    || reason.contains("connection closed") =>
            {
                self.get_inner(&self.h1_client, url).await
            }
            Err(e) => Err(e),
        }
    }

    /// GET with retry on 5xx and backoff on 429. Returns (body, final URL,
    /// status) for a success status only.
    async fn get_inner(
        &self,
        client: &reqwest::Client,
        url: &str,
    ) -> ResolveResult<(String, String, u16)> {
        let mut retries = 0u32;
        let max_retries = 2;

        loop {
            let resp = client
                .get(url)
                .timeout(Duration::from_millis(self.timeout_ms))
                .send()
                .await;

            match resp {
                Ok(r) => {
                    let status = r.status().as_u16();
                    let final_url = r.url().to_string();

                    if status >= 500 && retries < max_retries {
                        retries += 1;
                        let delay = Duration::from_millis(500 * 2u64.pow(retries - 1));
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    if status == 429 && retries < max_retries {
                        retries += 1;
                        let retry_after = r
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(2);
                        tokio::time::sleep(Duration::from_secs(retry_after.min(10))).await;
                        continue;
                    }

                    if !(200..300).contains(&status) {
                        return Err(ResolveError::bad_status(url, status));
                    }

                    let body = r
                        .text()
                        .await
                        .map_err(|e| ResolveError::transport(url, e))?;

                    return Ok((body, final_url, status));
                }
                Err(e) => {
                    if retries < max_retries {
                        retries += 1;
                        let delay = Duration::from_millis(500 * 2u64.pow(retries - 1));
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(ResolveError::transport(url, e));
                }
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> ResolveResult<FetchedPage> {
        let (body, final_url, status) = self.get(url).await?;

        let source = url.to_string();
        let rows = self.row_selector.clone();
        tokio::task::spawn_blocking(move || {
            page_view::parse_page(&body, &source, &final_url, status, &rows)
        })
        .await
        .map_err(|e| ResolveError::transport(url, format!("page parse task failed: {e}")))
    }
}
