//! Streaming file downloads.
//!
//! The final URL from a resolution is fetched with the same browser
//! identity as page fetches, streamed to disk, and digested on the fly. A
//! failed transfer never leaves a partial file behind.

use crate::events::{emit, EventSender, ResolveEvent};
use crate::fetch::http_client::USER_AGENT;
use anyhow::{Context, Result};
use futures::StreamExt;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Outcome of one completed download.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadReport {
    pub url: String,
    pub path: PathBuf,
    pub bytes_written: u64,
    pub sha256: String,
    pub elapsed_ms: u64,
}

/// Streams URLs to local files.
pub struct Downloader {
    client: reqwest::Client,
    events: Option<EventSender>,
}

impl Downloader {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("building download client")?;
        Ok(Self {
            client,
            events: None,
        })
    }

    /// Attach an event sender for transfer telemetry.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Download `url` to `dest`, creating parent directories as needed.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<DownloadReport> {
        let started = Instant::now();
        info!(%url, dest = %dest.display(), "downloading");

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating directory: {}", parent.display()))?;
            }
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("requesting {url}"))?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("download failed with status {} for {url}", status.as_u16());
        }

        let total_bytes = response.content_length();
        emit(
            &self.events,
            ResolveEvent::DownloadStarted {
                url: url.to_string(),
                total_bytes,
            },
        );

        let (bytes_written, sha256) = match self.stream_to_file(response, dest, total_bytes).await {
            Ok(written) => written,
            Err(e) => {
                // Never leave a truncated file behind.
                let _ = tokio::fs::remove_file(dest).await;
                return Err(e);
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(bytes = bytes_written, %sha256, "download complete");
        emit(
            &self.events,
            ResolveEvent::DownloadComplete {
                path: dest.display().to_string(),
                bytes_written,
                sha256: sha256.clone(),
                elapsed_ms,
            },
        );

        Ok(DownloadReport {
            url: url.to_string(),
            path: dest.to_path_buf(),
            bytes_written,
            sha256,
            elapsed_ms,
        })
    }

    async fn stream_to_file(
        &self,
        response: reqwest::Response,
        dest: &Path,
        total_bytes: Option<u64>,
    ) -> Result<(u64, String)> {
        let mut file = File::create(dest)
            .await
            .with_context(|| format!("creating file: {}", dest.display()))?;

        let mut stream = response.bytes_stream();
        let mut bytes_written: u64 = 0;
        let mut hasher = Sha256::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("reading response body")?;
            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .with_context(|| format!("writing {}", dest.display()))?;
            bytes_written += chunk.len() as u64;
            emit(
                &self.events,
                ResolveEvent::DownloadProgress {
                    bytes_written,
                    total_bytes,
                },
            );
        }

        file.flush().await.context("flushing file")?;
        Ok((bytes_written, sha256_hex(&hasher.finalize())))
    }
}

/// Lowercase hex rendering of a digest.
fn sha256_hex(hash: &[u8]) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BODY: &str = "hello apk";
    const BODY_SHA256: &str = "570808ed0224147f016b1ee468f5ab941c0e0d3bc8bcfb21ca6a2a37c6a571aa";

    #[tokio::test]
    async fn test_download_writes_file_and_digest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/demo.apk"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("nested").join("demo.apk");
        let report = Downloader::new()
            .unwrap()
            .download(&format!("{}/demo.apk", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(report.bytes_written, BODY.len() as u64);
        assert_eq!(report.sha256, BODY_SHA256);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), BODY);
    }

    #[tokio::test]
    async fn test_download_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.apk"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("gone.apk");
        let result = Downloader::new()
            .unwrap()
            .download(&format!("{}/gone.apk", server.uri()), &dest)
            .await;

        assert!(result.is_err());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_download_emits_transfer_events() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/demo.apk"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
            .mount(&server)
            .await;

        let bus = EventBus::new(64);
        let mut rx = bus.subscribe();
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("demo.apk");

        Downloader::new()
            .unwrap()
            .with_events(bus.sender())
            .download(&format!("{}/demo.apk", server.uri()), &dest)
            .await
            .unwrap();

        let mut saw_started = false;
        let mut saw_complete = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                ResolveEvent::DownloadStarted { .. } => saw_started = true,
                ResolveEvent::DownloadComplete { sha256, .. } => {
                    assert_eq!(sha256, BODY_SHA256);
                    saw_complete = true;
                }
                _ => {}
            }
        }
        assert!(saw_started);
        assert!(saw_complete);
    }
}
