// Copyright 2026 apkscout contributors
// SPDX-License-Identifier: Apache-2.0

//! Typed resolution events over a broadcast channel.
//!
//! The resolver and downloader accept an optional [`EventSender`] instead of
//! writing to ambient logging state. Consumers such as the CLI progress bar
//! subscribe independently. When no subscribers exist, events are silently
//! dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Every event emitted during resolution and download. Serialized to JSON
/// for `--json` event streaming.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResolveEvent {
    // ── Resolution ────────────────────────
    /// A resolution attempt has started.
    ResolveStarted {
        app: String,
        version: String,
        timestamp: String,
    },
    /// A candidate listing URL was fetched.
    CandidateFetched { url: String, rank: u32, status: u16 },
    /// A candidate listing URL failed at the transport layer.
    CandidateFailed {
        url: String,
        rank: u32,
        reason: String,
    },
    /// A fetched page was accepted as the listing page.
    PageAccepted {
        url: String,
        strength: String,
        fallback: bool,
    },
    /// A rejected page was retained as the low-confidence fallback.
    FallbackRetained { url: String },
    /// A variant row or link matched the filter criteria.
    VariantMatched {
        url: String,
        phase: String,
        row_index: Option<usize>,
    },
    /// The final download link was extracted from the variant page.
    FinalLinkFound { url: String },
    /// Resolution finished with a download URL.
    ResolveComplete {
        app: String,
        version: String,
        final_url: String,
        elapsed_ms: u64,
    },
    /// Resolution failed.
    ResolveFailed {
        app: String,
        error: String,
        elapsed_ms: u64,
    },

    // ── Version discovery ─────────────────
    /// The uploads listing produced a latest version.
    LatestVersionFound {
        app: String,
        version: String,
        rows_skipped: usize,
    },
    /// An external hint tool supplied a version.
    HintVersionFound { app: String, version: String },

    // ── Download ──────────────────────────
    /// Byte transfer has started.
    DownloadStarted {
        url: String,
        total_bytes: Option<u64>,
    },
    /// Periodic byte counter update.
    DownloadProgress {
        bytes_written: u64,
        total_bytes: Option<u64>,
    },
    /// File fully written and digested.
    DownloadComplete {
        path: String,
        bytes_written: u64,
        sha256: String,
        elapsed_ms: u64,
    },
}

/// Sender handle for resolution events.
///
/// Backed by `tokio::sync::broadcast` so multiple listeners can subscribe
/// independently. `send()` errors when nobody listens; we ignore that.
pub type EventSender = broadcast::Sender<ResolveEvent>;

/// Receiver handle for resolution events.
pub type EventReceiver = broadcast::Receiver<ResolveEvent>;

/// The event bus handed to resolvers and downloaders.
pub struct EventBus {
    sender: EventSender,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers. Silently ignores if none exist.
    pub fn emit(&self, event: ResolveEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive all future events.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Clone of the raw sender, for handing to a resolver.
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }
}

/// Emit through an optional sender, silently ignoring send errors.
pub fn emit(tx: &Option<EventSender>, event: ResolveEvent) {
    if let Some(sender) = tx {
        let _ = sender.send(event);
    }
}

/// Seconds since the Unix epoch, as a string.
pub fn now_timestamp() -> String {
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", dur.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ResolveEvent::ResolveStarted {
            app: "demo".to_string(),
            version: "1.2.3".to_string(),
            timestamp: "1708276800".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("ResolveStarted"));
        assert!(json.contains("demo"));

        // Roundtrip
        let parsed: ResolveEvent = serde_json::from_str(&json).unwrap();
        match parsed {
            ResolveEvent::ResolveStarted { app, .. } => assert_eq!(app, "demo"),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_event_bus_emit_no_subscribers() {
        let bus = EventBus::new(16);
        // Must not panic with zero subscribers
        bus.emit(ResolveEvent::FinalLinkFound {
            url: "https://example.com/dl".to_string(),
        });
    }

    #[test]
    fn test_event_bus_subscribe_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(ResolveEvent::CandidateFetched {
            url: "https://example.com/a/".to_string(),
            rank: 0,
            status: 200,
        });

        match rx.try_recv().unwrap() {
            ResolveEvent::CandidateFetched { rank, status, .. } => {
                assert_eq!(rank, 0);
                assert_eq!(status, 200);
            }
            _ => panic!("wrong event"),
        }
    }

    #[test]
    fn test_emit_none_sender_is_noop() {
        emit(
            &None,
            ResolveEvent::FallbackRetained {
                url: "https://example.com/".to_string(),
            },
        );
    }

    #[test]
    fn test_download_progress_tagged_json() {
        let event = ResolveEvent::DownloadProgress {
            bytes_written: 4096,
            total_bytes: Some(8192),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"DownloadProgress""#));
        assert!(json.contains("4096"));
    }
}
