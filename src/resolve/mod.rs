//! The resolution engine.
//!
//! One [`Resolver`] drives: version discovery (when no version was
//! requested) → candidate URL generation → fetch/acceptance loop → variant
//! selection → final-link extraction. Fetches go through the injected
//! [`PageFetcher`]; telemetry goes through an optional event sender instead
//! of ambient state.

pub mod acceptance;
pub mod candidates;
pub mod discovery;
pub mod final_link;
pub mod variants;

use crate::error::{ResolveError, ResolveResult};
use crate::events::{emit, now_timestamp, EventSender, ResolveEvent};
use crate::fetch::{FetchedPage, PageFetcher};
use crate::query::AppQuery;
use acceptance::{AcceptanceStrategy, MatchStrength};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Site-specific knowledge: URL scheme and markup markers. A second
/// mirror site is a new profile value, not new resolution code.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Scheme+host, no trailing slash required.
    pub base: String,
    /// Selector for variant/listing rows, comma list allowed.
    pub row_selector: String,
    /// Href substring identifying a variant detail link.
    pub apk_download_marker: String,
    /// Class marking a row's primary link.
    pub accent_class: String,
    /// Class marking the canonical download button.
    pub download_button_class: String,
    /// Href substring of the fallback final link.
    pub force_base_marker: String,
    /// Href substring carrying the one-time download key.
    pub download_key_marker: String,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            base: "https://www.apkmirror.com".to_string(),
            row_selector: "div.table-row, h5.appRowTitle".to_string(),
            apk_download_marker: "apk-download".to_string(),
            accent_class: "accent_color".to_string(),
            download_button_class: "downloadButton".to_string(),
            force_base_marker: "forcebaseapk=true".to_string(),
            download_key_marker: "key=".to_string(),
        }
    }
}

impl SiteProfile {
    /// Default profile against a different base URL (test servers).
    pub fn with_base(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Uploads listing filtered by app category.
    pub fn uploads_url(&self, app: &str) -> String {
        format!(
            "{}/uploads/?appcategory={}",
            self.base.trim_end_matches('/'),
            app
        )
    }
}

/// Terminal output of a successful resolution. Both fields are always
/// non-empty; partial results never leave the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub final_download_url: String,
    pub resolved_version: String,
}

/// The resolution engine. Cheap to construct; independent per target, so
/// callers may run resolvers for distinct apps concurrently.
pub struct Resolver {
    fetcher: Arc<dyn PageFetcher>,
    profile: SiteProfile,
    strategy: AcceptanceStrategy,
    events: Option<EventSender>,
}

impl Resolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>, profile: SiteProfile) -> Self {
        Self {
            fetcher,
            profile,
            strategy: AcceptanceStrategy::default(),
            events: None,
        }
    }

    /// Switch the acceptance strategy (strict by default).
    pub fn with_strategy(mut self, strategy: AcceptanceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Attach an event sender for resolution telemetry.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Resolve a query to one concrete download URL.
    ///
    /// Runs version discovery first when the query has no version. The
    /// candidate loop treats per-candidate fetch failures as "did not pan
    /// out"; only the variant-page fetch propagates transport errors.
    pub async fn resolve_download(&self, query: &AppQuery) -> ResolveResult<Resolution> {
        let started = Instant::now();

        let version = match &query.version {
            Some(v) => v.clone(),
            None => self.resolve_latest_version(query).await?,
        };

        emit(
            &self.events,
            ResolveEvent::ResolveStarted {
                app: query.app.clone(),
                version: version.clone(),
                timestamp: now_timestamp(),
            },
        );
        info!(app = %query.app, %version, "resolving download");

        let result = self.resolve_with_version(query, &version).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(resolution) => emit(
                &self.events,
                ResolveEvent::ResolveComplete {
                    app: query.app.clone(),
                    version: resolution.resolved_version.clone(),
                    final_url: resolution.final_download_url.clone(),
                    elapsed_ms,
                },
            ),
            Err(e) => emit(
                &self.events,
                ResolveEvent::ResolveFailed {
                    app: query.app.clone(),
                    error: e.to_string(),
                    elapsed_ms,
                },
            ),
        }

        result
    }

    /// Find the latest published non-prerelease version for the app.
    pub async fn resolve_latest_version(&self, query: &AppQuery) -> ResolveResult<String> {
        let url = self.profile.uploads_url(&query.app);
        debug!(%url, "scanning uploads listing");
        let page = self.fetcher.fetch(&url).await?;

        match discovery::discover_latest(&page) {
            Some(found) => {
                info!(app = %query.app, version = %found.version, skipped = found.rows_skipped,
                      "latest version discovered");
                emit(
                    &self.events,
                    ResolveEvent::LatestVersionFound {
                        app: query.app.clone(),
                        version: found.version.clone(),
                        rows_skipped: found.rows_skipped,
                    },
                );
                Ok(found.version)
            }
            None => Err(ResolveError::NotFound {
                app: query.app.clone(),
                version: None,
                attempted: vec![url],
            }),
        }
    }

    async fn resolve_with_version(
        &self,
        query: &AppQuery,
        version: &str,
    ) -> ResolveResult<Resolution> {
        // ── Candidate loop ────────────────────────────────────────────
        let candidates = candidates::generate(&self.profile, query, version);
        let mut attempted: Vec<String> = Vec::with_capacity(candidates.len());
        let mut fallback: Option<FetchedPage> = None;
        let mut accepted: Option<(FetchedPage, MatchStrength)> = None;

        for candidate in &candidates {
            attempted.push(candidate.url.clone());

            let page = match self.fetcher.fetch(&candidate.url).await {
                Ok(page) => {
                    emit(
                        &self.events,
                        ResolveEvent::CandidateFetched {
                            url: candidate.url.clone(),
                            rank: candidate.rank,
                            status: page.status,
                        },
                    );
                    page
                }
                Err(e) => {
                    debug!(url = %candidate.url, rank = candidate.rank, error = %e,
                           "candidate did not pan out");
                    emit(
                        &self.events,
                        ResolveEvent::CandidateFailed {
                            url: candidate.url.clone(),
                            rank: candidate.rank,
                            reason: e.to_string(),
                        },
                    );
                    continue;
                }
            };

            let decision = acceptance::evaluate(&page, version, candidate, self.strategy);
            if decision.accepted {
                info!(url = %candidate.url, strength = %decision.strength, "listing page accepted");
                emit(
                    &self.events,
                    ResolveEvent::PageAccepted {
                        url: candidate.url.clone(),
                        strength: decision.strength.to_string(),
                        fallback: false,
                    },
                );
                accepted = Some((page, decision.strength));
                break;
            }

            // Only the first rejected page is retained as the fallback.
            if fallback.is_none() {
                debug!(url = %candidate.url, "retaining rejected page as fallback");
                emit(
                    &self.events,
                    ResolveEvent::FallbackRetained {
                        url: candidate.url.clone(),
                    },
                );
                fallback = Some(page);
            }
        }

        let page = match accepted {
            Some((page, _)) => page,
            None => match fallback {
                Some(page) => {
                    warn!(url = %page.source_url, "no candidate matched; using fallback page at reduced confidence");
                    emit(
                        &self.events,
                        ResolveEvent::PageAccepted {
                            url: page.source_url.clone(),
                            strength: MatchStrength::None.to_string(),
                            fallback: true,
                        },
                    );
                    page
                }
                None => {
                    return Err(ResolveError::NotFound {
                        app: query.app.clone(),
                        version: Some(version.to_string()),
                        attempted,
                    })
                }
            },
        };

        // ── Variant selection ─────────────────────────────────────────
        let variant = variants::select_variant(&page, query, version, &self.profile)?;
        info!(href = %variant.href, phase = %variant.phase, "variant matched");
        emit(
            &self.events,
            ResolveEvent::VariantMatched {
                url: variant.href.clone(),
                phase: variant.phase.to_string(),
                row_index: variant.row_index,
            },
        );

        // ── Final link ────────────────────────────────────────────────
        let variant_url = absolutize(&variant.href, &page.final_url);
        let variant_page = self.fetcher.fetch(&variant_url).await?;
        let final_url = final_link::extract_final_link(&variant_page, &self.profile)?;
        info!(url = %final_url, "final download link extracted");
        emit(
            &self.events,
            ResolveEvent::FinalLinkFound {
                url: final_url.clone(),
            },
        );

        Ok(Resolution {
            final_download_url: final_url,
            resolved_version: version.to_string(),
        })
    }
}

/// Resolve `href` against `base`, returning `href` unchanged when either
/// side refuses to parse.
fn absolutize(href: &str, base: &str) -> String {
    url::Url::parse(base)
        .ok()
        .and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| href.to_string())
}
