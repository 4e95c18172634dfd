//! Page fetching abstraction.
//!
//! The resolver never touches network I/O or HTML parsing primitives; it
//! consumes already-structured [`FetchedPage`] values through the
//! [`PageFetcher`] trait. Implementations: [`http_client::HttpFetcher`]
//! (reqwest + scraper), [`pacing::ThrottledFetcher`] (delay decorator), and
//! synthetic fixture fetchers in tests.

pub mod http_client;
pub mod page_view;
pub mod pacing;

use crate::error::ResolveResult;
use async_trait::async_trait;

/// A hyperlink with its class list, as found on a page or inside a row.
#[derive(Debug, Clone, Default)]
pub struct PageLink {
    /// Href resolved against the page URL when relative.
    pub href: String,
    /// Visible link text, whitespace-collapsed.
    pub text: String,
    /// CSS classes on the anchor element.
    pub classes: Vec<String>,
}

impl PageLink {
    /// Whether the anchor carries the given CSS class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// One row of a build-variant table on a listing page.
#[derive(Debug, Clone, Default)]
pub struct VariantRow {
    /// The row's full text content, whitespace-collapsed.
    pub text: String,
    /// Links inside the row, in document order.
    pub links: Vec<PageLink>,
}

/// Structured view of one fetched page. Ephemeral: lives for the duration
/// of a single resolution step and is never persisted.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    /// The URL that was requested.
    pub source_url: String,
    /// The URL after redirects.
    pub final_url: String,
    /// HTTP status code (always a success status; transport failures and
    /// non-success statuses surface as errors, never as empty pages).
    pub status: u16,
    /// Page title.
    pub title: String,
    /// Text of every h1–h6, in document order.
    pub headings: Vec<String>,
    /// Full body text, whitespace-collapsed.
    pub body_text: String,
    /// Variant-table rows, in document order.
    pub rows: Vec<VariantRow>,
    /// Every hyperlink on the page, in document order.
    pub links: Vec<PageLink>,
}

impl FetchedPage {
    /// Whether the title, any heading, or the body text contains `needle`.
    pub fn any_text_contains(&self, needle: &str) -> bool {
        self.title.contains(needle)
            || self.headings.iter().any(|h| h.contains(needle))
            || self.body_text.contains(needle)
    }
}

/// Fetches a URL and returns its structured page view.
///
/// Transport failures (network errors, timeouts, non-success statuses) are
/// explicit [`crate::error::ResolveError::Transport`] values.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ResolveResult<FetchedPage>;
}
