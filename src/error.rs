//! Error taxonomy for resolution and download.
//!
//! Every failure crosses component boundaries as a typed [`ResolveError`]
//! value carrying enough context for diagnostic logging by the caller.
//! The CLI wraps these in `anyhow` for display; library code never panics
//! on a resolution failure.

/// All errors a resolution or download can end in.
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    /// Fetch failed at the network/HTTP layer: timeout, connection refused,
    /// or a non-success status. Not retried by the resolver; the caller may
    /// retry the whole resolution later.
    #[error("transport failure fetching {url}: {reason}")]
    Transport { url: String, reason: String },

    /// No candidate listing page was ever accepted, or the uploads listing
    /// offered no qualifying row. Terminal for this resolution. Carries
    /// every URL that was tried, in order.
    #[error("nothing accepted for '{app}' ({} URL(s) tried)", attempted.len())]
    NotFound {
        app: String,
        /// The version being resolved, absent when discovery itself failed.
        version: Option<String>,
        attempted: Vec<String>,
    },

    /// A listing page was accepted but no variant row or link satisfied the
    /// filter criteria. Carries the criteria and the first scanned rows'
    /// text so callers can log what the page actually offered.
    #[error("no variant matching [{}] on {page_url}", criteria.join(", "))]
    VariantNotFound {
        page_url: String,
        criteria: Vec<String>,
        scanned_rows: Vec<String>,
    },

    /// The variant detail page carried no recognizable final download link.
    #[error("no final download link on {page_url}")]
    Extraction { page_url: String },
}

impl ResolveError {
    /// Transport error from a reqwest or I/O failure.
    pub fn transport(url: &str, err: impl std::fmt::Display) -> Self {
        ResolveError::Transport {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }

    /// Transport error from a non-success HTTP status.
    pub fn bad_status(url: &str, status: u16) -> Self {
        ResolveError::Transport {
            url: url.to_string(),
            reason: format!("HTTP {status}"),
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
