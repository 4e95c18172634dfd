//! Latest-version discovery from the uploads listing.
//!
//! Pre-release exclusion is a plain case-insensitive substring test on the
//! row title, not a semantic channel flag: mirror sites tag pre-releases
//! in free text.

use crate::fetch::FetchedPage;
use regex::Regex;

/// A version found on the uploads listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredVersion {
    /// Dot-form version string.
    pub version: String,
    /// Listing rows passed over before this one.
    pub rows_skipped: usize,
}

/// Scan listing rows in document order for the newest non-prerelease
/// version. Rows titled with "alpha" or "beta" are skipped, as are rows
/// without a dot-separated numeric version in their title.
pub fn discover_latest(page: &FetchedPage) -> Option<DiscoveredVersion> {
    let version_re = Regex::new(r"\d+(\.\d+)+").expect("version regex is valid");
    let mut skipped = 0usize;

    for row in &page.rows {
        let lower = row.text.to_lowercase();
        if lower.contains("alpha") || lower.contains("beta") {
            skipped += 1;
            continue;
        }
        if let Some(m) = version_re.find(&row.text) {
            return Some(DiscoveredVersion {
                version: m.as_str().to_string(),
                rows_skipped: skipped,
            });
        }
        skipped += 1;
    }

    None
}
