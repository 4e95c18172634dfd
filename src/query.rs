//! The resolution target: which app, which version, which build.
//!
//! An [`AppQuery`] is immutable for the duration of one resolution attempt.
//! It is usually assembled by merging a catalog descriptor with CLI flags
//! (flags win), but tests build it directly.

use serde::{Deserialize, Serialize};

/// Default architecture when a descriptor or caller specifies none.
pub const DEFAULT_ARCH: &str = "universal";

/// One resolution target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppQuery {
    /// App identifier as it appears in listing URLs (e.g. "youtube").
    pub app: String,
    /// Organization/vendor identifier in listing URLs (e.g. "google-inc").
    pub org: String,
    /// Listing pages name releases with this prefix; usually equals `app`.
    pub release_prefix: String,
    /// Requested version in dot form. `None` means "latest" and triggers
    /// version discovery.
    pub version: Option<String>,
    /// CPU architecture filter (e.g. "arm64-v8a").
    pub arch: String,
    /// Screen density filter (e.g. "nodpi", "320dpi").
    pub dpi: Option<String>,
    /// Build type filter (e.g. "apk", "bundle").
    pub build_type: Option<String>,
    /// Android package id (e.g. "com.vendor.app"), used by the hint tool.
    pub package: Option<String>,
}

impl Default for AppQuery {
    fn default() -> Self {
        Self {
            app: String::new(),
            org: String::new(),
            release_prefix: String::new(),
            version: None,
            arch: DEFAULT_ARCH.to_string(),
            dpi: None,
            build_type: None,
            package: None,
        }
    }
}

impl AppQuery {
    /// Lower-cased filter criteria for variant matching: architecture always,
    /// density and build type only when specified.
    pub fn criteria(&self) -> Vec<String> {
        let mut out = vec![self.arch.to_lowercase()];
        if let Some(ref dpi) = self.dpi {
            out.push(dpi.to_lowercase());
        }
        if let Some(ref bt) = self.build_type {
            out.push(bt.to_lowercase());
        }
        out
    }
}

/// Hyphen form of a version string: "19.16.39" → "19-16-39".
///
/// Listing URLs use this form; page text may use either.
pub fn dash_form(version: &str) -> String {
    version.replace('.', "-")
}

/// Dot-separated segments of a version string.
pub fn version_segments(version: &str) -> Vec<&str> {
    version.split('.').filter(|s| !s.is_empty()).collect()
}
