//! Candidate listing-URL generation.
//!
//! Pure function of the query: no network, no randomization. The primary
//! candidate carries the full requested version; fallbacks walk backwards
//! through version-prefix truncations, so more specific guesses always
//! precede less specific ones.

use crate::query::{dash_form, version_segments, AppQuery};
use crate::resolve::SiteProfile;
use std::collections::HashSet;

/// One guessed listing-page address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    pub url: String,
    /// Position in the try order; 0 is the most specific guess.
    pub rank: u32,
    /// The dot-form version prefix this candidate was generated from.
    pub version_prefix: String,
}

/// Generate the ordered candidate sequence for `version`.
///
/// Never empty for a non-empty version. De-duplicated by exact URL; the
/// first (most specific) occurrence wins.
pub fn generate(profile: &SiteProfile, query: &AppQuery, version: &str) -> Vec<CandidateUrl> {
    let mut out: Vec<CandidateUrl> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut push = |out: &mut Vec<CandidateUrl>, url: String, prefix: &str| {
        if seen.insert(url.clone()) {
            let rank = out.len() as u32;
            out.push(CandidateUrl {
                url,
                rank,
                version_prefix: prefix.to_string(),
            });
        }
    };

    let app_path = format!(
        "{}/apk/{}/{}",
        profile.base.trim_end_matches('/'),
        query.org,
        query.app
    );

    // Primary: full version under the release prefix, "-release" suffix.
    push(
        &mut out,
        format!(
            "{app_path}/{}-{}-release/",
            query.release_prefix,
            dash_form(version)
        ),
        version,
    );

    // Fallbacks: longest version prefix first, down to one segment. Four
    // shapes per truncation, fewer when the release prefix equals the app
    // identifier or a shape collides with one already emitted.
    let segments = version_segments(version);
    let mut names = vec![query.release_prefix.as_str()];
    if query.app != query.release_prefix {
        names.push(query.app.as_str());
    }

    for len in (1..=segments.len()).rev() {
        let prefix_dot = segments[..len].join(".");
        let prefix_dash = segments[..len].join("-");
        for name in &names {
            for suffix in ["-release", ""] {
                push(
                    &mut out,
                    format!("{app_path}/{name}-{prefix_dash}{suffix}/"),
                    &prefix_dot,
                );
            }
        }
    }

    out
}
