//! Page acceptance evaluation.
//!
//! Decides whether a fetched page really is the listing for the requested
//! version. URL containment outranks page text: a version baked into the
//! URL we asked for (or were redirected to) is immune to markup drift, so
//! it forces acceptance even when the page content disagrees.

use crate::fetch::FetchedPage;
use crate::query::dash_form;
use crate::resolve::candidates::CandidateUrl;

/// How much evidence backed an acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrength {
    /// The originating URL contains the hyphen-form version. Unconditional.
    Forced,
    /// The post-redirect URL contains the hyphen-form version.
    UrlMatch,
    /// Title, a heading, or the body contains the version.
    TextMatch,
    /// No evidence; page rejected.
    None,
}

impl std::fmt::Display for MatchStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forced => write!(f, "forced"),
            Self::UrlMatch => write!(f, "url-match"),
            Self::TextMatch => write!(f, "text-match"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Outcome of evaluating one fetched page. Drives control flow only.
#[derive(Debug, Clone, Copy)]
pub struct AcceptanceDecision {
    pub accepted: bool,
    pub strength: MatchStrength,
}

/// How permissive text matching is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceptanceStrategy {
    /// Only the full requested version counts as a text match.
    #[default]
    Strict,
    /// The truncated version prefix that generated the candidate also
    /// counts as a text match. URL precedence is unchanged.
    Fuzzy,
}

/// Evaluate one fetched page against the requested version.
///
/// Precedence: originating-URL containment, then redirected-URL
/// containment, then text. First satisfied wins.
pub fn evaluate(
    page: &FetchedPage,
    version: &str,
    candidate: &CandidateUrl,
    strategy: AcceptanceStrategy,
) -> AcceptanceDecision {
    let dashed = dash_form(version);

    if page.source_url.contains(&dashed) {
        return AcceptanceDecision {
            accepted: true,
            strength: MatchStrength::Forced,
        };
    }

    if page.final_url.contains(&dashed) {
        return AcceptanceDecision {
            accepted: true,
            strength: MatchStrength::UrlMatch,
        };
    }

    if page.any_text_contains(version) || page.any_text_contains(&dashed) {
        return AcceptanceDecision {
            accepted: true,
            strength: MatchStrength::TextMatch,
        };
    }

    if strategy == AcceptanceStrategy::Fuzzy && candidate.version_prefix != version {
        let prefix = &candidate.version_prefix;
        let prefix_dashed = dash_form(prefix);
        if page.any_text_contains(prefix) || page.any_text_contains(&prefix_dashed) {
            return AcceptanceDecision {
                accepted: true,
                strength: MatchStrength::TextMatch,
            };
        }
    }

    AcceptanceDecision {
        accepted: false,
        strength: MatchStrength::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(url: &str, prefix: &str) -> CandidateUrl {
        CandidateUrl {
            url: url.to_string(),
            rank: 0,
            version_prefix: prefix.to_string(),
        }
    }

    fn page(source: &str, final_url: &str, title: &str, body: &str) -> FetchedPage {
        FetchedPage {
            source_url: source.to_string(),
            final_url: final_url.to_string(),
            status: 200,
            title: title.to_string(),
            body_text: body.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_url_containment_forces_accept_despite_contradicting_body() {
        let p = page(
            "https://example.com/apk/o/a/app-1-2-3-release/",
            "https://example.com/apk/o/a/app-1-2-3-release/",
            "Something else entirely",
            "no version mentioned anywhere",
        );
        let d = evaluate(
            &p,
            "1.2.3",
            &candidate(&p.source_url, "1.2.3"),
            AcceptanceStrategy::Strict,
        );
        assert!(d.accepted);
        assert_eq!(d.strength, MatchStrength::Forced);
    }

    #[test]
    fn test_redirect_target_url_matches() {
        let p = page(
            "https://example.com/apk/o/a/app-1-2/",
            "https://example.com/apk/o/a/app-1-2-3-release/",
            "irrelevant",
            "irrelevant",
        );
        let d = evaluate(
            &p,
            "1.2.3",
            &candidate(&p.source_url, "1.2"),
            AcceptanceStrategy::Strict,
        );
        assert!(d.accepted);
        assert_eq!(d.strength, MatchStrength::UrlMatch);
    }

    #[test]
    fn test_text_match_dot_form_in_title() {
        let p = page(
            "https://example.com/apk/o/a/app-1-2/",
            "https://example.com/apk/o/a/app-1-2/",
            "Demo App 1.2.3 release",
            "",
        );
        let d = evaluate(
            &p,
            "1.2.3",
            &candidate(&p.source_url, "1.2"),
            AcceptanceStrategy::Strict,
        );
        assert!(d.accepted);
        assert_eq!(d.strength, MatchStrength::TextMatch);
    }

    #[test]
    fn test_text_match_hyphen_form_in_body() {
        let p = page(
            "https://example.com/apk/o/a/app-1-2/",
            "https://example.com/apk/o/a/app-1-2/",
            "Demo App",
            "download app-1-2-3 here",
        );
        let d = evaluate(
            &p,
            "1.2.3",
            &candidate(&p.source_url, "1.2"),
            AcceptanceStrategy::Strict,
        );
        assert!(d.accepted);
        assert_eq!(d.strength, MatchStrength::TextMatch);
    }

    #[test]
    fn test_no_evidence_rejects() {
        let p = page(
            "https://example.com/apk/o/a/app-old/",
            "https://example.com/apk/o/a/app-old/",
            "Demo App archive",
            "versions 0.9 and 1.0",
        );
        let d = evaluate(
            &p,
            "1.2.3",
            &candidate(&p.source_url, "1.2"),
            AcceptanceStrategy::Strict,
        );
        assert!(!d.accepted);
        assert_eq!(d.strength, MatchStrength::None);
    }

    #[test]
    fn test_fuzzy_accepts_truncated_prefix_text() {
        let p = page(
            "https://example.com/apk/o/a/app-archive/",
            "https://example.com/apk/o/a/app-archive/",
            "Demo App 1.2 series",
            "",
        );
        let c = candidate(&p.source_url, "1.2");
        let strict = evaluate(&p, "1.2.3", &c, AcceptanceStrategy::Strict);
        assert!(!strict.accepted);
        let fuzzy = evaluate(&p, "1.2.3", &c, AcceptanceStrategy::Fuzzy);
        assert!(fuzzy.accepted);
        assert_eq!(fuzzy.strength, MatchStrength::TextMatch);
    }

    #[test]
    fn test_url_precedence_over_text() {
        let p = page(
            "https://example.com/apk/o/a/app-1-2-3-release/",
            "https://example.com/apk/o/a/app-1-2-3-release/",
            "Demo App 1.2.3",
            "1.2.3",
        );
        let d = evaluate(
            &p,
            "1.2.3",
            &candidate(&p.source_url, "1.2.3"),
            AcceptanceStrategy::Strict,
        );
        assert_eq!(d.strength, MatchStrength::Forced);
    }
}
