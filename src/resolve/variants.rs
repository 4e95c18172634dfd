//! Two-phase variant selection on an accepted listing page.
//!
//! The structured scan wants precision: one semantic row containing the
//! version and every filter criterion. The unstructured scan wants recall
//! when the expected row container is missing from the markup, settling
//! for marker + version + one of architecture/density on a bare href.

use crate::error::{ResolveError, ResolveResult};
use crate::fetch::{FetchedPage, PageLink};
use crate::query::{dash_form, AppQuery};
use crate::resolve::SiteProfile;

/// Rows of page text carried in a VariantNotFound for diagnosis.
const DIAGNOSTIC_ROWS: usize = 5;

/// Which scan produced the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Structured,
    LinkScan,
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structured => write!(f, "structured"),
            Self::LinkScan => write!(f, "link-scan"),
        }
    }
}

/// The selected variant's detail-page link.
#[derive(Debug, Clone)]
pub struct VariantLink {
    pub href: String,
    /// Index of the matching row; `None` for a link-scan match.
    pub row_index: Option<usize>,
    pub phase: MatchPhase,
}

/// Select the variant matching all of the query's criteria.
///
/// Deterministic left-to-right, top-to-bottom: at most one result per page,
/// and only the first row satisfying the criteria is ever considered.
pub fn select_variant(
    page: &FetchedPage,
    query: &AppQuery,
    version: &str,
    profile: &SiteProfile,
) -> ResolveResult<VariantLink> {
    let dashed = dash_form(version);
    let criteria = query.criteria();

    // Phase 1: structured row scan, full criteria match.
    let matched_row = page.rows.iter().enumerate().find(|(_, row)| {
        let lower = row.text.to_lowercase();
        let version_hit = row.text.contains(version) || row.text.contains(&dashed);
        version_hit && criteria.iter().all(|c| lower.contains(c.as_str()))
    });

    if let Some((index, row)) = matched_row {
        if let Some(link) = primary_link(&row.links, profile) {
            if link
                .href
                .to_lowercase()
                .contains(&profile.apk_download_marker)
            {
                return Ok(VariantLink {
                    href: link.href.clone(),
                    row_index: Some(index),
                    phase: MatchPhase::Structured,
                });
            }
        }
        // The committed row had no usable link; the page gets one more
        // chance through the link scan, never through a later row.
    }

    // Phase 2: unstructured link scan, weaker two-of-many match.
    let arch = query.arch.to_lowercase();
    let dpi = query.dpi.as_ref().map(|d| d.to_lowercase());
    for link in &page.links {
        let href = link.href.to_lowercase();
        let arch_or_dpi =
            href.contains(&arch) || dpi.as_ref().is_some_and(|d| href.contains(d.as_str()));
        if href.contains(&profile.apk_download_marker)
            && href.contains(&dashed.to_lowercase())
            && arch_or_dpi
        {
            return Ok(VariantLink {
                href: link.href.clone(),
                row_index: None,
                phase: MatchPhase::LinkScan,
            });
        }
    }

    let mut full_criteria = vec![version.to_string()];
    full_criteria.extend(criteria);
    Err(ResolveError::VariantNotFound {
        page_url: page.source_url.clone(),
        criteria: full_criteria,
        scanned_rows: page
            .rows
            .iter()
            .take(DIAGNOSTIC_ROWS)
            .map(|r| r.text.clone())
            .collect(),
    })
}

/// The row's primary link: the accent-marked one, else the first with an
/// href.
fn primary_link<'a>(links: &'a [PageLink], profile: &SiteProfile) -> Option<&'a PageLink> {
    links
        .iter()
        .find(|l| l.has_class(&profile.accent_class))
        .or_else(|| links.iter().find(|l| !l.href.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::VariantRow;

    fn profile() -> SiteProfile {
        SiteProfile::default()
    }

    fn query() -> AppQuery {
        AppQuery {
            app: "demo".to_string(),
            org: "demo-org".to_string(),
            release_prefix: "demo".to_string(),
            arch: "arm64-v8a".to_string(),
            dpi: Some("nodpi".to_string()),
            ..Default::default()
        }
    }

    fn link(href: &str, classes: &[&str]) -> PageLink {
        PageLink {
            href: href.to_string(),
            text: String::new(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn row(text: &str, links: Vec<PageLink>) -> VariantRow {
        VariantRow {
            text: text.to_string(),
            links,
        }
    }

    #[test]
    fn test_third_row_matches_all_criteria() {
        let page = FetchedPage {
            source_url: "https://example.com/apk/demo-org/demo/demo-1-2-3-release/".to_string(),
            rows: vec![
                row(
                    "1.2.3 armeabi-v7a nodpi APK",
                    vec![link("/demo-1-2-3-4-android-apk-download/", &[])],
                ),
                row(
                    "1.2.3 x86 nodpi APK",
                    vec![link("/demo-1-2-3-5-android-apk-download/", &[])],
                ),
                row(
                    "1.2.3 arm64-v8a nodpi APK",
                    vec![link("/demo-1-2-3-3-android-apk-download/", &[])],
                ),
            ],
            ..Default::default()
        };

        let v = select_variant(&page, &query(), "1.2.3", &profile()).unwrap();
        assert_eq!(v.row_index, Some(2));
        assert_eq!(v.phase, MatchPhase::Structured);
        assert_eq!(v.href, "/demo-1-2-3-3-android-apk-download/");
    }

    #[test]
    fn test_structured_precedes_link_scan() {
        // A decoy page-level link superficially satisfies the fallback
        // conditions; the row-derived link must still win.
        let page = FetchedPage {
            rows: vec![row(
                "1.2.3 arm64-v8a nodpi",
                vec![link("/row-1-2-3-android-apk-download/", &[])],
            )],
            links: vec![link("/decoy-1-2-3-arm64-v8a-apk-download/", &[])],
            ..Default::default()
        };

        let v = select_variant(&page, &query(), "1.2.3", &profile()).unwrap();
        assert_eq!(v.phase, MatchPhase::Structured);
        assert_eq!(v.href, "/row-1-2-3-android-apk-download/");
    }

    #[test]
    fn test_accent_link_preferred_within_row() {
        let page = FetchedPage {
            rows: vec![row(
                "1.2.3 arm64-v8a nodpi",
                vec![
                    link("/details-1-2-3-apk-download/", &[]),
                    link("/accent-1-2-3-apk-download/", &["accent_color"]),
                ],
            )],
            ..Default::default()
        };

        let v = select_variant(&page, &query(), "1.2.3", &profile()).unwrap();
        assert_eq!(v.href, "/accent-1-2-3-apk-download/");
    }

    #[test]
    fn test_matched_row_without_marker_falls_to_link_scan() {
        let page = FetchedPage {
            rows: vec![row(
                "1.2.3 arm64-v8a nodpi",
                vec![link("/somewhere-else/", &[])],
            )],
            links: vec![link("/demo-1-2-3-arm64-v8a-apk-download/", &[])],
            ..Default::default()
        };

        let v = select_variant(&page, &query(), "1.2.3", &profile()).unwrap();
        assert_eq!(v.phase, MatchPhase::LinkScan);
        assert_eq!(v.href, "/demo-1-2-3-arm64-v8a-apk-download/");
    }

    #[test]
    fn test_first_satisfying_row_wins_even_over_later_rows() {
        // Later rows are never scanned once a row satisfies the criteria,
        // even if the first one's link is unusable and the later one's
        // would have matched.
        let page = FetchedPage {
            rows: vec![
                row("1.2.3 arm64-v8a nodpi", vec![link("/no-marker/", &[])]),
                row(
                    "1.2.3 arm64-v8a nodpi",
                    vec![link("/late-1-2-3-apk-download/", &[])],
                ),
            ],
            ..Default::default()
        };

        let err = select_variant(&page, &query(), "1.2.3", &profile());
        assert!(matches!(err, Err(ResolveError::VariantNotFound { .. })));
    }

    #[test]
    fn test_unspecified_build_type_not_required() {
        let mut q = query();
        q.build_type = None;
        let page = FetchedPage {
            rows: vec![row(
                "1.2.3 arm64-v8a nodpi",
                vec![link("/demo-1-2-3-apk-download/", &[])],
            )],
            ..Default::default()
        };
        assert!(select_variant(&page, &q, "1.2.3", &profile()).is_ok());

        q.build_type = Some("bundle".to_string());
        let err = select_variant(&page, &q, "1.2.3", &profile());
        assert!(matches!(err, Err(ResolveError::VariantNotFound { .. })));
    }

    #[test]
    fn test_link_scan_requires_marker_version_and_arch_or_dpi() {
        let q = query();
        let page = FetchedPage {
            links: vec![
                link("/demo-1-2-3-apk-download/", &[]),       // no arch/dpi
                link("/demo-arm64-v8a-apk-download/", &[]),   // no version
                link("/demo-1-2-3-nodpi-somewhere/", &[]),    // no marker
                link("/demo-1-2-3-nodpi-apk-download/", &[]), // all three
            ],
            ..Default::default()
        };

        let v = select_variant(&page, &q, "1.2.3", &profile()).unwrap();
        assert_eq!(v.href, "/demo-1-2-3-nodpi-apk-download/");
    }

    #[test]
    fn test_variant_not_found_carries_diagnostics() {
        let page = FetchedPage {
            source_url: "https://example.com/page/".to_string(),
            rows: (0..8)
                .map(|i| row(&format!("row {i}"), vec![]))
                .collect(),
            ..Default::default()
        };

        match select_variant(&page, &query(), "1.2.3", &profile()) {
            Err(ResolveError::VariantNotFound {
                page_url,
                criteria,
                scanned_rows,
            }) => {
                assert_eq!(page_url, "https://example.com/page/");
                assert!(criteria.contains(&"1.2.3".to_string()));
                assert!(criteria.contains(&"arm64-v8a".to_string()));
                assert_eq!(scanned_rows.len(), 5);
                assert_eq!(scanned_rows[0], "row 0");
            }
            other => panic!("expected VariantNotFound, got {other:?}"),
        }
    }
}
