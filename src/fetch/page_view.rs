//! Raw HTML → [`FetchedPage`] conversion.
//!
//! The single place CSS selectors appear. Everything downstream (acceptance,
//! variant selection, link extraction) operates on the structured view, so
//! matching logic stays testable against synthetic fixtures.

use crate::fetch::{FetchedPage, PageLink, VariantRow};
use scraper::{ElementRef, Html, Selector};

/// Parse raw HTML into a structured page view.
///
/// `row_selector` picks the elements treated as variant/listing rows; an
/// unparsable selector simply yields no rows. Hrefs are resolved against
/// `final_url`.
pub fn parse_page(
    html: &str,
    source_url: &str,
    final_url: &str,
    status: u16,
    row_selector: &str,
) -> FetchedPage {
    let document = Html::parse_document(html);
    let base = url::Url::parse(final_url)
        .or_else(|_| url::Url::parse(source_url))
        .ok();

    let title_sel = Selector::parse("title").unwrap();
    let title = document
        .select(&title_sel)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();

    let mut headings = Vec::new();
    for level in 1..=6u8 {
        let tag = format!("h{level}");
        let sel = match Selector::parse(&tag) {
            Ok(s) => s,
            Err(_) => continue,
        };
        for el in document.select(&sel) {
            let text = element_text(&el);
            if !text.is_empty() {
                headings.push(text);
            }
        }
    }

    let body_sel = Selector::parse("body").unwrap();
    let body_text = document
        .select(&body_sel)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();

    let links = collect_links(document.root_element(), &base);

    let mut rows = Vec::new();
    if let Ok(sel) = Selector::parse(row_selector) {
        for row_el in document.select(&sel) {
            rows.push(VariantRow {
                text: element_text(&row_el),
                links: collect_links(row_el, &base),
            });
        }
    }

    FetchedPage {
        source_url: source_url.to_string(),
        final_url: final_url.to_string(),
        status,
        title,
        headings,
        body_text,
        rows,
        links,
    }
}

/// Whitespace-collapsed text content of an element.
fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Anchors under `scope` in document order, hrefs resolved against `base`.
fn collect_links(scope: ElementRef<'_>, base: &Option<url::Url>) -> Vec<PageLink> {
    let sel = Selector::parse("a[href]").unwrap();
    let mut out = Vec::new();

    for el in scope.select(&sel) {
        let href = el.value().attr("href").unwrap_or("");
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            continue;
        }

        let resolved = if let Some(base) = base {
            base.join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string())
        } else {
            href.to_string()
        };

        out.push(PageLink {
            href: resolved,
            text: element_text(&el),
            classes: el.value().classes().map(|c| c.to_string()).collect(),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROWS: &str = "div.table-row, h5.appRowTitle";

    #[test]
    fn test_parse_title_headings_body() {
        let html = r#"
        <html><head><title>Demo App 1.2.3 - Downloads</title></head>
        <body>
        <h1>Demo App</h1>
        <h2>All  versions</h2>
        <p>Release notes for 1.2.3</p>
        </body></html>
        "#;

        let page = parse_page(
            html,
            "https://example.com/apk/demo/",
            "https://example.com/apk/demo/",
            200,
            ROWS,
        );
        assert_eq!(page.title, "Demo App 1.2.3 - Downloads");
        assert_eq!(page.headings, vec!["Demo App", "All versions"]);
        assert!(page.body_text.contains("Release notes for 1.2.3"));
        assert!(page.rows.is_empty());
    }

    #[test]
    fn test_variant_rows_with_links_and_classes() {
        let html = r#"
        <html><body>
        <div class="table">
          <div class="table-row headerFont"><div>Variant</div><div>Arch</div></div>
          <div class="table-row">
            <span>1.2.3</span> <span>arm64-v8a</span> <span>nodpi</span>
            <a class="accent_color" href="/demo-1-2-3-3-android-apk-download/">APK</a>
          </div>
        </div>
        </body></html>
        "#;

        let page = parse_page(
            html,
            "https://example.com/apk/org/demo/demo-1-2-3-release/",
            "https://example.com/apk/org/demo/demo-1-2-3-release/",
            200,
            ROWS,
        );
        assert_eq!(page.rows.len(), 2);
        let row = &page.rows[1];
        assert_eq!(row.text, "1.2.3 arm64-v8a nodpi APK");
        assert_eq!(row.links.len(), 1);
        assert!(row.links[0].has_class("accent_color"));
        assert_eq!(
            row.links[0].href,
            "https://example.com/demo-1-2-3-3-android-apk-download/"
        );
    }

    #[test]
    fn test_listing_title_rows() {
        let html = r#"
        <html><body>
        <div class="appRow">
          <h5 class="appRowTitle"><a href="/apk/demo-org/demo/demo-2-0-beta/">Demo App 2.0 beta</a></h5>
        </div>
        <div class="appRow">
          <h5 class="appRowTitle"><a href="/apk/demo-org/demo/demo-1-9/">Demo App 1.9</a></h5>
        </div>
        </body></html>
        "#;

        let page = parse_page(
            html,
            "https://example.com/uploads/?appcategory=demo",
            "https://example.com/uploads/?appcategory=demo",
            200,
            ROWS,
        );
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].text, "Demo App 2.0 beta");
        assert_eq!(page.rows[1].text, "Demo App 1.9");
    }

    #[test]
    fn test_links_resolved_against_final_url() {
        let html = r##"
        <html><body>
        <a href="/relative/path/">Rel</a>
        <a href="https://other.example.com/abs">Abs</a>
        <a href="#frag">Skip</a>
        <a href="javascript:void(0)">Skip too</a>
        </body></html>
        "##;

        let page = parse_page(
            html,
            "https://example.com/start/",
            "https://example.com/landed/",
            200,
            ROWS,
        );
        assert_eq!(page.links.len(), 2);
        assert_eq!(page.links[0].href, "https://example.com/relative/path/");
        assert_eq!(page.links[1].href, "https://other.example.com/abs");
    }

    #[test]
    fn test_invalid_row_selector_yields_no_rows() {
        let html = r#"<html><body><div class="table-row">x</div></body></html>"#;
        let page = parse_page(
            html,
            "https://example.com/",
            "https://example.com/",
            200,
            ":::not a selector:::",
        );
        assert!(page.rows.is_empty());
        // Page-level parsing is unaffected
        assert!(page.body_text.contains('x'));
    }
}
