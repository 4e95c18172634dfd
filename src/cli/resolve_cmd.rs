//! `apkscout resolve`: turn a catalog app into a final download URL.

use crate::catalog::{self, AppDescriptor};
use crate::cli::output;
use crate::events::EventSender;
use crate::fetch::http_client::HttpFetcher;
use crate::fetch::pacing::ThrottledFetcher;
use crate::hints;
use crate::query::AppQuery;
use crate::resolve::acceptance::AcceptanceStrategy;
use crate::resolve::{Resolver, SiteProfile};
use anyhow::Result;
use std::sync::Arc;

/// Page fetch timeout. Mirror pages can sit behind slow interstitials.
const FETCH_TIMEOUT_MS: u64 = 30_000;

pub async fn run(
    app: &str,
    platform: &str,
    version: Option<&str>,
    arch: Option<&str>,
    dpi: Option<&str>,
    build_type: Option<&str>,
    fuzzy: bool,
) -> Result<()> {
    let root = catalog::catalog_root();
    let descriptor = catalog::load(&root, platform, app)?;
    let query = assemble_query(&descriptor, version, arch, dpi, build_type, &None);

    let resolver = build_resolver(fuzzy, None);
    let resolution = resolver.resolve_download(&query).await?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "app": query.app,
            "version": resolution.resolved_version,
            "arch": query.arch,
            "url": resolution.final_download_url,
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        println!(
            "  {} {} ({})",
            query.app, resolution.resolved_version, query.arch
        );
    }
    println!("{}", resolution.final_download_url);
    Ok(())
}

/// Build the production resolver: throttled HTTP fetcher over the default
/// site profile.
pub(crate) fn build_resolver(fuzzy: bool, events: Option<EventSender>) -> Resolver {
    let profile = SiteProfile::default();
    let fetcher = ThrottledFetcher::new(HttpFetcher::new(FETCH_TIMEOUT_MS, &profile.row_selector));

    let mut resolver = Resolver::new(Arc::new(fetcher), profile);
    if fuzzy {
        resolver = resolver.with_strategy(AcceptanceStrategy::Fuzzy);
    }
    if let Some(tx) = events {
        resolver = resolver.with_events(tx);
    }
    resolver
}

/// Descriptor plus command-line overrides, with the version settled as far
/// as possible locally: explicit flag, then descriptor pin, then hint
/// tool. A still-unset version is discovered from the site by the
/// resolver.
pub(crate) fn assemble_query(
    descriptor: &AppDescriptor,
    version: Option<&str>,
    arch: Option<&str>,
    dpi: Option<&str>,
    build_type: Option<&str>,
    events: &Option<EventSender>,
) -> AppQuery {
    let mut query = descriptor.to_query();
    if let Some(v) = version {
        query.version = Some(v.to_string());
    }
    if let Some(a) = arch {
        query.arch = a.to_string();
    }
    if let Some(d) = dpi {
        query.dpi = Some(d.to_string());
    }
    if let Some(b) = build_type {
        query.build_type = Some(b.to_string());
    }

    if query.version.is_none() {
        query.version = hints::version_from_tool(descriptor, events);
    }
    query
}
