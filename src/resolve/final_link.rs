//! Final download-link extraction from a variant detail page.

use crate::error::{ResolveError, ResolveResult};
use crate::fetch::FetchedPage;
use crate::resolve::SiteProfile;

/// Extract the single actual download URL.
///
/// Preference order: the canonical download-button link, then the first
/// href carrying the force-base-APK marker and a download key. Fails with
/// [`ResolveError::Extraction`] when neither exists.
pub fn extract_final_link(page: &FetchedPage, profile: &SiteProfile) -> ResolveResult<String> {
    if let Some(button) = page
        .links
        .iter()
        .find(|l| l.has_class(&profile.download_button_class) && !l.href.is_empty())
    {
        return Ok(button.href.clone());
    }

    if let Some(link) = page.links.iter().find(|l| {
        l.href.contains(&profile.force_base_marker) && l.href.contains(&profile.download_key_marker)
    }) {
        return Ok(link.href.clone());
    }

    Err(ResolveError::Extraction {
        page_url: page.source_url.clone(),
    })
}
