//! Link discovery: fetch a page and pick the hyperlinks ending with a suffix.

use crate::error::TransportError;
use crate::types::LinkRecord;
use crate::util::ends_with_ignore_case;
use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

/// Returns the `href` of every `<a>` element in `markup` whose href ends
/// with `suffix` (case-insensitive), in document order and unmodified.
pub fn links_with_suffix(markup: &str, suffix: &str) -> Vec<String> {
    let document = Html::parse_document(markup);
    let Ok(anchor) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&anchor)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| ends_with_ignore_case(href, suffix))
        .map(str::to_string)
        .collect()
}

/// Fetches `url` and returns the matching hrefs found in its markup.
///
/// Hrefs are returned exactly as written on the page; resolving them to
/// absolute URLs is up to the caller. No matches is not an error.
///
/// # Arguments
///
/// * `client` - Session shared by all requests of the run
/// * `url` - Page to scan
/// * `suffix` - Link suffix to match (e.g. `".zip"`)
pub async fn extract_links(
    client: &reqwest::Client,
    url: &Url,
    suffix: &str,
) -> Result<Vec<String>, TransportError> {
    debug!("Retrieving markup from {}", url);

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| TransportError::request(url.as_str(), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status {
            url: url.to_string(),
            status,
        });
    }

    let markup = response
        .text()
        .await
        .map_err(|e| TransportError::request(url.as_str(), e))?;

    let links = links_with_suffix(&markup, suffix);
    info!(
        "Found {} link(s) in '{}' matching the suffix '{}'",
        links.len(),
        url,
        suffix
    );
    Ok(links)
}

/// Numbers hrefs by their position on the page, starting at 1.
pub fn link_records(hrefs: &[String]) -> Vec<LinkRecord> {
    hrefs
        .iter()
        .enumerate()
        .map(|(index, href)| LinkRecord {
            ordinal: index + 1,
            href: href.clone(),
        })
        .collect()
}
