//! Main orchestration logic for crawling a source and downloading its files.

use crate::download::Fetcher;
use crate::error::{FetchError, HarvestError};
use crate::links::extract_links;
use crate::plan::plan_window;
use crate::reporter::Reporter;
use crate::types::{DownloadConfig, DownloadOutcome, DownloadSummary, SourceEntry};
use std::time::Duration;
use url::Url;

/// Builds the HTTP session used for one run.
pub fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, HarvestError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(HarvestError::Client)
}

/// Discovers the links of one source and downloads a window of them.
///
/// Steps:
///
/// 1. Extracts matching links from the source page. A transport failure here
///    is reported and yields an empty summary.
/// 2. Plans the download window from `config.start` and `config.limit`.
/// 3. Creates the output directory.
/// 4. Resolves each selected href against the page URL and downloads it,
///    one at a time. A failing link is reported and the batch continues.
///
/// # Errors
///
/// [`HarvestError::Range`] when `config.start` is past the last discovered
/// link, checked before anything is written. [`HarvestError::Io`] when the
/// output directory cannot be created.
///
/// # Example
///
/// ```no_run
/// use epw_harvest::{
///     build_client, download_from_source, ChunkSize, DownloadConfig, Fetcher, LogReporter,
///     SourceEntry,
/// };
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DownloadConfig::default();
/// let fetcher = Fetcher::new(build_client(config.timeout)?, ChunkSize::default());
/// let source = SourceEntry {
///     page_url: "https://climate.onebuilding.org/WMO_Region_6_Europe/PRT_Portugal/".parse()?,
///     suffix: ".zip".to_string(),
/// };
/// let summary = download_from_source(&fetcher, &source, &config, &LogReporter).await?;
/// println!("{} downloaded", summary.succeeded);
/// # Ok(())
/// # }
/// ```
pub async fn download_from_source(
    fetcher: &Fetcher,
    source: &SourceEntry,
    config: &DownloadConfig,
    reporter: &dyn Reporter,
) -> Result<DownloadSummary, HarvestError> {
    let hrefs = match extract_links(fetcher.client(), &source.page_url, &source.suffix).await {
        Ok(hrefs) => hrefs,
        Err(e) => {
            reporter.discovery_failed(source, &e.to_string());
            return Ok(DownloadSummary::default());
        }
    };

    let window = plan_window(hrefs.len(), config.start, config.limit)?;
    reporter.window_planned(&window);

    std::fs::create_dir_all(&config.output_dir)?;

    let mut summary = DownloadSummary::default();
    for ordinal in window.ordinals() {
        let href = &hrefs[ordinal - 1];
        let (url, outcome) = match resolve_link(&source.page_url, href) {
            Ok(url) => {
                reporter.download_started(ordinal, window.total_available, &url);
                let outcome = match fetcher.fetch(&url, &config.output_dir).await {
                    Ok(path) => DownloadOutcome::Success(path),
                    Err(e) => DownloadOutcome::Failure(e.to_string()),
                };
                (url.to_string(), outcome)
            }
            Err(e) => (href.clone(), DownloadOutcome::Failure(e.to_string())),
        };

        reporter.download_finished(ordinal, &url, &outcome);
        summary.record(ordinal, url, outcome);
    }

    reporter.batch_finished(&summary);
    Ok(summary)
}

/// Resolves an href as written on `page` into an absolute URL.
///
/// Relative, root-relative, protocol-relative and absolute hrefs are all
/// accepted, following standard base-URL resolution.
pub fn resolve_link(page: &Url, href: &str) -> Result<Url, FetchError> {
    page.join(href).map_err(|source| FetchError::InvalidLink {
        href: href.to_string(),
        base: page.to_string(),
        source,
    })
}
