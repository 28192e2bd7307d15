//! Discovery-only mode: list every source's links into a JSON report.

use crate::error::{HarvestError, TransportError};
use crate::links::{extract_links, link_records};
use crate::types::SourceEntry;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Links discovered for one source, in download order.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub url: String,
    pub search_suffix: String,
    /// `(ordinal, href)` pairs; ordinals start at 1.
    pub download_links: Vec<(usize, String)>,
}

/// Extracts the links of every source without downloading anything.
///
/// Unlike a download run, a transport failure on any page aborts the whole
/// discovery and no report is produced.
pub async fn discover_sources(
    client: &reqwest::Client,
    sources: &[SourceEntry],
) -> Result<Vec<SourceReport>, TransportError> {
    let mut reports = Vec::with_capacity(sources.len());
    for source in sources {
        let hrefs = extract_links(client, &source.page_url, &source.suffix).await?;
        reports.push(SourceReport {
            url: source.page_url.to_string(),
            search_suffix: source.suffix.clone(),
            download_links: link_records(&hrefs)
                .into_iter()
                .map(|record| (record.ordinal, record.href))
                .collect(),
        });
    }
    Ok(reports)
}

/// Writes `reports` as indented JSON and returns the absolute report path.
pub fn write_report(path: &Path, reports: &[SourceReport]) -> Result<PathBuf, HarvestError> {
    let json = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, json)?;
    let written = std::fs::canonicalize(path)?;
    info!(
        "Details from {} source(s) were saved to '{}'",
        reports.len(),
        written.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, route: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    fn source(server: &MockServer, route: &str, suffix: &str) -> SourceEntry {
        SourceEntry {
            page_url: Url::parse(&format!("{}{}", server.uri(), route)).unwrap(),
            suffix: suffix.to_string(),
        }
    }

    #[tokio::test]
    async fn test_discovery_report_lists_every_source() {
        let server = MockServer::start().await;
        let listing = r#"<a href="a.zip"></a><a href="b.txt"></a><a href="c.ZIP"></a>"#;
        mount(&server, "/zips", 200, listing).await;
        mount(&server, "/epws", 200, r#"<a href="/x.epw"></a>"#).await;

        let sources = [source(&server, "/zips", ".zip"), source(&server, "/epws", ".epw")];
        let reports = discover_sources(&reqwest::Client::new(), &sources)
            .await
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(
            reports[0].download_links,
            vec![(1, "a.zip".to_string()), (2, "c.ZIP".to_string())]
        );
        assert_eq!(reports[1].search_suffix, ".epw");
        assert_eq!(reports[1].download_links, vec![(1, "/x.epw".to_string())]);
    }

    #[tokio::test]
    async fn test_discovery_aborts_on_transport_error() {
        let server = MockServer::start().await;
        mount(&server, "/ok", 200, r#"<a href="a.zip"></a>"#).await;
        mount(&server, "/broken", 502, "").await;

        let sources = [source(&server, "/ok", ".zip"), source(&server, "/broken", ".zip")];
        let err = discover_sources(&reqwest::Client::new(), &sources)
            .await
            .unwrap_err();

        assert!(err.url().ends_with("/broken"));
    }

    #[test]
    fn test_report_json_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let reports = vec![SourceReport {
            url: "http://example.test/data".to_string(),
            search_suffix: ".zip".to_string(),
            download_links: vec![(1, "/f1.zip".to_string())],
        }];

        let written = write_report(&path, &reports).unwrap();
        assert!(written.is_absolute());

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "url": "http://example.test/data",
                "search_suffix": ".zip",
                "download_links": [[1, "/f1.zip"]]
            }])
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
