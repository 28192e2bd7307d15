use epw_harvest::{
    discover_sources, download_from_source, write_report, ChunkSize, DownloadConfig, Fetcher,
    LogReporter, SourceConfig,
};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve_listing() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <ul>
                  <li><a href="/f1.zip">Lisbon</a></li>
                  <li><a href="/f2.txt">Notes</a></li>
                  <li><a href="/f3.ZIP">Porto</a></li>
                </ul>
            </body></html>"#,
        ))
        .mount(&server)
        .await;
    for route in ["/f1.zip", "/f3.ZIP"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK".to_vec()))
            .mount(&server)
            .await;
    }
    server
}

fn write_config(dir: &Path, server: &MockServer) -> std::path::PathBuf {
    let config_path = dir.join("config.json");
    let config = serde_json::json!({
        "sources": [
            { "website_url": format!("{}/data", server.uri()), "search_suffix": ".zip" }
        ]
    });
    std::fs::write(&config_path, config.to_string()).unwrap();
    config_path
}

#[tokio::test]
async fn test_end_to_end_downloads_matching_links_only() {
    let server = serve_listing().await;
    let workdir = tempfile::tempdir().unwrap();
    let sources = SourceConfig::load(&write_config(workdir.path(), &server)).unwrap();

    let config = DownloadConfig {
        output_dir: workdir.path().join("output"),
        ..DownloadConfig::default()
    };
    let fetcher = Fetcher::new(reqwest::Client::new(), ChunkSize::default());
    let summary = download_from_source(&fetcher, sources.select(1).unwrap(), &config, &LogReporter)
        .await
        .unwrap();

    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 2);

    let mut names: Vec<String> = std::fs::read_dir(&config.output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["f1.zip", "f3.ZIP"]);
}

#[tokio::test]
async fn test_discovery_only_never_touches_output_dir() {
    let server = serve_listing().await;
    let workdir = tempfile::tempdir().unwrap();
    let sources = SourceConfig::load(&write_config(workdir.path(), &server)).unwrap();

    let reports = discover_sources(&reqwest::Client::new(), sources.sources())
        .await
        .unwrap();
    let report_path = workdir.path().join("out.json");
    write_report(&report_path, &reports).unwrap();

    assert!(!workdir.path().join("output").exists());
    assert_eq!(
        reports[0].download_links,
        vec![(1, "/f1.zip".to_string()), (2, "/f3.ZIP".to_string())]
    );

    let mut entries: Vec<String> = std::fs::read_dir(workdir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["config.json", "out.json"]);
}
