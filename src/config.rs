//! Sources file loading and source selection.

use crate::error::ConfigError;
use crate::types::SourceEntry;
use serde::Deserialize;
use std::path::Path;
use tracing::info;
use url::Url;

#[derive(Deserialize, Debug)]
struct ConfigFile {
    #[serde(default)]
    sources: Vec<RawSource>,
}

#[derive(Deserialize, Debug)]
struct RawSource {
    website_url: String,
    search_suffix: String,
}

/// The ordered list of crawlable sources.
///
/// Expected file format (other top-level keys are ignored):
///
/// ```json
/// {
///   "sources": [
///     { "website_url": "https://climate.onebuilding.org/", "search_suffix": ".zip" }
///   ]
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SourceConfig {
    sources: Vec<SourceEntry>,
}

impl SourceConfig {
    /// Reads and validates the sources file at `path`.
    ///
    /// Fails when the file is unreadable, is not valid JSON, has no
    /// `sources`, or lists a `website_url` that is not an absolute URL.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content, path)?;
        info!(
            "Loaded {} source(s) from '{}'",
            config.sources.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parses a sources document; `origin` is only used in error messages.
    pub fn from_json(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;

        if file.sources.is_empty() {
            return Err(ConfigError::NoSources {
                path: origin.to_path_buf(),
            });
        }

        let sources = file
            .sources
            .into_iter()
            .enumerate()
            .map(|(index, raw)| -> Result<SourceEntry, ConfigError> {
                let page_url =
                    Url::parse(&raw.website_url).map_err(|source| ConfigError::InvalidUrl {
                        position: index + 1,
                        url: raw.website_url.clone(),
                        source,
                    })?;
                Ok(SourceEntry {
                    page_url,
                    suffix: raw.search_suffix,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { sources })
    }

    /// All sources, in file order.
    pub fn sources(&self) -> &[SourceEntry] {
        &self.sources
    }

    /// Picks the source at 1-based position `which`.
    pub fn select(&self, which: usize) -> Result<&SourceEntry, ConfigError> {
        which
            .checked_sub(1)
            .and_then(|index| self.sources.get(index))
            .ok_or(ConfigError::SourceOutOfRange {
                which,
                total: self.sources.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SOURCES: &str = r#"{
        "comment": "ignored",
        "sources": [
            { "website_url": "http://example.test/data", "search_suffix": ".zip" },
            { "website_url": "https://other.test/epw/", "search_suffix": ".epw" }
        ]
    }"#;

    #[test]
    fn test_parse_and_select() {
        let config = SourceConfig::from_json(TWO_SOURCES, Path::new("sources.json")).unwrap();
        assert_eq!(config.sources().len(), 2);

        let second = config.select(2).unwrap();
        assert_eq!(second.page_url.as_str(), "https://other.test/epw/");
        assert_eq!(second.suffix, ".epw");
    }

    #[test]
    fn test_select_out_of_range() {
        let config = SourceConfig::from_json(TWO_SOURCES, Path::new("sources.json")).unwrap();
        assert!(matches!(
            config.select(3),
            Err(ConfigError::SourceOutOfRange { which: 3, total: 2 })
        ));
        assert!(config.select(0).is_err());
    }

    #[test]
    fn test_missing_or_empty_sources_is_fatal() {
        for doc in [r#"{}"#, r#"{ "sources": [] }"#] {
            let err = SourceConfig::from_json(doc, Path::new("c.json")).unwrap_err();
            assert!(matches!(err, ConfigError::NoSources { .. }));
        }
    }

    #[test]
    fn test_relative_url_is_rejected() {
        let doc = r#"{ "sources": [ { "website_url": "/data", "search_suffix": ".zip" } ] }"#;
        let err = SourceConfig::from_json(doc, Path::new("c.json")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { position: 1, .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, TWO_SOURCES).unwrap();

        let config = SourceConfig::load(&path).unwrap();
        assert_eq!(config.select(1).unwrap().suffix, ".zip");

        let missing = SourceConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}
