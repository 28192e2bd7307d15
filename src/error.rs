//! Error types for crawling, downloading, extraction and morphing.
//!
//! Errors are split by how the caller is expected to react. Per-item errors
//! ([`FetchError`], and the per-archive / per-file failures reported by the
//! extraction and morphing loops) are logged and counted. Errors about the
//! shape of the request ([`RangeError`], [`ConfigError`]) abort the run before
//! any side effect.

use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Network or HTTP failure while talking to a remote host.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read
    /// (DNS, connection refused, timeout, reset mid-stream).
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
}

impl TransportError {
    pub(crate) fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }

    /// The URL the failing request was addressed to.
    pub fn url(&self) -> &str {
        match self {
            Self::Request { url, .. } | Self::Status { url, .. } => url,
        }
    }
}

/// Failure to materialize one remote file on disk.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The URL path has no final segment to name the file after.
    #[error("cannot derive a file name from {url}")]
    NoFileName { url: String },

    /// An href on the page could not be turned into an absolute URL.
    #[error("cannot resolve link '{href}' against {base}: {source}")]
    InvalidLink {
        href: String,
        base: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The requested start position lies past the end of the discovered links.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "There are less available links (={total}) than the desired start position (={start})"
)]
pub struct RangeError {
    pub start: usize,
    pub total: usize,
}

/// Problems with the sources file or the source selection.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No sources configured in '{}'", path.display())]
    NoSources { path: PathBuf },

    #[error("source #{position} has an invalid website_url '{url}': {source}")]
    InvalidUrl {
        position: usize,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("source #{which} requested but only {total} source(s) are configured")]
    SourceOutOfRange { which: usize, total: usize },
}

/// Errors raised by the archive extractor.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Selected path {} contains no archive files", dir.display())]
    NoArchives { dir: PathBuf },

    /// The archive could not be opened or one of its entries could not be read.
    #[error("failed to read archive {}: {reason}", archive.display())]
    Archive { archive: PathBuf, reason: String },
}

/// Errors raised before the morphing loop starts.
#[derive(Error, Debug)]
pub enum MorphError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Selected path {} contains no EPW files", dir.display())]
    NoInputFiles { dir: PathBuf },
}

/// Fatal errors for a download or discovery run.
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Range(#[from] RangeError),

    /// Link discovery failed while building the discovery report.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
