//! Data structures shared by the download pipeline.

use serde::Serialize;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default write increment for downloaded bodies (500 kB).
pub const DEFAULT_CHUNK_SIZE: usize = 500 * 1024;

/// Default maximum number of links downloaded in one run.
pub const DEFAULT_LIMIT: usize = 10;

/// One crawlable location: a page and the suffix its download links end with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Absolute URL of the page to scan.
    pub page_url: Url,
    /// Link suffix to match, compared case-insensitively (e.g. `".zip"`).
    pub suffix: String,
}

/// A discovered link and its 1-based position in the page markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub ordinal: usize,
    pub href: String,
}

/// The contiguous range of link ordinals selected for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadWindow {
    /// First ordinal to download (1-based).
    pub start_ordinal: usize,
    /// Number of links in the window, at least 1.
    pub count: usize,
    /// Number of links discovered on the page.
    pub total_available: usize,
}

impl DownloadWindow {
    /// Last ordinal in the window (inclusive).
    pub fn end_ordinal(&self) -> usize {
        self.start_ordinal + self.count - 1
    }

    /// Iterates the ordinals covered by the window.
    pub fn ordinals(&self) -> std::ops::RangeInclusive<usize> {
        self.start_ordinal..=self.end_ordinal()
    }
}

/// Result of one download attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadOutcome {
    Success(PathBuf),
    Failure(String),
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Outcome of one link, tagged with where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct LinkOutcome {
    pub ordinal: usize,
    pub url: String,
    pub outcome: DownloadOutcome,
}

/// Aggregated result of a batch download.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<LinkOutcome>,
}

impl DownloadSummary {
    pub(crate) fn record(
        &mut self,
        ordinal: usize,
        url: impl Into<String>,
        outcome: DownloadOutcome,
    ) {
        self.attempted += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(LinkOutcome {
            ordinal,
            url: url.into(),
            outcome,
        });
    }
}

/// How a response body is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSize {
    /// Write at most this many bytes per write call.
    Bounded(NonZeroUsize),
    /// Read the whole body, then write it at once.
    Unbounded,
}

impl ChunkSize {
    /// Maps a raw byte count to a chunk size, `0` meaning unbounded.
    pub fn from_bytes(bytes: usize) -> Self {
        NonZeroUsize::new(bytes).map_or(Self::Unbounded, Self::Bounded)
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self::from_bytes(DEFAULT_CHUNK_SIZE)
    }
}

/// Configuration for a batch download.
///
/// # Example
///
/// ```
/// use epw_harvest::DownloadConfig;
/// use std::num::NonZeroUsize;
///
/// let config = DownloadConfig {
///     output_dir: "weather".into(),
///     limit: NonZeroUsize::new(25).unwrap(),
///     ..DownloadConfig::default()
/// };
/// assert_eq!(config.start.get(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Directory downloaded files are written to (default: `output`).
    pub output_dir: PathBuf,
    /// Maximum number of links to download (default: 10).
    pub limit: NonZeroUsize,
    /// 1-based position of the first link to download (default: 1).
    pub start: NonZeroUsize,
    /// Write increment for response bodies (default: 500 kB).
    pub chunk_size: ChunkSize,
    /// Per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            limit: NonZeroUsize::new(DEFAULT_LIMIT).unwrap_or(NonZeroUsize::MIN),
            start: NonZeroUsize::MIN,
            chunk_size: ChunkSize::default(),
            timeout: None,
        }
    }
}
