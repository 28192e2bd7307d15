//! epw-harvest - Crawl, download, extract and morph EPW weather files
//!
//! This library automates getting weather data ready for building-energy
//! simulation: it scans web pages for archive links, downloads a window of
//! them, extracts the EPW files they contain, and runs the Future Weather
//! Generator over the result to produce climate-projection variants.
//!
//! # Features
//!
//! - **Link Discovery**: HTML-parsed, case-insensitive suffix matching in document order
//! - **Windowed Downloads**: Resume a large listing with a start offset and a limit
//! - **Failure Isolation**: One dead link never stops the rest of the batch
//! - **Discovery Reports**: Dump every source's links to JSON without downloading
//! - **Archive Extraction**: Pull matching entries out of ZIP and tar archives
//! - **Morphing**: Drive the external morphing tool over a directory of EPW files
//!
//! # Example
//!
//! ```no_run
//! use epw_harvest::{
//!     build_client, download_from_source, DownloadConfig, Fetcher, LogReporter, SourceConfig,
//! };
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sources = SourceConfig::load(Path::new("config.json"))?;
//! let config = DownloadConfig::default();
//! let fetcher = Fetcher::new(build_client(config.timeout)?, config.chunk_size);
//!
//! let summary = download_from_source(&fetcher, sources.select(1)?, &config, &LogReporter).await?;
//! println!("{}/{} downloaded", summary.succeeded, summary.attempted);
//! # Ok(())
//! # }
//! ```

mod config;
mod download;
mod error;
pub mod extract;
mod links;
pub mod logging;
pub mod morph;
mod orchestrator;
mod plan;
mod report;
mod reporter;
mod types;
mod util;

pub use config::SourceConfig;
pub use download::{file_name_from_url, Fetcher};
pub use error::{
    ConfigError, ExtractError, FetchError, HarvestError, MorphError, RangeError, TransportError,
};
pub use links::{extract_links, link_records, links_with_suffix};
pub use orchestrator::{build_client, download_from_source, resolve_link};
pub use plan::plan_window;
pub use report::{discover_sources, write_report, SourceReport};
pub use reporter::{LogReporter, ProgressReporter, Reporter};
pub use types::{
    ChunkSize, DownloadConfig, DownloadOutcome, DownloadSummary, DownloadWindow, LinkOutcome,
    LinkRecord, SourceEntry, DEFAULT_CHUNK_SIZE, DEFAULT_LIMIT,
};
pub use util::ends_with_ignore_case;
