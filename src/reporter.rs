//! Progress and outcome reporting for batch downloads.
//!
//! The batch downloader never logs progress directly; it hands events to a
//! [`Reporter`]. Binaries pick [`ProgressReporter`] on a terminal and
//! [`LogReporter`] otherwise, tests substitute their own.

use crate::types::{DownloadOutcome, DownloadSummary, DownloadWindow, SourceEntry};
use tracing::{error, info, warn};
use url::Url;

/// Receives the events of one batch download.
pub trait Reporter {
    /// Link discovery failed; the run ends with an empty summary.
    fn discovery_failed(&self, source: &SourceEntry, reason: &str);

    /// The window to download has been computed.
    fn window_planned(&self, window: &DownloadWindow);

    /// A download is about to start. `ordinal` is 1-based within `total`.
    fn download_started(&self, ordinal: usize, total: usize, url: &Url);

    /// A download attempt has finished.
    fn download_finished(&self, ordinal: usize, url: &str, outcome: &DownloadOutcome);

    /// The batch is complete.
    fn batch_finished(&self, summary: &DownloadSummary);
}

/// Reports through `tracing` only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn discovery_failed(&self, source: &SourceEntry, reason: &str) {
        error!(
            "Could not extract the links from provided url ('{}'). Details: {}",
            source.page_url, reason
        );
    }

    fn window_planned(&self, window: &DownloadWindow) {
        info!(
            "Will download content from link(s) #{} to #{} (inclusive) out of {}",
            window.start_ordinal,
            window.end_ordinal(),
            window.total_available
        );
        let remaining = window.total_available - window.end_ordinal();
        if remaining > 0 {
            warn!(
                "Limit of {} file(s) leaves {} link(s) for a later run",
                window.count, remaining
            );
        }
    }

    fn download_started(&self, ordinal: usize, total: usize, url: &Url) {
        info!("({}/{}) Downloading from '{}'", ordinal, total, url);
    }

    fn download_finished(&self, ordinal: usize, url: &str, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Success(path) => {
                info!("(#{}) Saved '{}'", ordinal, path.display());
            }
            DownloadOutcome::Failure(reason) => {
                error!(
                    "Something went wrong when attempting to download file from '{}'. Details: {}",
                    url, reason
                );
            }
        }
    }

    fn batch_finished(&self, summary: &DownloadSummary) {
        if summary.failed > 0 {
            warn!(
                "Attempted {} download(s): {} succeeded, {} failed",
                summary.attempted, summary.succeeded, summary.failed
            );
        } else {
            info!(
                "Attempted {} download(s): {} succeeded, {} failed",
                summary.attempted, summary.succeeded, summary.failed
            );
        }
    }
}

/// Draws an `indicatif` bar over the window and logs through `tracing`.
pub struct ProgressReporter {
    pb: indicatif::ProgressBar,
    log: LogReporter,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let pb = indicatif::ProgressBar::hidden();
        if let Ok(style) = indicatif::ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg} | {elapsed_precise} elapsed")
        {
            pb.set_style(style.progress_chars("█▓▒░ "));
        }
        Self {
            pb,
            log: LogReporter,
        }
    }

    /// Whether a progress bar is worth drawing on this process' stderr.
    pub fn is_supported() -> bool {
        atty::is(atty::Stream::Stderr)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ProgressReporter {
    fn discovery_failed(&self, source: &SourceEntry, reason: &str) {
        self.log.discovery_failed(source, reason);
    }

    fn window_planned(&self, window: &DownloadWindow) {
        self.pb
            .set_draw_target(indicatif::ProgressDrawTarget::stderr());
        self.pb.set_length(window.count as u64);
        self.pb.suspend(|| self.log.window_planned(window));
    }

    fn download_started(&self, ordinal: usize, total: usize, url: &Url) {
        self.pb.set_message(format!("| ⬇️  {}/{}", ordinal, total));
        self.pb
            .suspend(|| self.log.download_started(ordinal, total, url));
    }

    fn download_finished(&self, ordinal: usize, url: &str, outcome: &DownloadOutcome) {
        self.pb
            .suspend(|| self.log.download_finished(ordinal, url, outcome));
        self.pb.inc(1);
    }

    fn batch_finished(&self, summary: &DownloadSummary) {
        self.pb.finish_and_clear();
        self.log.batch_finished(summary);
    }
}
