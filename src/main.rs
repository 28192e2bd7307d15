use clap::Parser;
use epw_harvest::{
    build_client, discover_sources, download_from_source, logging, write_report, ChunkSize,
    DownloadConfig, Fetcher, HarvestError, LogReporter, ProgressReporter, Reporter, SourceConfig,
    DEFAULT_CHUNK_SIZE,
};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "epw-harvest")]
#[command(
    about = "Find links to weather-data archives on configured web pages and download them",
    long_about = None
)]
#[command(version)]
struct Args {
    /// Path to a JSON config file listing source URLs and search suffixes
    #[arg(value_name = "path/to/config.json")]
    path: PathBuf,

    /// Quiet mode: hide log entries below WARNING
    #[arg(short, long)]
    quiet: bool,

    /// Download nothing; only export the links found for every source, in download order
    #[arg(short, long)]
    json_only: bool,

    /// Output directory where downloaded files will be saved
    #[arg(short, long, value_name = "path/to/dir", default_value = "output")]
    out_path: PathBuf,

    /// Maximum number of files to download from the links found in the source
    #[arg(short, long, default_value = "10")]
    limit: NonZeroUsize,

    /// Link to start from, counting from 1 in order of appearance in the page
    #[arg(short, long, default_value = "1")]
    start: NonZeroUsize,

    /// Source (in config file) to collect files from, counting from 1; ignored with --json-only
    #[arg(short, long, default_value = "1")]
    which_source: NonZeroUsize,

    /// Where --json-only writes its report
    #[arg(long, value_name = "path/to/report.json", default_value = "out.json")]
    report_path: PathBuf,

    /// Also save the per-link download outcomes as JSON
    #[arg(long, value_name = "path/to/summary.json")]
    summary_path: Option<PathBuf>,

    /// Per-request timeout, e.g. "30s" or "2m"
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Bytes written per chunk while downloading; 0 writes each body at once
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    logging::init(args.quiet);

    if let Err(e) = run(args).await {
        error!("Could not complete processing of files with given parameters. Details: {}", e);
    }
}

async fn run(args: Args) -> Result<(), HarvestError> {
    let sources = SourceConfig::load(&args.path)?;
    let client = build_client(args.timeout)?;

    if args.json_only {
        let reports = discover_sources(&client, sources.sources()).await?;
        write_report(&args.report_path, &reports)?;
        return Ok(());
    }

    let source = sources.select(args.which_source.get())?;
    info!(
        "Source #{}: '{}' (suffix '{}')",
        args.which_source, source.page_url, source.suffix
    );

    let config = DownloadConfig {
        output_dir: args.out_path,
        limit: args.limit,
        start: args.start,
        chunk_size: ChunkSize::from_bytes(args.chunk_size),
        timeout: args.timeout,
    };
    let fetcher = Fetcher::new(client, config.chunk_size);

    let reporter: Box<dyn Reporter> = if !args.quiet && ProgressReporter::is_supported() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(LogReporter)
    };

    let summary = download_from_source(&fetcher, source, &config, reporter.as_ref()).await?;

    if let Some(summary_path) = args.summary_path {
        std::fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
        info!("Download summary saved to '{}'", summary_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(["epw-harvest", "config.json"].iter().chain(extra))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.path, PathBuf::from("config.json"));
        assert!(!args.quiet);
        assert!(!args.json_only);
        assert_eq!(args.out_path, PathBuf::from("output"));
        assert_eq!(args.limit.get(), 10);
        assert_eq!(args.start.get(), 1);
        assert_eq!(args.which_source.get(), 1);
        assert_eq!(args.report_path, PathBuf::from("out.json"));
        assert_eq!(args.summary_path, None);
        assert_eq!(args.timeout, None);
        assert_eq!(args.chunk_size, 512_000);
        assert_eq!(ChunkSize::from_bytes(args.chunk_size), ChunkSize::default());
    }

    #[test]
    fn test_short_flags() {
        let args = parse(&["-q", "-j", "-o", "dl", "-l", "3", "-s", "4", "-w", "2"]).unwrap();
        assert!(args.quiet);
        assert!(args.json_only);
        assert_eq!(args.out_path, PathBuf::from("dl"));
        assert_eq!(args.limit.get(), 3);
        assert_eq!(args.start.get(), 4);
        assert_eq!(args.which_source.get(), 2);
    }

    #[test]
    fn test_zero_counts_are_rejected() {
        for flag in ["-l", "-s", "-w"] {
            assert!(parse(&[flag, "0"]).is_err(), "{flag} 0 should be rejected");
        }
    }

    #[test]
    fn test_config_path_is_required() {
        assert!(Args::try_parse_from(["epw-harvest"]).is_err());
    }

    #[test]
    fn test_zero_chunk_size_is_unbounded() {
        let args = parse(&["--chunk-size", "0"]).unwrap();
        assert_eq!(ChunkSize::from_bytes(args.chunk_size), ChunkSize::Unbounded);
    }

    #[test]
    fn test_timeout_uses_humantime() {
        let args = parse(&["--timeout", "2m"]).unwrap();
        assert_eq!(args.timeout, Some(Duration::from_secs(120)));
        assert!(parse(&["--timeout", "soon"]).is_err());
    }
}
