use anyhow::Context;
use clap::Parser;
use epw_harvest::extract::{extract_all, ExtractConfig, EPW_SUFFIX};
use epw_harvest::logging;
use std::path::PathBuf;
use tracing::{error, warn};

#[derive(Parser, Debug)]
#[command(name = "epw-extract")]
#[command(about = "Extract EPW files from the archives found in a directory", long_about = None)]
#[command(version)]
struct Args {
    /// Directory containing the archives to be filtered and extracted
    #[arg(value_name = "path/to/zip")]
    zip_path: PathBuf,

    /// Quiet mode: hide log entries below WARNING
    #[arg(short, long)]
    quiet: bool,

    /// Extraction directory (defaults to an "epw" folder inside the archive directory)
    #[arg(short, long, value_name = "path/to/dir")]
    out_path: Option<PathBuf>,

    /// Suffix of the archive entries to extract
    #[arg(long, default_value = EPW_SUFFIX)]
    suffix: String,
}

fn main() {
    let args = Args::parse();
    logging::init(args.quiet);

    if let Err(e) = run(args) {
        error!("Could not extract archives. Details: {:#}", e);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = ExtractConfig::new(&args.zip_path);
    if let Some(out_path) = args.out_path {
        config.output_dir = out_path;
    }
    config.entry_suffix = args.suffix;

    let summary = extract_all(&config)
        .with_context(|| format!("extraction from {} failed", args.zip_path.display()))?;
    if summary.archives_failed > 0 {
        warn!(
            "{} archive(s) could not be read, see errors above",
            summary.archives_failed
        );
    }
    Ok(())
}
