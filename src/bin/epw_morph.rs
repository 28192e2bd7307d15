use anyhow::Context;
use clap::Parser;
use epw_harvest::logging;
use epw_harvest::morph::{
    confirm_long_run, list_epw_files, morph_all, MorphConfig, CONFIRMATION_THRESHOLD,
};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "epw-morph")]
#[command(
    about = "Generate future-climate EPW files with Future Weather Generator",
    long_about = None
)]
#[command(version)]
struct Args {
    /// Future Weather Generator jar used to generate the new EPW files
    #[arg(value_name = "path/to/fwg.jar")]
    jar_path: PathBuf,

    /// Directory containing the EPW files to be used
    #[arg(value_name = "path/to/epw")]
    epw_path: PathBuf,

    /// Quiet mode: hide log entries below WARNING
    #[arg(short, long)]
    quiet: bool,

    /// Answer "yes" to every prompt
    #[arg(short = 'y')]
    accept_prompts: bool,

    /// Java launcher used to run the jar
    #[arg(long, default_value = "java")]
    java: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    logging::init(args.quiet);

    if let Err(e) = run(args).await {
        error!("{:#}", e);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let files = list_epw_files(&args.epw_path)?;

    if files.len() >= CONFIRMATION_THRESHOLD && !args.accept_prompts {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        let proceed = confirm_long_run(&mut stdin.lock(), &mut stdout, files.len())
            .context("could not read the answer to the prompt")?;
        if !proceed {
            info!("Operation cancelled by the user");
            return Ok(());
        }
    }

    let jar = std::path::absolute(&args.jar_path)
        .with_context(|| format!("invalid jar path {}", args.jar_path.display()))?;
    let epw_dir = std::path::absolute(&args.epw_path)
        .with_context(|| format!("invalid EPW path {}", args.epw_path.display()))?;
    let mut config = MorphConfig::new(jar, &epw_dir);
    config.java = args.java;

    let summary = morph_all(&config, &files).await;
    if summary.failed > 0 {
        warn!(
            "{} of {} file(s) failed to process",
            summary.failed, summary.processed
        );
    } else {
        info!("Processed {} file(s)", summary.processed);
    }
    Ok(())
}
