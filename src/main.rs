use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use modelpull::config::Config;
use modelpull::models::pull::summary_line;
use modelpull::models::{
    candidate_urls, dry_run_lines, execute, plan, HttpTransport, PullPlan, PullSummary,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "modelpull")]
#[command(about = "Download model assets from a package mirror", long_about = None)]
struct Cli {
    /// Destination directory for downloaded models
    #[arg(long)]
    dest: Option<PathBuf>,

    /// Redownload files even if they already exist
    #[arg(long)]
    force: bool,

    /// Custom base URL for model files (any non-default value disables fallback mirrors)
    #[arg(long)]
    base_url: Option<String>,

    /// Config file to use instead of ~/.config/modelpull/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// List the files that would be downloaded, don't download anything
    #[arg(long)]
    dry_run: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let dest_dir = cli.dest.unwrap_or_else(|| config.download.dest.clone());
    let base_url = cli
        .base_url
        .unwrap_or_else(|| config.mirror.base_url.clone());
    let candidates = candidate_urls(&base_url, &config.mirror);
    tracing::debug!("Mirror candidates: {candidates:?}");

    let transport = HttpTransport::new(&config.mirror)?;

    let outcome = match plan(&transport, &candidates, &config.mirror.manifest_name, &dest_dir).await
    {
        Ok(pull_plan) if cli.dry_run => {
            for line in dry_run_lines(&pull_plan.tasks, &dest_dir) {
                println!("{line}");
            }
            println!("\n[Dry run - no downloads performed]");
            return Ok(ExitCode::SUCCESS);
        }
        Ok(pull_plan) => Ok(download(&transport, &pull_plan, &dest_dir, cli.force).await?),
        Err(e) => Err(e),
    };

    match &outcome {
        Ok(summary) => println!("{}", summary_line(summary, &dest_dir)),
        Err(e) => eprintln!("{e}"),
    }

    Ok(ExitCode::from(exit_status(&outcome)))
}

async fn download(
    transport: &HttpTransport,
    pull_plan: &PullPlan,
    dest_dir: &Path,
    force: bool,
) -> Result<PullSummary> {
    let pb = ProgressBar::new(pull_plan.tasks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("#>-"),
    );

    let summary = execute(transport, &pull_plan.tasks, dest_dir, force, |report| {
        pb.println(report.to_string());
        pb.inc(1);
    })
    .await;

    pb.finish_and_clear();
    Ok(summary)
}

/// Process status: a fatal pull error fails the run, per-file failures don't
fn exit_status(outcome: &modelpull::Result<PullSummary>) -> u8 {
    match outcome {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("modelpull=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
