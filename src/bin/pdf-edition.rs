//! PDF Edition CLI tool
//!
//! Runs the edition pipeline for one publication date.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_edition::config::{PipelineConfig, Stage, StageSet, StorageRoot};
use pdf_edition::date::parse_edition_date;
use pdf_edition::edition::TemplateResolver;
use pdf_edition::export::Osascript;
use pdf_edition::pdf::Ghostscript;
use pdf_edition::pipeline::Pipeline;
use pdf_edition::Error;

/// PDF Edition - export, combine and shrink a day's edition PDFs
#[derive(Parser)]
#[command(name = "pdf-edition")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Shrink the web PDFs of an edition
    pdf-edition 2017-12-31

    # Export layout pages, combine and shrink
    pdf-edition 2017-12-31 --stage export --stage combine --stage reduce")]
struct Cli {
    /// Edition date in YYYY-MM-DD format (e.g. 2017-12-31)
    date: String,

    /// Pipeline stage to run (repeatable). Defaults to reduce only
    #[arg(long = "stage", value_enum)]
    stages: Vec<Stage>,

    /// Storage root to try before /Volumes/Server/ and ~/Server/
    #[arg(long)]
    root: Option<PathBuf>,

    /// Ghostscript binary
    #[arg(long, default_value = "gs")]
    gs: PathBuf,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<Error>() {
            Some(Error::NoStorageRoot(_)) => error!("CRITICAL: {}", e),
            _ => error!("{:#}", e),
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let date = parse_edition_date(&cli.date)?;

    let mut candidates = Vec::new();
    candidates.extend(cli.root);
    candidates.extend(StorageRoot::default_candidates());
    let root = StorageRoot::select(&candidates)?;

    let stages = if cli.stages.is_empty() {
        StageSet::default()
    } else {
        StageSet::from_stages(&cli.stages)
    };
    let config = PipelineConfig::new(root.clone()).with_stages(stages);
    let resolver = TemplateResolver::new(root, config.templates.clone());
    let pdf_tool = Ghostscript::new(cli.gs);

    let pipeline = Pipeline {
        config: &config,
        resolver: &resolver,
        pdf_tool: &pdf_tool,
        scripts: &Osascript::default(),
    };

    let report = pipeline
        .run(&date)
        .with_context(|| format!("edition {}", date))?;

    info!(
        "Done: {} exported ({} failed), {} reduced ({} failed){}",
        report.exported.len(),
        report.export_failed.len(),
        report.reduced.len(),
        report.failed.len(),
        report
            .combined
            .map(|p| format!(", combined into {}", p.display()))
            .unwrap_or_default()
    );
    Ok(())
}
