#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line extractor for the MTR Bus data dictionary.
//!
//! Locates the current dictionary PDF on data.gov.hk, downloads it,
//! extracts every route with its directional lines and stops, and writes
//! the result as JSON. A local PDF or a pre-extracted layout dump can be
//! used instead of the download.
//!
//! The output file is only written once extraction has fully succeeded.
//! Any failure exits with status 1.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mtr_bus_cli_utils::{MultiProgress, PassProgress};
use mtr_bus_dictionary::{ExtractorConfig, render_summary, write_json_file};
use mtr_bus_pdf::LayoutPage;
use mtr_bus_scraper::{DEFAULT_DATASET_URL, DictionarySource};

#[derive(Parser)]
#[command(
    name = "mtr_bus_extract",
    about = "Extract MTR Bus routes and stations from the data dictionary PDF"
)]
struct Cli {
    /// Path of the JSON file to write
    output: PathBuf,
    /// Read the dictionary from a local PDF instead of downloading it
    #[arg(long, conflicts_with = "layout")]
    pdf: Option<PathBuf>,
    /// Read a pre-extracted page layout (JSON) instead of a PDF
    #[arg(long)]
    layout: Option<PathBuf>,
    /// Dataset page that links to the dictionary PDF
    #[arg(long, default_value = DEFAULT_DATASET_URL)]
    dataset_url: String,
    /// TOML file overriding the extractor's patterns and labels
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors exit 1; --help and --version exit 0.
            let failed = e.use_stderr();
            e.print().ok();
            return if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let multi = mtr_bus_cli_utils::init_logger("info").unwrap_or_else(|e| {
        eprintln!("Logging disabled: {e}");
        MultiProgress::new()
    });

    match run(&cli, multi).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Extraction failed: {e}");
            eprintln!("Error during PDF extraction: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, multi: MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => ExtractorConfig::from_toml_file(path)?,
        None => ExtractorConfig::default(),
    };

    let pages = load_pages(cli).await?;
    log::info!("Loaded {} pages", pages.len());

    let progress = PassProgress::new(multi);
    let routes = mtr_bus_dictionary::extract(&pages, &config, &progress)?;

    write_json_file(&routes, &cli.output)?;

    println!(
        "Extracted {} routes to {}",
        routes.len(),
        cli.output.display()
    );
    println!();
    println!("{}", render_summary(&routes));

    Ok(())
}

async fn load_pages(cli: &Cli) -> Result<Vec<LayoutPage>, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.layout {
        log::info!("Reading page layout from {}", path.display());
        return Ok(mtr_bus_pdf::load_layout(&std::fs::read_to_string(path)?)?);
    }

    if let Some(path) = &cli.pdf {
        log::info!("Reading PDF from {}", path.display());
        return Ok(mtr_bus_pdf::load_pdf_file(path)?);
    }

    let bytes = DictionarySource::new(&cli.dataset_url).fetch_pdf().await?;
    Ok(mtr_bus_pdf::load_pdf(&bytes)?)
}
