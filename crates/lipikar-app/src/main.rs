// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lipikar: scanned PDF to editable document, with Bengali + English OCR.
//
// Entry point. Initialises logging, loads configuration, checks the OCR
// engine, and runs the pipeline over a single input PDF.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lipikar_app::Pipeline;
use lipikar_app::services::{data_dir, paths};
use lipikar_core::AppConfig;
use lipikar_core::error::{LipikarError, Result};
use lipikar_core::human_errors::humanize_error;
use lipikar_core::types::{PageOutcome, SaveLocation};

/// Convert a scanned PDF into an editable document using Bengali and English OCR.
#[derive(Debug, Parser)]
#[command(name = "lipikar", version, about)]
struct Cli {
    /// Scanned PDF to convert.
    input: PathBuf,

    /// Output document (.docx or .txt). Defaults to `<input stem>.docx` in
    /// the current directory.
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!(input = %cli.input.display(), "Lipikar starting");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "conversion failed");
            let human = humanize_error(&err);
            eprintln!("Error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if !cli.input.is_file() {
        return Err(LipikarError::InvalidInput(format!(
            "{} is not a readable file",
            cli.input.display()
        )));
    }

    let config_path = data_dir::config_path();
    let config = AppConfig::load_or_default(&config_path);

    let cwd = std::env::current_dir()?;
    let output = paths::resolve_output_path(&cli.input, cli.output.as_deref(), &cwd)?;
    let fallback_dir = config.fallback_dir.clone().or_else(data_dir::desktop_dir);

    let pipeline = Pipeline::from_config(&config).with_fallback_dir(fallback_dir);

    // A missing engine is not fatal: every page becomes a failure marker.
    let engine = pipeline.recognizer();
    match engine.config().validate().and_then(|()| engine.check_available()) {
        Ok(version) => tracing::info!(version = %version, "OCR engine available"),
        Err(err) => {
            tracing::warn!(error = %err, "OCR engine unavailable");
            let human = humanize_error(&err);
            println!("Warning: {} {}", human.message, human.suggestion);
        }
    }

    println!("Converting {} -> {}", cli.input.display(), output.display());
    let report = pipeline.run_with(&cli.input, &output, |progress| {
        let page = progress.result.page;
        match &progress.result.outcome {
            PageOutcome::Recognized { mode, .. } => {
                println!("Page {page}/{}: used {} OCR", progress.total, mode.engine_languages())
            }
            PageOutcome::Failed { .. } => {
                println!("Page {page}/{}: OCR failed", progress.total)
            }
        }
    })?;

    let failed = report.failed_pages().count();
    println!(
        "Processed {} page(s), {} recognised, {} failed.",
        report.pages.len(),
        report.pages.len() - failed,
        failed
    );
    match &report.saved_to {
        SaveLocation::Primary(path) => println!("Saved: {}", path.display()),
        SaveLocation::Fallback(path) => println!(
            "Could not write {}; saved to fallback location instead: {}",
            output.display(),
            path.display()
        ),
    }
    Ok(())
}
