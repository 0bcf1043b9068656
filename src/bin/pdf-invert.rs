//! PDF Invert CLI tool
//!
//! Inverts the colors of a PDF file, or of every PDF in a directory.

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use pdf_invert::batch::{default_target, run, FileOutcome, Progress, RunOutcome};
use pdf_invert::pdf::InvertOptions;

/// PDF Invert - Invert the colors of PDF documents
#[derive(Parser)]
#[command(name = "pdf-invert")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Invert every PDF in the current directory
    pdf-invert

    # Invert a single file (writes slides_inverted.pdf next to it)
    pdf-invert slides.pdf

    # Invert every PDF in a folder, with debug logging
    RUST_LOG=pdf_invert=debug pdf-invert ~/papers")]
struct Cli {
    /// Path to PDF file or directory (defaults to current directory)
    path: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = cmd_invert(cli.path) {
        eprintln!("{} {:#}", "Error:".red(), e);
        process::exit(1);
    }
}

fn cmd_invert(path: Option<PathBuf>) -> anyhow::Result<()> {
    let target = default_target(path)?;

    let options = InvertOptions::default();

    match run(&target, &options, print_progress)? {
        RunOutcome::Single(_) => {}
        RunOutcome::Batch(report) if report.is_empty() => {
            println!("{}", "No PDF files found in the specified directory.".yellow());
        }
        RunOutcome::Batch(report) => {
            let summary = format!(
                "\n✓ Completed processing {} PDF file(s)!",
                report.total()
            );
            println!("{}", summary.green());

            if report.failed() > 0 {
                let failed = format!(
                    "✗ {} of {} file(s) could not be inverted",
                    report.failed(),
                    report.total()
                );
                eprintln!("{}", failed.red());
            }
        }
    }

    Ok(())
}

fn print_progress(event: Progress<'_>) {
    match event {
        Progress::Discovered(0) => {}
        Progress::Discovered(count) => {
            println!("{}", format!("Found {} PDF file(s) to process...", count).blue());
        }
        Progress::Started(input) => {
            println!("{}", format!("Processing: {}", input.display()).blue());
        }
        Progress::Finished(outcome) => print_outcome(outcome),
    }
}

fn print_outcome(outcome: &FileOutcome) {
    match &outcome.result {
        Ok(output) => {
            println!("{}", format!("✓ Created: {}", output.display()).green());
        }
        Err(e) => {
            let message = format!("✗ Error processing {}:", outcome.input.display());
            eprintln!("{} {}", message.red(), e);
        }
    }
}
