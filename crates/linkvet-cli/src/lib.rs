//! Implementation of the `linkvet` CLI: argument parsing, file collection,
//! pipeline wiring, and report rendering around `linkvet-core`.

/// Command-line argument definitions.
pub mod args;
/// Input file collection.
pub mod collect;
/// Report rendering.
pub mod report;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use linkvet_core::{summarize, Checker, IgnoreFilter};

use args::{Cli, OutputFormat};

/// Runs the CLI to completion.
///
/// # Errors
///
/// Returns an error for invalid arguments, unreadable inputs, malformed
/// documents in strict mode, or rule-compilation failures. Dead links are
/// not an error: they are reflected in the exit code.
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let registry = linkvet_core::ExtractorRegistry::with_defaults();
    let files = collect::collect_files(&cli.paths, &registry)?;
    if files.is_empty() {
        info!("no extractable files found");
        println!("no extractable files found");
        return Ok(ExitCode::SUCCESS);
    }
    debug!(files = files.len(), "collected input files");

    let links = registry
        .extract_files(&files, cli.strict)
        .context("extraction failed")?;
    info!(links = links.len(), files = files.len(), "extracted links");

    let filter = IgnoreFilter::new(&cli.ignore_hosts, &cli.ignore_globs, &cli.ignore_regexes)?;
    let links: Vec<_> = links
        .into_iter()
        .filter(|link| !filter.should_ignore(&link.url, &link.file_path, link.line))
        .collect();

    let checker = Checker::new(cli.checker_config())?;
    let cancel = checker.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let mut results = checker.check_all(links).await?;
    report::sort_results(&mut results);
    let summary = summarize(&results);
    let ignored = filter.ignored_entries();

    let rendered = report::Report {
        results: &results,
        summary: &summary,
        ignored: &ignored,
    };
    match cli.format {
        OutputFormat::Json => println!("{}", report::render_json(&rendered)?),
        OutputFormat::Text => report::render_text(&rendered, cli.quiet),
    }

    if summary.is_failure(cli.fail_on_blocked) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn init_tracing(quiet: bool, verbose: u8) {
    let default_directive = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
