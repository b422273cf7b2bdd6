mod app;
mod config;
mod mapping;
mod pipeline;
mod sinks;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::{Arc, Mutex};

use crate::app::{Cli, finish_sink, init_sink, process_input};
use crate::config::{FiltersConfig, RuntimeConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("CLI: Failed to initialize thread pool")?;
    }

    let filters = match &cli.config {
        Some(path) => FiltersConfig::load(path)?,
        None => FiltersConfig::default(),
    };
    let compiled = Arc::new(filters.compile(cli.predicate.as_deref())?);

    tracing::info!(
        "Filter: {} (fields: {}; mappings: {})",
        compiled.filter.source(),
        compiled.filter.expr().fields().join(", "),
        compiled.mappings.len()
    );
    tracing::debug!("Parsed filter: {}", compiled.filter.expr());

    let runtime = Arc::new(RuntimeConfig {
        batch_size: cli.batch_size.max(1),
        strict: cli.strict,
    });

    let sink = init_sink(&cli)?;
    let sink_handle = Arc::new(Mutex::new(sink));

    let start = std::time::Instant::now();
    let stats = process_input(&cli, compiled, runtime, sink_handle.clone())?;

    finish_sink(&sink_handle)?;

    if stats.invalid > 0 {
        tracing::warn!("Skipped {} invalid input lines", stats.invalid);
    }

    let elapsed = start.elapsed();
    tracing::info!(
        "Done! Matched {} of {} lines in {:.2}s ({} lines/s)",
        stats.matched,
        stats.lines,
        elapsed.as_secs_f64(),
        (stats.lines as f64 / elapsed.as_secs_f64().max(f64::EPSILON)) as u64
    );

    Ok(())
}
