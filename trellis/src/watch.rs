//! Drives generation cycles: once, on a polling interval for remote
//! schemas, or on file changes for local ones.
//!
//! Cycles run one at a time on the calling task. Triggers that arrive
//! while a cycle is running are coalesced into the next cycle.

use std::{path::Path, time::Duration};

use miette::{Context, IntoDiagnostic, Result};
use notify::{Event, RecursiveMode, Watcher};
use tokio::{
    sync::mpsc,
    time::{Instant, MissedTickBehavior},
};
use trellis_codegen_typescript::{GenerateOutcome, Generator, GeneratorConfig};
use trellis_core::load::SchemaLocator;

use crate::config::Types;

const WATCH_DEBOUNCE: Duration = Duration::from_millis(100);

/// Runs a single cycle, and fails if it fails.
pub async fn run_once(config: &GeneratorConfig) -> Result<()> {
    let start = Instant::now();
    let outcome = Generator::new().generate(config).await?;
    log_outcome(config, outcome, start);
    Ok(())
}

/// Generates, then keeps regenerating whenever the schema changes.
/// A failed cycle is logged, and retried on the next trigger.
pub async fn run(types: Types) -> Result<()> {
    let mut generator = Generator::new();
    match &types.config.path {
        SchemaLocator::Url(url) => {
            tracing::info!(%url, period = ?types.period, "polling schema");
            poll(&mut generator, &types.config, types.period).await
        }
        SchemaLocator::File(path) => {
            tracing::info!(path = %path.display(), "watching schema");
            watch(&mut generator, &types.config, path).await
        }
    }
}

async fn poll(generator: &mut Generator, config: &GeneratorConfig, period: Duration) -> Result<()> {
    let mut interval = tokio::time::interval(period);
    // A slow fetch delays the next tick instead of bursting.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        cycle(generator, config).await;
    }
}

async fn watch(generator: &mut Generator, config: &GeneratorConfig, path: &Path) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        let _ = tx.send(result);
    })
    .into_diagnostic()
    .context("Failed to create file watcher")?;

    // Watch the directory, so that editors that replace the file
    // on save don't end the watch.
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .into_diagnostic()
        .with_context(|| format!("Failed to watch `{}`", dir.display()))?;

    cycle(generator, config).await;

    while let Some(result) = rx.recv().await {
        match result {
            Ok(event) if touches(&event, path) => (),
            Ok(_) => continue,
            Err(err) => {
                tracing::warn!(%err, "file watcher error");
                continue;
            }
        }
        // Drain the rest of a burst of events.
        let deadline = Instant::now() + WATCH_DEBOUNCE;
        while let Ok(Some(_)) = tokio::time::timeout_at(deadline, rx.recv()).await {}
        tracing::debug!(path = %path.display(), "schema changed");
        cycle(generator, config).await;
    }

    miette::bail!("file watcher stopped")
}

/// Returns `true` if the event creates or modifies the schema file.
fn touches(event: &Event, path: &Path) -> bool {
    (event.kind.is_create() || event.kind.is_modify())
        && event
            .paths
            .iter()
            .any(|changed| changed.file_name() == path.file_name())
}

async fn cycle(generator: &mut Generator, config: &GeneratorConfig) {
    let start = Instant::now();
    match generator.generate(config).await {
        Ok(outcome) => log_outcome(config, outcome, start),
        Err(err) => {
            let report = miette::Report::new(err);
            tracing::error!(schema = %config.path, "generation failed: {report:?}");
        }
    }
}

fn log_outcome(config: &GeneratorConfig, outcome: GenerateOutcome, start: Instant) {
    let elapsed = start.elapsed();
    match outcome {
        GenerateOutcome::Written => tracing::info!(
            destination = %config.destination.display(),
            ?elapsed,
            "generated router types"
        ),
        GenerateOutcome::Unchanged => tracing::debug!(?elapsed, "schema unchanged"),
    }
}
