// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Schnittwerk — Watched-Folder Document Slicer
//
// Entry point. Initialises logging, loads configuration, sweeps files
// already present in the watch directory, then consumes file-creation
// events one at a time.

mod watcher;

use std::path::{Path, PathBuf};
use std::time::Duration;

use schnittwerk_core::SlicerConfig;
use schnittwerk_core::error::SchnittwerkError;
use schnittwerk_engine::{IntakeController, IntakeOutcome};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Optional JSON config next to the binary's working directory.
const CONFIG_FILE: &str = "schnittwerk.json";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        error!(%err, "Schnittwerk exiting");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), SchnittwerkError> {
    let mut config = SlicerConfig::load(Path::new(CONFIG_FILE)).unwrap_or_default();
    // A single CLI argument overrides the configured watch directory.
    if let Some(dir) = std::env::args().nth(1) {
        config.watch_dir = PathBuf::from(dir);
    }

    if !config.watch_dir.is_dir() {
        return Err(SchnittwerkError::WatchDirMissing(
            config.watch_dir.display().to_string(),
        ));
    }

    info!("Schnittwerk starting");
    info!(
        dir = %config.watch_dir.display(),
        size_threshold_mb = config.size_threshold as f64 / 1024.0 / 1024.0,
        char_threshold = config.char_threshold,
        "Watching directory"
    );

    let controller = IntakeController::new(config.clone());

    // Files already present go through the same pipeline once, before any
    // watching starts.
    sweep_existing(&controller, &config.watch_dir).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _debouncer = watcher::spawn(
        &config.watch_dir,
        Duration::from_millis(config.debounce_ms),
        tx,
    )?;

    info!("Press Ctrl+C to stop monitoring");

    loop {
        tokio::select! {
            maybe_path = rx.recv() => {
                let Some(path) = maybe_path else { break };
                info!(path = %path.display(), "New file detected");
                process_one(&controller, path).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Feed every pre-existing regular file through the pipeline, sequentially.
async fn sweep_existing(controller: &IntakeController, dir: &Path) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(%err, "Could not list watch directory for the initial sweep");
            return;
        }
    };

    for entry in entries.flatten() {
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file {
            process_one(controller, entry.path()).await;
        }
    }
}

/// Run the pipeline for one file to completion before returning.
///
/// The pipeline is synchronous I/O end to end, so it runs on the blocking
/// pool; awaiting it here is what keeps processing sequential per file.
async fn process_one(controller: &IntakeController, path: PathBuf) {
    let worker = controller.clone();
    let result = tokio::task::spawn_blocking(move || worker.process(&path)).await;

    match result {
        Ok(Ok(IntakeOutcome::Sliced(slices))) => {
            info!(slices = slices.len(), "File processed");
        }
        Ok(Ok(_)) => {}
        Ok(Err(err)) => error!(%err, "File could not be processed"),
        Err(err) => error!(%err, "Processing task failed"),
    }
}
