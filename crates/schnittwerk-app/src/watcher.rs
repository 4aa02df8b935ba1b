// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Directory watcher — forwards debounced file-creation events into the
// intake channel.
//
// The debounce window lets slow writers finish before the path is handed to
// the pipeline; the filters drop everything that is not a plain, settled
// file (directories, symlinks, hidden files, partial downloads).

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{DebouncedEvent, Debouncer, RecommendedCache, new_debouncer};
use schnittwerk_core::error::{Result, SchnittwerkError};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Start watching `dir` (non-recursively) for created files.
///
/// Eligible paths are pushed into `tx`; the returned debouncer must be kept
/// alive for as long as events are wanted.
pub fn spawn(
    dir: &Path,
    debounce: Duration,
    tx: UnboundedSender<PathBuf>,
) -> Result<Debouncer<RecommendedWatcher, RecommendedCache>> {
    let mut debouncer = new_debouncer(
        debounce,
        None,
        move |result: std::result::Result<Vec<DebouncedEvent>, Vec<notify::Error>>| match result {
            Ok(events) => {
                for event in &events {
                    if !matches!(event.kind, EventKind::Create(_)) {
                        continue;
                    }
                    for path in &event.paths {
                        if !is_eligible(path) {
                            debug!(path = %path.display(), "Ignoring ineligible path");
                            continue;
                        }
                        if tx.send(path.clone()).is_err() {
                            warn!("Intake channel closed — dropping event");
                        }
                    }
                }
            }
            Err(errors) => {
                for error in errors {
                    warn!(?error, "Watcher error");
                }
            }
        },
    )
    .map_err(|err| SchnittwerkError::Watch(format!("failed to create watcher: {err}")))?;

    debouncer
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|err| {
            SchnittwerkError::Watch(format!("failed to watch {}: {}", dir.display(), err))
        })?;

    info!(dir = %dir.display(), "Watcher started");
    Ok(debouncer)
}

/// A path is eligible when it is a settled regular file: not a directory or
/// symlink, not hidden, not a temp/partial-download name, and non-empty.
fn is_eligible(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.')
        || name.ends_with(".tmp")
        || name.ends_with(".part")
        || name.ends_with(".crdownload")
        || name.ends_with(".download")
    {
        return false;
    }

    match std::fs::symlink_metadata(path) {
        Ok(meta) => meta.is_file() && meta.len() > 0,
        Err(_) => false,
    }
}
