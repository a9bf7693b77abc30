//! Re-scan a topic tree whenever it changes on disk

use std::ops::ControlFlow;
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher};

use crate::core::catalog::Catalog;
use crate::core::error::{IndexError, Result};
use crate::core::file_system::{scan, ScanOptions};

/// Quiet period that ends a burst of filesystem events
pub const DEBOUNCE: Duration = Duration::from_millis(250);

/// Whether an event can change the catalog
pub fn is_relevant(event: &Event, options: &ScanOptions) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    event
        .paths
        .iter()
        .any(|p| p.is_dir() || options.is_document(p) || !p.exists())
}

fn rescan(root: &Path, options: &ScanOptions) -> Result<Catalog> {
    scan(root, options)?.load_catalog()
}

/// Watch `root`, calling `on_change` with a fresh catalog after the initial
/// scan and after every burst of relevant events.
///
/// Returns when `on_change` breaks or the watcher shuts down.
pub fn run<F>(root: &Path, options: &ScanOptions, mut on_change: F) -> Result<()>
where
    F: FnMut(Result<Catalog>) -> ControlFlow<()>,
{
    // Fail early on a missing root instead of inside the watcher
    let initial = match rescan(root, options) {
        Err(e @ (IndexError::NotFound { .. } | IndexError::NotADirectory { .. })) => return Err(e),
        other => other,
    };
    if on_change(initial).is_break() {
        return Ok(());
    }

    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx)?;
    watcher.watch(root, RecursiveMode::Recursive)?;
    tracing::info!("Watching {}", root.display());

    while let Ok(event) = rx.recv() {
        let mut dirty = match event {
            Ok(event) => is_relevant(&event, options),
            Err(e) => {
                tracing::warn!("Watch error: {}", e);
                false
            }
        };

        // Drain the rest of the burst
        loop {
            match rx.recv_timeout(DEBOUNCE) {
                Ok(Ok(event)) => dirty |= is_relevant(&event, options),
                Ok(Err(e)) => tracing::warn!("Watch error: {}", e),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            }
        }

        if dirty {
            tracing::debug!("Change detected, rescanning {}", root.display());
            if on_change(rescan(root, options)).is_break() {
                break;
            }
        }
    }

    Ok(())
}
