//! File watching for re-applying the fix.
//!
//! Uses `notify-debouncer-full` to watch the built site for page changes and
//! forwards each debounced batch to the reactor as a [`MutationBatch`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Config as NotifyConfig, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{
    DebounceEventResult, Debouncer, RecommendedCache, new_debouncer, new_debouncer_opt,
};
use tokio::sync::mpsc;

use crate::config::WatchConfig;
use crate::reactor::MutationBatch;
use crate::surface::is_page;

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("cannot watch {path}: {source}")]
    Root {
        path: PathBuf,
        source: std::io::Error,
    },
}

// =============================================================================
// Path classification
// =============================================================================

/// Decides which changed paths are site pages.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    root: PathBuf,
}

impl PathClassifier {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Whether a changed path is a page worth re-applying for.
    ///
    /// Hidden files and directories below the root are skipped.
    pub fn is_relevant(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        if relative
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        {
            return false;
        }

        is_page(path)
    }
}

// =============================================================================
// File watcher
// =============================================================================

/// A file watcher that can use either native or polling backend.
///
/// Watching stops when the watcher is dropped.
pub enum FileWatcher {
    /// Native file system watcher (recommended for local development).
    Native {
        _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
    },
    /// Polling-based watcher (for network filesystems, Docker, etc.).
    Polling {
        _debouncer: Debouncer<PollWatcher, RecommendedCache>,
    },
}

impl FileWatcher {
    /// Watch `root` recursively, returning the watcher and its batches.
    pub fn new(
        config: &WatchConfig,
        root: &Path,
    ) -> Result<(Self, mpsc::UnboundedReceiver<MutationBatch>), WatchError> {
        let root = root.canonicalize().map_err(|e| WatchError::Root {
            path: root.to_path_buf(),
            source: e,
        })?;
        let debounce_timeout = Duration::from_millis(config.debounce_ms);
        let classifier = PathClassifier::new(root.clone());

        let (tx, rx) = mpsc::unbounded_channel();

        // Callback to convert notify events into mutation batches
        let callback = move |result: DebounceEventResult| match result {
            Ok(events) => {
                let mut batch: MutationBatch = events
                    .iter()
                    .filter(|event| is_relevant_event(&event.kind))
                    .flat_map(|event| event.paths.iter())
                    .filter(|path| classifier.is_relevant(path))
                    .cloned()
                    .collect();
                batch.sort();
                batch.dedup();

                if !batch.is_empty() {
                    let _ = tx.send(batch);
                }
            }
            Err(errors) => {
                for e in errors {
                    tracing::warn!(error = %e, "watch error");
                }
            }
        };

        let watcher = if config.poll {
            let poll_interval = Duration::from_millis(config.poll_interval_ms);
            let notify_config = NotifyConfig::default().with_poll_interval(poll_interval);

            let mut debouncer = new_debouncer_opt::<_, PollWatcher, RecommendedCache>(
                debounce_timeout,
                None,
                callback,
                RecommendedCache::default(),
                notify_config,
            )?;
            debouncer.watch(&root, RecursiveMode::Recursive)?;

            FileWatcher::Polling {
                _debouncer: debouncer,
            }
        } else {
            let mut debouncer = new_debouncer(debounce_timeout, None, callback)?;
            debouncer.watch(&root, RecursiveMode::Recursive)?;

            FileWatcher::Native {
                _debouncer: debouncer,
            }
        };

        tracing::debug!(root = %root.display(), poll = config.poll, "watching site");
        Ok((watcher, rx))
    }
}

/// Check if an event kind can change page content.
fn is_relevant_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any)
    )
}
