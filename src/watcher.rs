//! Workspace watcher feeding filesystem events into the tsconfig cache
//!
//! Watches the workspace root recursively and translates notify events into
//! [`FileEvent`]s for [`TsConfigCache::on_file_change`]. Modifications are
//! debounced (editors save in bursts); creations and deletions are forwarded
//! immediately since the invalidation policy for them is cheap.

use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};
use tracing::{debug, info, warn};

use crate::error::{TsConfigError, TsConfigResult};
use crate::tsconfig::cache::TsConfigCache;
use crate::tsconfig::events::{FileEvent, FileEventKind};

pub struct WorkspaceWatcher {
    cache: Arc<TsConfigCache>,
    root: PathBuf,
    debounce_ms: u64,
    /// Channel receiver for file events
    event_rx: mpsc::Receiver<notify::Result<Event>>,
    watcher: notify::RecommendedWatcher,
}

impl WorkspaceWatcher {
    pub fn new(
        cache: Arc<TsConfigCache>,
        root: &Path,
        debounce_ms: u64,
    ) -> TsConfigResult<Self> {
        let (tx, rx) = mpsc::channel(100);

        // The notify callback is sync, hence blocking_send
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })
        .map_err(|e| TsConfigError::WatcherInit {
            reason: e.to_string(),
        })?;

        Ok(Self {
            cache,
            root: root.to_path_buf(),
            debounce_ms,
            event_rx: rx,
            watcher,
        })
    }

    /// Watch the workspace until the event channel closes.
    pub async fn watch(mut self) -> TsConfigResult<()> {
        self.watcher
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| TsConfigError::PathWatch {
                path: self.root.clone(),
                reason: e.to_string(),
            })?;
        info!(root = %self.root.display(), "watching workspace for tsconfig changes");

        let mut pending_changes: HashMap<PathBuf, Instant> = HashMap::new();
        let debounce = Duration::from_millis(self.debounce_ms);

        loop {
            let timeout = sleep(Duration::from_millis(100));
            tokio::pin!(timeout);

            tokio::select! {
                received = self.event_rx.recv() => {
                    let Some(res) = received else { break };
                    match res {
                        Ok(event) => {
                            let kind = match event.kind {
                                EventKind::Create(_) => Some(FileEventKind::Created),
                                EventKind::Modify(_) => Some(FileEventKind::Modified),
                                EventKind::Remove(_) => Some(FileEventKind::Deleted),
                                _ => None,
                            };
                            let Some(kind) = kind else { continue };
                            for path in event.paths {
                                match kind {
                                    FileEventKind::Modified => {
                                        // Batch rapid saves of the same file
                                        pending_changes.insert(path, Instant::now());
                                    }
                                    _ => {
                                        // Creations/deletions can no longer be
                                        // coalesced; a debounced modify for the
                                        // same path would now be stale
                                        pending_changes.remove(&path);
                                        self.cache.on_file_change(&FileEvent { path, kind });
                                    }
                                }
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "file watch error");
                        }
                    }
                }

                _ = &mut timeout => {
                    let now = Instant::now();
                    let mut settled = Vec::new();
                    pending_changes.retain(|path, last_change| {
                        if now.duration_since(*last_change) >= debounce {
                            settled.push(path.clone());
                            false
                        } else {
                            true
                        }
                    });
                    for path in settled {
                        debug!(path = %path.display(), "debounced modification settled");
                        self.cache.on_file_change(&FileEvent {
                            path,
                            kind: FileEventKind::Modified,
                        });
                    }
                }

                else => break,
            }
        }

        Ok(())
    }
}
