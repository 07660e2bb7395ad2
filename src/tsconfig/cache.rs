//! The tsconfig resolution cache
//!
//! One [`OriginCache`] per [`TsConfigOrigin`] memoizes file-to-tsconfig
//! lookups and the frontier of a graph search over project references.
//! [`TsConfigCache`] routes lookups to the active origin and applies the
//! invalidation policy for filesystem change events.
//!
//! A resolve walks the pending frontier depth-first-ish: newly discovered
//! references go to the front of the queue, and before each search pass the
//! queue is reordered so configs living in an ancestor directory of the
//! requested file are tried first (deepest ancestor first). Reordering only
//! changes order, never membership, so it cannot affect which config wins.

use parking_lot::RwLock;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::tsconfig::events::{FileEvent, FileEventKind, is_analyzable_source, is_tsconfig_name};
use crate::tsconfig::loader::TsConfigLoader;
use crate::tsconfig::{TsConfigFile, TsConfigOrigin};

/// Memoized outcome of a lookup. `None` is a real, cached answer ("no config
/// owns this file"), distinct from a key that was never looked up.
type Memo = HashMap<PathBuf, Option<Arc<TsConfigFile>>>;

/// One origin's whole state. Clears replace the entire struct in a single
/// store under the scope's lock, so a concurrent reader observes either the
/// pre-clear or the post-clear state, never a mix.
#[derive(Debug, Default)]
struct CacheState {
    file_to_tsconfig: Memo,
    discovered: HashSet<PathBuf>,
    seeds: Vec<PathBuf>,
    pending: VecDeque<PathBuf>,
    initialized: bool,
}

impl CacheState {
    /// Fresh search state over the same seeds: memo emptied, frontier and
    /// discovered set rewound to exactly the seed list. Transitively
    /// discovered references are dropped and rediscovered lazily.
    fn rewound_to_seeds(seeds: Vec<PathBuf>, initialized: bool) -> Self {
        Self {
            file_to_tsconfig: Memo::new(),
            discovered: seeds.iter().cloned().collect(),
            pending: seeds.iter().cloned().collect(),
            seeds,
            initialized,
        }
    }
}

/// Per-origin resolution cache
#[derive(Debug)]
pub struct OriginCache {
    origin_label: &'static str,
    state: RwLock<CacheState>,
}

impl OriginCache {
    fn new(origin: TsConfigOrigin) -> Self {
        Self {
            origin_label: match origin {
                TsConfigOrigin::Explicit => "explicit",
                TsConfigOrigin::Discovered => "discovered",
                TsConfigOrigin::Fallback => "fallback",
            },
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Find the tsconfig governing `file`, loading pending configs on demand.
    ///
    /// Returns `None` both for "no config owns this file" (which is cached)
    /// and for an uninitialized scope (which is logged, never a panic).
    fn resolve(&self, file: &Path, loader: &dyn TsConfigLoader) -> Option<Arc<TsConfigFile>> {
        let mut state = self.state.write();
        if !state.initialized {
            error!(
                origin = self.origin_label,
                file = %file.display(),
                "tsconfig cache is not initialized"
            );
            return None;
        }
        if let Some(cached) = state.file_to_tsconfig.get(file) {
            return cached.clone();
        }

        state.pending = reorder_pending(std::mem::take(&mut state.pending), file);
        debug!(
            origin = self.origin_label,
            file = %file.display(),
            pending = state.pending.len(),
            "continuing tsconfig search"
        );

        while let Some(tsconfig_path) = state.pending.pop_front() {
            debug_assert!(
                state.discovered.contains(&tsconfig_path),
                "pending tsconfig {} missing from discovered set",
                tsconfig_path.display()
            );
            debug!(tsconfig = %tsconfig_path.display(), "loading tsconfig");
            let tsconfig = match loader.load(&tsconfig_path) {
                Ok(loaded) => Arc::new(loaded),
                Err(e) => {
                    // Exhausted for this search pass; stays in the discovered
                    // set and is re-queued only by a later reset.
                    warn!(
                        tsconfig = %tsconfig_path.display(),
                        error = %e,
                        "skipping tsconfig that failed to load"
                    );
                    continue;
                }
            };

            // First write wins: a config found earlier in the search keeps
            // ownership even if a later one also claims the file. Within one
            // config, files are inserted in declaration order.
            for owned in &tsconfig.files {
                state
                    .file_to_tsconfig
                    .entry(owned.clone())
                    .or_insert_with(|| Some(Arc::clone(&tsconfig)));
            }

            if !tsconfig.project_references.is_empty() {
                info!(
                    tsconfig = %tsconfig_path.display(),
                    references = tsconfig.project_references.len(),
                    "queueing referenced project tsconfigs"
                );
                // Front of the queue, so reference chains near the requested
                // file are explored before the remaining frontier.
                for reference in tsconfig.project_references.iter().rev() {
                    if state.discovered.insert(reference.clone()) {
                        state.pending.push_front(reference.clone());
                    }
                }
            }

            if let Some(found) = state.file_to_tsconfig.get(file) {
                if let Some(tsconfig) = found {
                    info!(
                        tsconfig = tsconfig.file_name(),
                        file = %file.display(),
                        unchecked = state.pending.len(),
                        discovered = state.discovered.len(),
                        "resolved tsconfig for file"
                    );
                }
                return found.clone();
            }
        }

        // Negative result is cached too, so repeated lookups for files no
        // config owns stay O(1) until an invalidation event.
        state.file_to_tsconfig.insert(file.to_path_buf(), None);
        None
    }

    fn initialize_seeds(&self, seeds: Vec<PathBuf>) {
        let mut state = self.state.write();
        *state = CacheState::rewound_to_seeds(seeds, true);
    }

    /// Drop the file memo and rewind the frontier to the seeds, keeping the
    /// scope initialized.
    fn clear_file_map(&self) {
        let mut state = self.state.write();
        let seeds = std::mem::take(&mut state.seeds);
        let initialized = state.initialized;
        *state = CacheState::rewound_to_seeds(seeds, initialized);
    }

    /// Full reset: the seed list itself is no longer trustworthy.
    fn clear_all(&self) {
        let mut state = self.state.write();
        *state = CacheState::default();
    }

    fn is_initialized(&self) -> bool {
        self.state.read().initialized
    }

    fn seeds(&self) -> Vec<PathBuf> {
        self.state.read().seeds.clone()
    }

    fn has_discovered(&self, path: &Path) -> bool {
        self.state.read().discovered.contains(path)
    }
}

/// Reorder the pending frontier for one lookup: configs whose directory is
/// an ancestor of `file` first (deepest ancestor first, insertion order
/// preserved among equals), everything else behind in its original order.
///
/// A tsconfig almost always lives in an ancestor directory of the files it
/// governs, and the closest ancestor is the most likely owner, so this
/// sharply cuts average search depth without changing membership.
fn reorder_pending(pending: VecDeque<PathBuf>, file: &Path) -> VecDeque<PathBuf> {
    let mut ancestors: Vec<PathBuf> = Vec::new();
    let mut others: Vec<PathBuf> = Vec::new();
    for tsconfig in pending {
        let is_ancestor = tsconfig
            .parent()
            .map(|dir| file.starts_with(dir))
            .unwrap_or(false);
        if is_ancestor {
            ancestors.push(tsconfig);
        } else {
            others.push(tsconfig);
        }
    }
    // Stable sort keeps insertion order for configs at the same depth
    ancestors.sort_by_key(|tsconfig| Reverse(tsconfig.components().count()));
    ancestors.into_iter().chain(others).collect()
}

/// Facade over the per-origin caches.
///
/// Holds one independent [`OriginCache`] per origin, tracks which origin is
/// active for routing, and applies the change-event invalidation policy.
pub struct TsConfigCache {
    scopes: [OriginCache; 3],
    active: RwLock<Option<TsConfigOrigin>>,
    loader: Arc<dyn TsConfigLoader>,
    /// Analyzable source extensions, for the created-file invalidation rule
    extensions: Vec<String>,
}

impl TsConfigCache {
    pub fn new(loader: Arc<dyn TsConfigLoader>, extensions: Vec<String>) -> Self {
        Self {
            scopes: [
                OriginCache::new(TsConfigOrigin::Explicit),
                OriginCache::new(TsConfigOrigin::Discovered),
                OriginCache::new(TsConfigOrigin::Fallback),
            ],
            active: RwLock::new(None),
            loader,
            extensions,
        }
    }

    fn scope(&self, origin: TsConfigOrigin) -> &OriginCache {
        &self.scopes[origin.index()]
    }

    /// Which tsconfig governs `file`, per the active origin's cache.
    /// Fails closed: no active origin or an uninitialized scope yields `None`.
    pub fn resolve(&self, file: &Path) -> Option<Arc<TsConfigFile>> {
        let origin = (*self.active.read())?;
        self.scope(origin).resolve(file, self.loader.as_ref())
    }

    pub fn set_active_origin(&self, origin: TsConfigOrigin) {
        *self.active.write() = Some(origin);
    }

    pub fn active_origin(&self) -> Option<TsConfigOrigin> {
        *self.active.read()
    }

    /// Seed an origin's scope.
    ///
    /// Fallback seeds exactly once; for the other origins an identical seed
    /// list is a no-op so accumulated discovery state survives redundant
    /// re-initialization.
    pub fn initialize_with(&self, seeds: Vec<PathBuf>, origin: TsConfigOrigin) {
        let scope = self.scope(origin);
        if origin == TsConfigOrigin::Fallback && scope.is_initialized() {
            return;
        }
        if origin != TsConfigOrigin::Fallback && scope.is_initialized() && scope.seeds() == seeds {
            return;
        }
        debug!(origin = ?origin, seeds = seeds.len(), "resetting tsconfig cache scope");
        scope.initialize_seeds(seeds);
    }

    /// The seed list an origin was initialized with, or `None` when that
    /// scope was never initialized (distinct from an empty seed list).
    pub fn cached_seed_configs(&self, origin: TsConfigOrigin) -> Option<Vec<PathBuf>> {
        let scope = self.scope(origin);
        if scope.is_initialized() {
            Some(scope.seeds())
        } else {
            None
        }
    }

    /// Apply the invalidation policy for one filesystem change.
    ///
    /// Any event on a file named like a tsconfig fully resets the discovered
    /// scope, and the explicit scope too when the path is one of its known
    /// configs. A newly created source file only drops the per-file memos:
    /// an already-exhausted ownership walk may have cached answers that the
    /// new file invalidates, but the config graph itself is still valid.
    pub fn on_file_change(&self, event: &FileEvent) {
        debug!(path = %event.path.display(), kind = ?event.kind, "processing file event");
        if is_tsconfig_name(&event.path) {
            debug!("clearing tsconfig cache");
            self.scope(TsConfigOrigin::Discovered).clear_all();
            if self
                .scope(TsConfigOrigin::Explicit)
                .has_discovered(&event.path)
            {
                self.scope(TsConfigOrigin::Explicit).clear_all();
            }
        } else if event.kind == FileEventKind::Created
            && is_analyzable_source(&event.path, &self.extensions)
        {
            debug!("clearing file to tsconfig memo in all scopes");
            for scope in &self.scopes {
                scope.clear_file_map();
            }
        }
    }
}
