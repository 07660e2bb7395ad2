//! tsconfig project resolution
//!
//! Answers one question for the analyzer: "which tsconfig.json governs this
//! source file?" Configs can reference other configs (project references),
//! so answering it means a bounded graph search over the reference graph,
//! memoized per file and invalidated on filesystem changes.
//!
//! - `loader`: materializes a tsconfig.json into a [`TsConfigFile`]
//! - `cache`: the per-origin resolution caches and their facade
//! - `events`: filesystem change events and the invalidation predicates
//! - `provider`: seed discovery (settings, filesystem lookup, fallback)

pub mod cache;
pub mod events;
pub mod loader;
pub mod provider;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A materialized project configuration: which files it governs and which
/// other configs it references. Immutable once produced by a loader;
/// identity is `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TsConfigFile {
    /// Canonical path of the tsconfig.json itself
    pub path: PathBuf,
    /// Absolute paths of the source files this config claims
    pub files: Vec<PathBuf>,
    /// Paths of referenced tsconfigs, in declaration order
    pub project_references: Vec<PathBuf>,
}

impl TsConfigFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            files: Vec::new(),
            project_references: Vec::new(),
        }
    }

    /// File name of the config, for log messages
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("tsconfig.json")
    }
}

/// How the seed tsconfigs for a cache scope were obtained.
///
/// Each origin keys an independent cache; at most one is active for routing
/// at a time, but every origin keeps its state across activation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TsConfigOrigin {
    /// Paths supplied directly by settings
    Explicit,
    /// Paths found by walking the workspace
    Discovered,
    /// A generated catch-all config, seeded exactly once
    Fallback,
}

impl TsConfigOrigin {
    pub const ALL: [TsConfigOrigin; 3] = [Self::Explicit, Self::Discovered, Self::Fallback];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Explicit => 0,
            Self::Discovered => 1,
            Self::Fallback => 2,
        }
    }
}

/// Lexically normalize a path: resolve `.` and `..` components without
/// touching the filesystem. Loader output must be comparable by value, and
/// `canonicalize` would fail for files that do not exist yet.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(Component::ParentDir);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Join `relative` onto `base` unless it is already absolute, then normalize.
pub(crate) fn absolutize(base: &Path, relative: &Path) -> PathBuf {
    if relative.is_absolute() {
        normalize_path(relative)
    } else {
        normalize_path(&base.join(relative))
    }
}
