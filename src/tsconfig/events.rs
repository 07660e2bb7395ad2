//! Filesystem change events and the predicates the invalidation policy uses

use std::path::Path;

/// One observed filesystem mutation under the monitored tree.
/// Delivery order is not serialized with resolve calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: std::path::PathBuf,
    pub kind: FileEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    Created,
    Modified,
    Deleted,
}

/// Whether a path names a project configuration file.
///
/// Matches the tsconfig naming convention (`tsconfig.json`,
/// `tsconfig.base.json`, `tsconfig-build.json`, ...), not just the `.json`
/// extension. Variant names matter because they reach the cache through
/// project references.
pub fn is_tsconfig_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| name.contains("tsconfig") && name.ends_with("json"))
        .unwrap_or(false)
}

/// Whether a path has one of the analyzable source extensions
pub fn is_analyzable_source(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
