//! tsconfig.json loading and materialization
//!
//! Parses JSONC (comments and trailing commas via json5) and expands the
//! `files`/`include`/`exclude`/`references` sections into a [`TsConfigFile`]
//! with absolute file paths. The cache only depends on the [`TsConfigLoader`]
//! trait, so tests can substitute canned configs.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{TsConfigError, TsConfigResult};
use crate::tsconfig::{TsConfigFile, absolutize};

/// Loads and materializes one tsconfig by path.
///
/// Must be deterministic for a given path's current on-disk content.
/// Errors are non-fatal to the cache: a malformed config is skipped, not
/// propagated.
pub trait TsConfigLoader: Send + Sync {
    fn load(&self, path: &Path) -> TsConfigResult<TsConfigFile>;
}

/// Raw shape of the sections we care about in a tsconfig.json.
/// Everything else (compilerOptions and friends) is ignored here; the cache
/// only needs ownership and references.
#[derive(Debug, Default, Deserialize)]
struct RawTsConfig {
    /// `None` (key absent) and `Some(vec![])` differ: a solution-style
    /// config with explicit empty `files` owns nothing, while a config with
    /// neither `files` nor `include` defaults to its whole directory.
    files: Option<Vec<String>>,
    include: Option<Vec<String>>,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    references: Vec<RawReference>,
}

#[derive(Debug, Deserialize)]
struct RawReference {
    path: String,
}

/// Filesystem-backed loader
pub struct FsLoader {
    /// Extensions counted as analyzable sources when expanding `include` globs
    extensions: Vec<String>,
}

impl FsLoader {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    /// Expand one `include` entry relative to the config directory.
    ///
    /// Globs are handled by walking from the longest literal prefix and
    /// filtering on source extension. That over-approximates patterns like
    /// `src/*.ts` (it also picks up nested files), which is acceptable for
    /// ownership purposes: a deeper config claiming the same file is found
    /// first by the ancestor-ordered search.
    fn expand_include(&self, base: &Path, entry: &str, excluded: &[PathBuf]) -> Vec<PathBuf> {
        let literal_prefix: PathBuf = Path::new(entry)
            .components()
            .take_while(|c| {
                c.as_os_str()
                    .to_str()
                    .map(|s| !s.contains(['*', '?']))
                    .unwrap_or(false)
            })
            .collect();
        let root = absolutize(base, &literal_prefix);

        if root.is_file() {
            return vec![root];
        }

        WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.file_name().to_str() != Some("node_modules"))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.has_source_extension(path))
            .filter(|path| !excluded.iter().any(|ex| path.starts_with(ex)))
            .collect()
    }
}

impl TsConfigLoader for FsLoader {
    fn load(&self, path: &Path) -> TsConfigResult<TsConfigFile> {
        let content = std::fs::read_to_string(path).map_err(|e| TsConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let raw: RawTsConfig = json5::from_str(&content).map_err(|e| TsConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("/"));

        let excluded: Vec<PathBuf> = raw
            .exclude
            .iter()
            .map(|entry| {
                let literal: PathBuf = Path::new(entry)
                    .components()
                    .take_while(|c| {
                        c.as_os_str()
                            .to_str()
                            .map(|s| !s.contains(['*', '?']))
                            .unwrap_or(false)
                    })
                    .collect();
                absolutize(base, &literal)
            })
            .collect();

        let mut files: Vec<PathBuf> = raw
            .files
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|f| absolutize(base, Path::new(f)))
            .collect();

        // tsc defaults to including everything under the config directory
        // when neither `files` nor `include` is given.
        let include_entries: Vec<String> = match (&raw.files, raw.include) {
            (None, None) => vec![".".to_string()],
            (_, Some(include)) => include,
            (Some(_), None) => Vec::new(),
        };
        for entry in &include_entries {
            files.extend(self.expand_include(base, entry, &excluded));
        }
        files.sort();
        files.dedup();

        let project_references = raw
            .references
            .iter()
            .map(|r| {
                let target = absolutize(base, Path::new(&r.path));
                // A directory reference means "<dir>/tsconfig.json"
                if target.extension().is_some() && !target.is_dir() {
                    target
                } else {
                    target.join("tsconfig.json")
                }
            })
            .collect();

        Ok(TsConfigFile {
            path: path.to_path_buf(),
            files,
            project_references,
        })
    }
}
