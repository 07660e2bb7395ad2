//! Configuration module for tscope.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.tscope/settings.toml`, found by ancestor walk)
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `TSCOPE_` and use double
//! underscores to separate nested levels:
//! - `TSCOPE_ANALYSIS__TSCONFIGS='["tsconfig.json"]'` sets `analysis.tsconfigs`
//! - `TSCOPE_FILE_WATCH__DEBOUNCE_MS=1000` sets `file_watch.debounce_ms`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Workspace root directory (where .tscope is located)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Global debug mode
    #[serde(default)]
    pub debug: bool,

    /// Analysis settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// File watching settings
    #[serde(default)]
    pub file_watch: FileWatchConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalysisConfig {
    /// Explicitly configured tsconfig paths, relative to the workspace root.
    /// When empty, tsconfigs are discovered by walking the workspace.
    #[serde(default)]
    pub tsconfigs: Vec<PathBuf>,

    /// File extensions treated as analyzable JS/TS sources
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tsconfigs: Vec::new(),
            extensions: default_extensions(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FileWatchConfig {
    /// Whether the watch command monitors the workspace for changes
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// How long to wait before processing changes (milliseconds)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for FileWatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_extensions() -> Vec<String> {
    ["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts", "vue"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            workspace_root: None,
            debug: false,
            analysis: AnalysisConfig::default(),
            file_watch: FileWatchConfig::default(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(".tscope/settings.toml"));

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels; single underscores
            // stay as-is within field names
            .merge(Env::prefixed("TSCOPE_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("TSCOPE_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Save current configuration to file
    pub fn save(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let parent = path.parent().ok_or("Invalid settings path")?;
        std::fs::create_dir_all(parent)?;
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Find the workspace config by looking for a .tscope directory,
    /// searching from the current directory up to the root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".tscope");
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Get the workspace root directory (where .tscope is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            if ancestor.join(".tscope").is_dir() {
                return Some(ancestor.to_path_buf());
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_have_js_ts_extensions() {
        let settings = Settings::default();
        assert!(settings.analysis.tsconfigs.is_empty());
        for ext in ["js", "ts", "tsx", "vue"] {
            assert!(
                settings.analysis.extensions.iter().any(|e| e == ext),
                "missing default extension {ext}"
            );
        }
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let mut settings = Settings::default();
        settings.analysis.tsconfigs = vec![PathBuf::from("packages/web/tsconfig.json")];
        settings.file_watch.debounce_ms = 250;

        let serialized = toml::to_string_pretty(&settings).unwrap();
        let restored: Settings = toml::from_str(&serialized).unwrap();

        assert_eq!(restored.analysis.tsconfigs, settings.analysis.tsconfigs);
        assert_eq!(restored.file_watch.debounce_ms, 250);
    }

    #[test]
    fn load_from_missing_file_falls_back_to_defaults() {
        let settings = Settings::load_from("/does/not/exist/settings.toml").unwrap();
        assert_eq!(settings.version, 1);
        assert!(settings.file_watch.enabled);
    }
}
