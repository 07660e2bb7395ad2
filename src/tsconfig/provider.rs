//! Seed providers: where the initial tsconfig paths for each origin come from
//!
//! Priority order mirrors the cache origins: explicitly configured paths
//! win, otherwise tsconfigs found by walking the workspace, otherwise a
//! generated catch-all config so analysis always has *some* project scope.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{TsConfigError, TsConfigResult};
use crate::tsconfig::events::is_tsconfig_name;
use crate::tsconfig::{TsConfigOrigin, absolutize};

/// Name of the generated fallback config under the cache directory
const FALLBACK_TSCONFIG: &str = "tsconfig-fallback.json";

/// Explicitly configured tsconfig paths, absolutized against the workspace root
pub fn explicit_seeds(settings: &Settings, root: &Path) -> Vec<PathBuf> {
    settings
        .analysis
        .tsconfigs
        .iter()
        .map(|p| absolutize(root, p))
        .collect()
}

/// Walk the workspace for files matching the tsconfig naming convention.
///
/// Gitignore-aware; skips hidden directories (including `.tscope`, so a
/// previously generated fallback config is never "discovered") and
/// node_modules. The result is sorted so the seed order, and therefore the
/// search order, is deterministic across runs.
pub fn lookup_seeds(root: &Path) -> Vec<PathBuf> {
    let mut seeds: Vec<PathBuf> = WalkBuilder::new(root)
        .follow_links(false)
        .filter_entry(|entry| entry.file_name().to_str() != Some("node_modules"))
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.into_path())
        .filter(|path| is_tsconfig_name(path))
        .collect();
    seeds.sort();
    debug!(root = %root.display(), count = seeds.len(), "tsconfig lookup finished");
    seeds
}

/// Write a generated tsconfig that includes the whole workspace and return
/// its path. Used when neither settings nor lookup produced any seeds.
pub fn fallback_seed(root: &Path, cache_dir: &Path) -> TsConfigResult<PathBuf> {
    let path = cache_dir.join(FALLBACK_TSCONFIG);
    let content = serde_json::json!({
        "include": [format!("{}/**/*", root.display())],
    });
    std::fs::create_dir_all(cache_dir).map_err(|e| TsConfigError::FileWrite {
        path: cache_dir.to_path_buf(),
        source: e,
    })?;
    std::fs::write(&path, content.to_string()).map_err(|e| TsConfigError::FileWrite {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

/// Pick the seeds and origin for this run: settings, then lookup, then the
/// generated fallback.
pub fn choose_seeds(
    settings: &Settings,
    root: &Path,
) -> TsConfigResult<(TsConfigOrigin, Vec<PathBuf>)> {
    let explicit = explicit_seeds(settings, root);
    if !explicit.is_empty() {
        info!(count = explicit.len(), "using tsconfigs from settings");
        return Ok((TsConfigOrigin::Explicit, explicit));
    }

    let discovered = lookup_seeds(root);
    if !discovered.is_empty() {
        info!(count = discovered.len(), "using tsconfigs discovered in the workspace");
        return Ok((TsConfigOrigin::Discovered, discovered));
    }

    let fallback = fallback_seed(root, &root.join(".tscope"))?;
    info!(tsconfig = %fallback.display(), "no tsconfig found, using generated fallback");
    Ok((TsConfigOrigin::Fallback, vec![fallback]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_seeds_are_absolutized() {
        let mut settings = Settings::default();
        settings.analysis.tsconfigs = vec![
            PathBuf::from("tsconfig.json"),
            PathBuf::from("/abs/tsconfig.json"),
        ];

        let seeds = explicit_seeds(&settings, Path::new("/workspace"));
        assert_eq!(
            seeds,
            vec![
                PathBuf::from("/workspace/tsconfig.json"),
                PathBuf::from("/abs/tsconfig.json"),
            ]
        );
    }

    #[test]
    fn lookup_finds_tsconfig_variants_but_not_node_modules() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("pkg")).unwrap();
        fs::create_dir_all(root.join("node_modules/dep")).unwrap();
        fs::write(root.join("tsconfig.json"), "{}").unwrap();
        fs::write(root.join("pkg/tsconfig.build.json"), "{}").unwrap();
        fs::write(root.join("pkg/package.json"), "{}").unwrap();
        fs::write(root.join("node_modules/dep/tsconfig.json"), "{}").unwrap();

        let seeds = lookup_seeds(root);

        assert_eq!(
            seeds,
            vec![
                root.join("pkg/tsconfig.build.json"),
                root.join("tsconfig.json"),
            ]
        );
    }

    #[test]
    fn choose_seeds_prefers_explicit_then_lookup_then_fallback() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        // Nothing configured, nothing on disk: generated fallback
        let settings = Settings::default();
        let (origin, seeds) = choose_seeds(&settings, root).unwrap();
        assert_eq!(origin, TsConfigOrigin::Fallback);
        assert_eq!(seeds.len(), 1);
        assert!(seeds[0].exists(), "fallback tsconfig must be written");

        // A tsconfig on disk beats the fallback
        fs::write(root.join("tsconfig.json"), "{}").unwrap();
        let (origin, _) = choose_seeds(&settings, root).unwrap();
        assert_eq!(origin, TsConfigOrigin::Discovered);

        // Settings beat both
        let mut settings = Settings::default();
        settings.analysis.tsconfigs = vec![PathBuf::from("custom/tsconfig.json")];
        let (origin, seeds) = choose_seeds(&settings, root).unwrap();
        assert_eq!(origin, TsConfigOrigin::Explicit);
        assert_eq!(seeds, vec![root.join("custom/tsconfig.json")]);
    }
}
