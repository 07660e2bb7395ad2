//! End-to-end resolution against real tsconfig files on disk:
//! seed discovery, project-reference traversal, and event-driven
//! invalidation through the public API.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tscope::tsconfig::provider;
use tscope::{
    FileEvent, FileEventKind, FsLoader, Settings, TsConfigCache, TsConfigOrigin,
};

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn new_cache() -> Arc<TsConfigCache> {
    let extensions = Settings::default().analysis.extensions;
    let loader = Arc::new(FsLoader::new(extensions.clone()));
    Arc::new(TsConfigCache::new(loader, extensions))
}

/// Monorepo fixture: a solution-style root tsconfig with no own files,
/// referencing two packages; package tsconfigs own their sources.
fn monorepo(root: &Path) {
    write(
        &root.join("tsconfig.json"),
        r#"{
            "files": [],
            "references": [{ "path": "packages/app" }, { "path": "packages/lib" }],
        }"#,
    );
    write(
        &root.join("packages/app/tsconfig.json"),
        r#"{ "include": ["src"], "references": [{ "path": "../lib" }] }"#,
    );
    write(&root.join("packages/app/src/main.ts"), "export {}");
    write(
        &root.join("packages/lib/tsconfig.json"),
        r#"{ "include": ["src"] }"#,
    );
    write(&root.join("packages/lib/src/util.ts"), "export {}");
}

#[test]
fn resolves_through_project_references_from_the_root_seed() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    monorepo(&root);

    let cache = new_cache();
    cache.initialize_with(vec![root.join("tsconfig.json")], TsConfigOrigin::Explicit);
    cache.set_active_origin(TsConfigOrigin::Explicit);

    let config = cache.resolve(&root.join("packages/lib/src/util.ts")).unwrap();
    assert_eq!(config.path, root.join("packages/lib/tsconfig.json"));

    let config = cache.resolve(&root.join("packages/app/src/main.ts")).unwrap();
    assert_eq!(config.path, root.join("packages/app/tsconfig.json"));

    // A file no config owns resolves to nothing, repeatedly
    assert!(cache.resolve(&root.join("scripts/build.ts")).is_none());
    assert!(cache.resolve(&root.join("scripts/build.ts")).is_none());
}

#[test]
fn lookup_seeded_cache_resolves_package_files() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    monorepo(&root);

    let settings = Settings::default();
    let (origin, seeds) = provider::choose_seeds(&settings, &root).unwrap();
    assert_eq!(origin, TsConfigOrigin::Discovered);
    assert_eq!(seeds.len(), 3);

    let cache = new_cache();
    cache.initialize_with(seeds, origin);
    cache.set_active_origin(origin);

    let config = cache.resolve(&root.join("packages/app/src/main.ts")).unwrap();
    assert_eq!(config.path, root.join("packages/app/tsconfig.json"));
}

#[test]
fn fallback_covers_workspaces_without_any_tsconfig() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write(&root.join("src/index.ts"), "export {}");

    let settings = Settings::default();
    let (origin, seeds) = provider::choose_seeds(&settings, &root).unwrap();
    assert_eq!(origin, TsConfigOrigin::Fallback);

    let cache = new_cache();
    cache.initialize_with(seeds.clone(), origin);
    cache.set_active_origin(origin);

    let config = cache.resolve(&root.join("src/index.ts")).unwrap();
    assert_eq!(config.path, seeds[0]);

    // Fallback seeds exactly once, even with a different list later
    cache.initialize_with(vec![root.join("other.json")], TsConfigOrigin::Fallback);
    assert_eq!(
        cache.cached_seed_configs(TsConfigOrigin::Fallback),
        Some(seeds)
    );
}

#[test]
fn editing_a_tsconfig_is_picked_up_after_the_change_event() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write(
        &root.join("tsconfig.json"),
        r#"{ "files": ["src/a.ts"] }"#,
    );
    write(&root.join("src/a.ts"), "export {}");
    write(&root.join("src/b.ts"), "export {}");

    let cache = new_cache();
    cache.initialize_with(vec![root.join("tsconfig.json")], TsConfigOrigin::Discovered);
    cache.set_active_origin(TsConfigOrigin::Discovered);

    assert!(cache.resolve(&root.join("src/a.ts")).is_some());
    assert!(cache.resolve(&root.join("src/b.ts")).is_none());

    // The config grows a file; the discovered scope must be fully re-seeded
    write(
        &root.join("tsconfig.json"),
        r#"{ "files": ["src/a.ts", "src/b.ts"] }"#,
    );
    cache.on_file_change(&FileEvent {
        path: root.join("tsconfig.json"),
        kind: FileEventKind::Modified,
    });

    assert_eq!(cache.cached_seed_configs(TsConfigOrigin::Discovered), None);
    cache.initialize_with(vec![root.join("tsconfig.json")], TsConfigOrigin::Discovered);
    assert!(cache.resolve(&root.join("src/b.ts")).is_some());
}

#[test]
fn creating_a_source_file_invalidates_stale_negative_answers() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write(&root.join("tsconfig.json"), r#"{ "include": ["src"] }"#);
    write(&root.join("src/a.ts"), "export {}");

    let cache = new_cache();
    cache.initialize_with(vec![root.join("tsconfig.json")], TsConfigOrigin::Explicit);
    cache.set_active_origin(TsConfigOrigin::Explicit);

    let fresh = root.join("src/fresh.ts");
    assert!(cache.resolve(&fresh).is_none(), "not on disk yet");

    write(&fresh, "export {}");
    cache.on_file_change(&FileEvent {
        path: fresh.clone(),
        kind: FileEventKind::Created,
    });

    let config = cache.resolve(&fresh).unwrap();
    assert_eq!(config.path, root.join("tsconfig.json"));
}

#[test]
fn malformed_config_does_not_break_resolution_for_others() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    // The malformed config sits in a deeper ancestor directory, so the
    // search tries (and skips) it before reaching the good root config
    write(&root.join("tsconfig.json"), r#"{ "include": ["pkg/src"] }"#);
    write(&root.join("pkg/tsconfig.json"), "{ this is not json");
    write(&root.join("pkg/src/a.ts"), "export {}");

    let cache = new_cache();
    cache.initialize_with(
        vec![root.join("tsconfig.json"), root.join("pkg/tsconfig.json")],
        TsConfigOrigin::Explicit,
    );
    cache.set_active_origin(TsConfigOrigin::Explicit);

    let config = cache.resolve(&root.join("pkg/src/a.ts")).unwrap();
    assert_eq!(config.path, root.join("tsconfig.json"));
}
