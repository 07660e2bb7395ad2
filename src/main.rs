//! CLI entry point for tscope.
//!
//! Provides commands for resolving files to their governing tsconfig,
//! inspecting seed configs, and watching a workspace in a long-lived
//! session.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use tscope::tsconfig::provider;
use tscope::{FsLoader, Settings, TsConfigCache, TsConfigOrigin, WorkspaceWatcher};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

#[derive(Parser)]
#[command(name = "tscope", version, about = "tsconfig project resolution cache", styles = clap_cargo_style())]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up the .tscope directory with default settings
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
    /// Resolve source files to their governing tsconfig
    Resolve {
        /// Files to resolve
        files: Vec<PathBuf>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show each origin's seed tsconfig list
    Seeds,
    /// Watch the workspace and resolve files read from stdin, one per line
    Watch,
}

#[derive(Debug, Serialize)]
struct ResolveOutcome {
    file: PathBuf,
    tsconfig: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    let root = settings
        .workspace_root
        .clone()
        .unwrap_or(std::env::current_dir()?);

    match cli.command {
        Commands::Init { force } => init(&root, force),
        Commands::Resolve { files, json } => {
            let cache = seeded_cache(&settings, &root)?;
            resolve_files(&cache, &root, &files, json);
            Ok(())
        }
        Commands::Seeds => {
            let cache = seeded_cache(&settings, &root)?;
            for origin in TsConfigOrigin::ALL {
                match cache.cached_seed_configs(origin) {
                    Some(seeds) => {
                        println!("{origin:?}: {} seed(s)", seeds.len());
                        for seed in seeds {
                            println!("  {}", seed.display());
                        }
                    }
                    None => println!("{origin:?}: not initialized"),
                }
            }
            Ok(())
        }
        Commands::Watch => watch(&settings, &root).await,
    }
}

fn init(root: &Path, force: bool) -> anyhow::Result<()> {
    let settings_path = root.join(".tscope/settings.toml");
    if settings_path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            settings_path.display()
        );
    }
    Settings::default()
        .save(&settings_path)
        .map_err(|e| anyhow::anyhow!("failed to write settings: {e}"))?;
    println!("Created {}", settings_path.display());
    Ok(())
}

/// Build a cache seeded per the provider priority and activate the winning origin
fn seeded_cache(settings: &Settings, root: &Path) -> anyhow::Result<Arc<TsConfigCache>> {
    let loader = Arc::new(FsLoader::new(settings.analysis.extensions.clone()));
    let cache = Arc::new(TsConfigCache::new(
        loader,
        settings.analysis.extensions.clone(),
    ));
    let (origin, seeds) = provider::choose_seeds(settings, root)?;
    cache.initialize_with(seeds, origin);
    cache.set_active_origin(origin);
    Ok(cache)
}

fn resolve_files(cache: &TsConfigCache, root: &Path, files: &[PathBuf], json: bool) {
    for file in files {
        let absolute = if file.is_absolute() {
            file.clone()
        } else {
            root.join(file)
        };
        let tsconfig = cache.resolve(&absolute).map(|c| c.path.clone());
        if json {
            let outcome = ResolveOutcome {
                file: absolute,
                tsconfig,
            };
            match serde_json::to_string(&outcome) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("Failed to serialize outcome: {e}"),
            }
        } else {
            match tsconfig {
                Some(path) => println!("{} -> {}", absolute.display(), path.display()),
                None => println!("{} -> (no tsconfig)", absolute.display()),
            }
        }
    }
}

async fn watch(settings: &Settings, root: &Path) -> anyhow::Result<()> {
    let cache = seeded_cache(settings, root)?;

    if settings.file_watch.enabled {
        let watcher = WorkspaceWatcher::new(
            Arc::clone(&cache),
            root,
            settings.file_watch.debounce_ms,
        )?;
        tokio::spawn(async move {
            if let Err(e) = watcher.watch().await {
                eprintln!("File watcher stopped: {e}");
            }
        });
    }

    eprintln!("Reading file paths from stdin, one per line. Ctrl+D to stop.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        resolve_files(&cache, root, &[PathBuf::from(trimmed)], false);
    }

    Ok(())
}
