//! tscope: which tsconfig governs this file?
//!
//! A resolution cache for JS/TS static analysis. Seeds come from settings,
//! workspace lookup, or a generated fallback; lookups run a memoized graph
//! search over tsconfig project references; filesystem events invalidate
//! exactly as much cached state as they have to.

pub mod config;
pub mod error;
pub mod tsconfig;
pub mod watcher;

// Explicit exports for better API clarity
pub use config::Settings;
pub use error::{TsConfigError, TsConfigResult};
pub use tsconfig::cache::TsConfigCache;
pub use tsconfig::events::{FileEvent, FileEventKind};
pub use tsconfig::loader::{FsLoader, TsConfigLoader};
pub use tsconfig::{TsConfigFile, TsConfigOrigin};
pub use watcher::WorkspaceWatcher;
