//! Configuration module for tier-backup
//!
//! This module handles loading, validating, and resolving configuration from
//! TOML files. The legacy flat `config.json` layout is accepted as well and
//! mapped onto the same structure.
//!
//! ## Method selection
//!
//! Exactly one entry under `[methods]` must be enabled. The selected method's
//! `command` template falls back to the method's built-in default.
//!
//! ## Example Usage
//!
//! ```no_run
//! use tier_backup::config;
//!
//! let config = config::load_config("tier-backup.toml")?;
//! let resolved = config::resolve_config(&config)?;
//!
//! println!("Backing up {:?} with {}", resolved.source, resolved.method);
//! # Ok::<(), config::ConfigError>(())
//! ```

mod loader;
mod types;

pub use loader::{
    load_config, resolve_config, selected_method, ConfigError, Result, MAX_REUSE_WINDOW_SECONDS,
};
pub use types::*;

/// Expand tilde (~) in path
pub fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
