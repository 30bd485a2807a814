//! # Paths Module
//!
//! Every location the deploy touches is fixed; this module is where they are
//! spelled out and resolved against the current user's data directory
//! (`~/Library/Application Support` on macOS, `~/.local/share` on Linux).
//!
//! ```text
//! ../scootys-armor-swap/                       source working tree
//! <data>/factorio/mods/                        mods folder (opened at the end)
//! <data>/factorio/mods/scootys-armor-swap/     destination
//! <data>/factorio/mods/scootys-armor-swap/logging.lua
//! <data>/factorio/factorio-current.log         the game's live log
//! ```

use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};
use log::debug;
use walkdir::{DirEntry, WalkDir};

pub const MOD_NAME: &str = "scootys-armor-swap";
pub const GAME_DIR: &str = "factorio";
pub const MODS_DIR: &str = "mods";
pub const LOGGING_FILE: &str = "logging.lua";
pub const GAME_LOG_FILE: &str = "factorio-current.log";

/// The resolved set of locations for one deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPaths {
    /// Mod working tree, relative to the working directory.
    pub source: PathBuf,
    /// The game's mods folder.
    pub mods_dir: PathBuf,
    /// Where the mod is mirrored to (inside `mods_dir`).
    pub destination: PathBuf,
    /// File whose build-time token gets stamped.
    pub logging_file: PathBuf,
    /// The game's log, which the user is told to follow.
    pub game_log: PathBuf,
}

impl DeployPaths {
    /// Resolves the standard locations for the current user.
    pub fn resolve() -> Result<Self> {
        let base = directories::BaseDirs::new()
            .ok_or_else(|| anyhow!("Could not determine the home directory"))?;
        let paths = Self::under(Path::new("..").join(MOD_NAME), base.data_dir());
        debug!("Resolved deploy paths: {:?}", paths);
        Ok(paths)
    }

    /// Lays out the locations for `source` against an arbitrary data directory.
    pub fn under(source: PathBuf, data_dir: &Path) -> Self {
        let game_dir = data_dir.join(GAME_DIR);
        let mods_dir = game_dir.join(MODS_DIR);
        let destination = mods_dir.join(MOD_NAME);
        let logging_file = destination.join(LOGGING_FILE);

        Self {
            source,
            mods_dir,
            destination,
            logging_file,
            game_log: game_dir.join(GAME_LOG_FILE),
        }
    }
}

/// True for entries rsync's `--exclude=.*` would skip.
pub fn is_dotfile(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

/// Lists the files a mirror of `source` would carry over, relative to `source`.
///
/// Dot-entries are pruned at every depth, so nothing under a hidden directory
/// is listed either. Unreadable entries are skipped.
pub fn mirrored_files(source: &Path) -> Vec<PathBuf> {
    let walker = WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_dotfile(e));

    let mut files = Vec::new();
    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(source) {
            files.push(rel.to_path_buf());
        }
    }
    files
}
