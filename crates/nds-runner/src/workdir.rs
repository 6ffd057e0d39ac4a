//! Working directory layout
//!
//! ```text
//! <root>/
//!   Temp/      extracted ROM images (purged at startup)
//!   States/    save states
//!   Battery/   battery saves
//!   Cheats/    cheat lists
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const TEMP_DIR: &str = "Temp";
pub const STATES_DIR: &str = "States";
pub const BATTERY_DIR: &str = "Battery";
pub const CHEATS_DIR: &str = "Cheats";

/// Resolved working directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDirs {
    pub root: PathBuf,
    pub temp: PathBuf,
    pub states: PathBuf,
    pub battery: PathBuf,
    pub cheats: PathBuf,
}

impl WorkingDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            temp: root.join(TEMP_DIR),
            states: root.join(STATES_DIR),
            battery: root.join(BATTERY_DIR),
            cheats: root.join(CHEATS_DIR),
            root,
        }
    }

    /// Create the root and all subdirectories. Existing ones are left alone.
    pub fn create(&self) -> io::Result<()> {
        for dir in [&self.root, &self.temp, &self.states, &self.battery, &self.cheats] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Delete ROM images left in the temp directory by a previous run.
    ///
    /// A crashed run may have left a half-extracted image behind, so nothing
    /// in there is ever reused. Returns how many files were removed.
    pub fn purge_stale_roms(&self, extension: &str) -> io::Result<usize> {
        purge_with_extension(&self.temp, extension)
    }
}

fn purge_with_extension(dir: &Path, extension: &str) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            fs::remove_file(&path)?;
            tracing::debug!("Removed stale ROM image {}", path.display());
            removed += 1;
        }
    }
    Ok(removed)
}
