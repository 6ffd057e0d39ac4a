//! Configuration system for nds-emu
//!
//! The only setting the execution thread reads directly is the working
//! directory; the emulation modes are seeded into the pending-change slots
//! when the thread is spawned.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application directory name used under the platform data/config dirs
pub const APP_DIR_NAME: &str = "nds-emu";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathConfig,
    pub emulation: EmulationConfig,
    pub debug: DebugConfig,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Root of the working tree (temp, states, battery saves, cheats)
    pub working_dir: PathBuf,
}

/// Emulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulationConfig {
    pub renderer_3d: Renderer3D,
    pub sound_core: SoundCore,
    pub cpu_mode: CpuMode,
    pub sound_sync_mode: SoundSyncMode,
}

/// 3D rasterizer selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum Renderer3D {
    Null,
    #[default]
    SoftRasterizer,
    OpenGl,
}

/// Sound output core
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum SoundCore {
    Null,
    #[default]
    Native,
}

/// ARM CPU emulation mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum CpuMode {
    Interpreter,
    #[default]
    Jit,
}

/// Audio synchronization mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum SoundSyncMode {
    #[default]
    DualSynchAsynch,
    Synchronous,
}

/// Debug settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
}

/// Logging level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
        }
    }
}

impl Default for EmulationConfig {
    fn default() -> Self {
        Self {
            renderer_3d: Renderer3D::default(),
            sound_core: SoundCore::default(),
            cpu_mode: CpuMode::default(),
            sound_sync_mode: SoundSyncMode::default(),
        }
    }
}

/// Default working directory: `<data dir>/nds-emu`, or `./nds-emu` when the
/// platform has no data directory.
pub fn default_working_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

impl Config {
    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join("config.toml")
    }

    /// Working directory setting, falling back to the default location when
    /// the stored value is empty
    pub fn working_dir(&self) -> PathBuf {
        if self.paths.working_dir.as_os_str().is_empty() {
            default_working_dir()
        } else {
            self.paths.working_dir.clone()
        }
    }
}
