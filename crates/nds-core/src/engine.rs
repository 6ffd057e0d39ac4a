//! Native engine interface
//!
//! The execution thread owns exactly one [`Engine`] and is the only caller of
//! its `&mut self` methods. The two side channels that other threads need
//! (muting audio from a pause request, and editing the cheat list from the
//! UI) are exposed as separate `Send + Sync` handles so the engine itself
//! never has to be shared.

use crate::config::{CpuMode, Renderer3D, SoundCore, SoundSyncMode};
use crate::error::{CheatError, EngineError};
use std::path::Path;
use std::sync::Arc;

/// Width of one screen in pixels
pub const SCREEN_WIDTH: usize = 256;
/// Height of one screen in pixels
pub const SCREEN_HEIGHT: usize = 192;
/// Both screens stacked vertically
pub const FRAME_HEIGHT: usize = SCREEN_HEIGHT * 2;

/// Extension of ROM images staged in the temp directory
pub const ROM_ARCHIVE_EXTENSION: &str = "nds";

/// Frame memory written by the engine and read by the presenter
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    /// RGBA8888 pixels, top screen first
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![0; SCREEN_WIDTH * FRAME_HEIGHT],
        }
    }

    /// Pixels of the top screen
    pub fn top_screen(&self) -> &[u32] {
        &self.pixels[..SCREEN_WIDTH * SCREEN_HEIGHT]
    }

    /// Pixels of the bottom (touch) screen
    pub fn bottom_screen(&self) -> &[u32] {
        &self.pixels[SCREEN_WIDTH * SCREEN_HEIGHT..]
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Stateful emulation core driven by the execution thread
pub trait Engine: Send {
    /// One-time engine setup. Must succeed before any other call below.
    fn initialize(&mut self) -> Result<(), EngineError>;

    fn is_initialized(&self) -> bool;

    /// Tell the engine where saves live and where archives get extracted.
    fn set_working_directories(&mut self, primary: &Path, temp: &Path);

    /// File extension of extracted ROM images left in the temp directory
    fn rom_archive_extension(&self) -> &str {
        ROM_ARCHIVE_EXTENSION
    }

    /// Load a ROM, returning whether the engine accepted it
    fn load_rom(&mut self, path: &Path) -> bool;

    fn close_rom(&mut self);

    /// Emulate one frame, writing video output into `frame`
    fn step(&mut self, frame: &mut FrameBuffer);

    /// Whether the next frame should run immediately without presenting
    fn is_fast_forwarding(&self) -> bool;

    fn set_renderer_3d(&mut self, mode: Renderer3D);

    fn set_sound_core(&mut self, core: SoundCore);

    fn set_cpu_mode(&mut self, mode: CpuMode);

    fn set_sound_sync_mode(&mut self, mode: SoundSyncMode);

    /// Handle used to mute audio output and microphone input from any thread
    fn audio_control(&self) -> Arc<dyn AudioControl>;

    /// Handle to the engine's cheat list
    fn cheat_store(&self) -> Arc<dyn CheatStore>;
}

/// Audio and microphone gates inside the engine
pub trait AudioControl: Send + Sync {
    fn set_audio_muted(&self, muted: bool);

    fn set_mic_muted(&self, muted: bool);
}

/// Kind of cheat stored by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheatKind {
    /// Raw memory patch
    Internal,
    /// Action Replay code
    ActionReplay,
    /// Codebreaker code
    Codebreaker,
}

impl std::fmt::Display for CheatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Internal => write!(f, "internal"),
            Self::ActionReplay => write!(f, "action replay"),
            Self::Codebreaker => write!(f, "codebreaker"),
        }
    }
}

/// One entry of the engine's cheat list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cheat {
    pub description: String,
    pub code: String,
    pub kind: CheatKind,
    pub enabled: bool,
}

/// Cheat list storage owned by the engine
///
/// Indices are positions in the current list; deleting shifts later entries
/// down by one. Out-of-range indices are the caller's problem.
pub trait CheatStore: Send + Sync {
    fn count(&self) -> usize;

    fn get(&self, index: usize) -> Option<Cheat>;

    /// Append a new, enabled Action Replay cheat
    fn add(&self, description: &str, code: &str);

    fn update(&self, index: usize, description: &str, code: &str);

    fn delete(&self, index: usize);

    fn set_enabled(&self, index: usize, enabled: bool);

    /// Write the list to the engine's cheat file for the loaded ROM
    fn persist(&self) -> Result<(), CheatError>;
}
