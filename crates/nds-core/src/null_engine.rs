//! Null engine
//!
//! Accepts any existing file as a ROM and renders a scrolling test pattern.
//! Used by the headless front end and by tests that need a real engine with
//! no native core behind it.

use crate::config::{CpuMode, Renderer3D, SoundCore, SoundSyncMode};
use crate::engine::{
    AudioControl, Cheat, CheatKind, CheatStore, Engine, FrameBuffer, SCREEN_WIDTH,
};
use crate::error::{CheatError, EngineError};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Mute flags of the null engine
#[derive(Debug, Default)]
pub struct NullAudio {
    audio_muted: AtomicBool,
    mic_muted: AtomicBool,
}

impl NullAudio {
    pub fn is_audio_muted(&self) -> bool {
        self.audio_muted.load(Ordering::Acquire)
    }

    pub fn is_mic_muted(&self) -> bool {
        self.mic_muted.load(Ordering::Acquire)
    }
}

impl AudioControl for NullAudio {
    fn set_audio_muted(&self, muted: bool) {
        self.audio_muted.store(muted, Ordering::Release);
    }

    fn set_mic_muted(&self, muted: bool) {
        self.mic_muted.store(muted, Ordering::Release);
    }
}

/// In-memory cheat list
#[derive(Debug, Default)]
pub struct MemoryCheatStore {
    cheats: Mutex<Vec<Cheat>>,
    persisted: Mutex<Vec<Cheat>>,
}

impl MemoryCheatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cheat of any kind, bypassing the Action Replay default of `add`
    pub fn push(&self, cheat: Cheat) {
        self.cheats.lock().push(cheat);
    }

    /// Snapshot of the list as of the last `persist`
    pub fn persisted(&self) -> Vec<Cheat> {
        self.persisted.lock().clone()
    }
}

impl CheatStore for MemoryCheatStore {
    fn count(&self) -> usize {
        self.cheats.lock().len()
    }

    fn get(&self, index: usize) -> Option<Cheat> {
        self.cheats.lock().get(index).cloned()
    }

    fn add(&self, description: &str, code: &str) {
        self.cheats.lock().push(Cheat {
            description: description.to_string(),
            code: code.to_string(),
            kind: CheatKind::ActionReplay,
            enabled: true,
        });
    }

    fn update(&self, index: usize, description: &str, code: &str) {
        if let Some(cheat) = self.cheats.lock().get_mut(index) {
            cheat.description = description.to_string();
            cheat.code = code.to_string();
        }
    }

    fn delete(&self, index: usize) {
        let mut cheats = self.cheats.lock();
        if index < cheats.len() {
            cheats.remove(index);
        }
    }

    fn set_enabled(&self, index: usize, enabled: bool) {
        if let Some(cheat) = self.cheats.lock().get_mut(index) {
            cheat.enabled = enabled;
        }
    }

    fn persist(&self) -> Result<(), CheatError> {
        *self.persisted.lock() = self.cheats.lock().clone();
        Ok(())
    }
}

/// Engine that produces a test pattern
pub struct NullEngine {
    initialized: bool,
    rom: Option<PathBuf>,
    frame: u64,
    audio: Arc<NullAudio>,
    cheats: Arc<MemoryCheatStore>,
}

impl NullEngine {
    pub fn new() -> Self {
        Self {
            initialized: false,
            rom: None,
            frame: 0,
            audio: Arc::new(NullAudio::default()),
            cheats: Arc::new(MemoryCheatStore::new()),
        }
    }

    /// Currently loaded ROM
    pub fn rom(&self) -> Option<&Path> {
        self.rom.as_deref()
    }

    /// Frames emulated since creation
    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Concrete audio handle, for inspecting mute state
    pub fn audio(&self) -> Arc<NullAudio> {
        Arc::clone(&self.audio)
    }
}

impl Default for NullEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for NullEngine {
    fn initialize(&mut self) -> Result<(), EngineError> {
        self.initialized = true;
        tracing::info!("Null engine initialized (test pattern only)");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn set_working_directories(&mut self, primary: &Path, temp: &Path) {
        tracing::debug!(
            "Null engine working dirs: primary={}, temp={}",
            primary.display(),
            temp.display()
        );
    }

    fn load_rom(&mut self, path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }
        self.rom = Some(path.to_path_buf());
        self.frame = 0;
        true
    }

    fn close_rom(&mut self) {
        self.rom = None;
    }

    fn step(&mut self, frame: &mut FrameBuffer) {
        let shift = (self.frame % SCREEN_WIDTH as u64) as usize;
        for (i, pixel) in frame.pixels.iter_mut().enumerate() {
            let x = (i % SCREEN_WIDTH + shift) % SCREEN_WIDTH;
            let y = i / SCREEN_WIDTH;
            *pixel = 0xFF00_0000 | ((x as u32) << 16) | ((y as u32 & 0xFF) << 8);
        }
        self.frame += 1;
    }

    fn is_fast_forwarding(&self) -> bool {
        false
    }

    fn set_renderer_3d(&mut self, mode: Renderer3D) {
        tracing::debug!("Null engine 3D renderer: {:?}", mode);
    }

    fn set_sound_core(&mut self, core: SoundCore) {
        tracing::debug!("Null engine sound core: {:?}", core);
    }

    fn set_cpu_mode(&mut self, mode: CpuMode) {
        tracing::debug!("Null engine CPU mode: {:?}", mode);
    }

    fn set_sound_sync_mode(&mut self, mode: SoundSyncMode) {
        tracing::debug!("Null engine sound sync mode: {:?}", mode);
    }

    fn audio_control(&self) -> Arc<dyn AudioControl> {
        self.audio.clone()
    }

    fn cheat_store(&self) -> Arc<dyn CheatStore> {
        self.cheats.clone()
    }
}
