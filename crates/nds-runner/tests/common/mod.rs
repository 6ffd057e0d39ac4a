//! Scripted engine shared by the integration tests

#![allow(dead_code)]

use nds_core::config::{CpuMode, Renderer3D, SoundCore, SoundSyncMode};
use nds_core::null_engine::MemoryCheatStore;
use nds_core::{AudioControl, CheatStore, Config, Engine, EngineError, FrameBuffer};
use nds_runner::ExecutionState;
use nds_runner::EmulatorHandle;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Everything the engine was asked to do, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Initialize,
    SetWorkingDirectories(PathBuf, PathBuf),
    LoadRom(PathBuf),
    CloseRom,
    Step,
    SetRenderer3D(Renderer3D),
    SetSoundCore(SoundCore),
    SetCpuMode(CpuMode),
    SetSoundSyncMode(SoundSyncMode),
    AudioMuted(bool),
    MicMuted(bool),
}

/// Script and call log shared between a test and its engine
#[derive(Debug)]
pub struct MockState {
    pub calls: Vec<Call>,
    /// Result of every `load_rom`
    pub accept_roms: bool,
    /// Whether `initialize` actually leaves the engine initialized
    pub init_sticks: bool,
    /// Length of the next fast-forward burst, consumed by the next step
    pub fast_forward_burst: u64,
    /// File whose existence is sampled on each `load_rom`
    pub watch: Option<PathBuf>,
    pub watch_existed_at_load: Vec<bool>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            accept_roms: true,
            init_sticks: true,
            fast_forward_burst: 0,
            watch: None,
            watch_existed_at_load: Vec::new(),
        }
    }
}

pub type SharedMock = Arc<Mutex<MockState>>;

struct MockAudio {
    state: SharedMock,
}

impl AudioControl for MockAudio {
    fn set_audio_muted(&self, muted: bool) {
        self.state.lock().calls.push(Call::AudioMuted(muted));
    }

    fn set_mic_muted(&self, muted: bool) {
        self.state.lock().calls.push(Call::MicMuted(muted));
    }
}

pub struct MockEngine {
    state: SharedMock,
    initialized: bool,
    burst_remaining: u64,
    steps: u32,
    audio: Arc<MockAudio>,
    cheats: Arc<MemoryCheatStore>,
}

impl MockEngine {
    pub fn new() -> (Self, SharedMock) {
        let state = Arc::new(Mutex::new(MockState::default()));
        let engine = Self {
            state: Arc::clone(&state),
            initialized: false,
            burst_remaining: 0,
            steps: 0,
            audio: Arc::new(MockAudio {
                state: Arc::clone(&state),
            }),
            cheats: Arc::new(MemoryCheatStore::new()),
        };
        (engine, state)
    }

    fn record(&self, call: Call) {
        self.state.lock().calls.push(call);
    }
}

impl Engine for MockEngine {
    fn initialize(&mut self) -> Result<(), EngineError> {
        self.record(Call::Initialize);
        self.initialized = self.state.lock().init_sticks;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn set_working_directories(&mut self, primary: &Path, temp: &Path) {
        self.record(Call::SetWorkingDirectories(
            primary.to_path_buf(),
            temp.to_path_buf(),
        ));
    }

    fn load_rom(&mut self, path: &Path) -> bool {
        let mut state = self.state.lock();
        state.calls.push(Call::LoadRom(path.to_path_buf()));
        if let Some(watch) = state.watch.clone() {
            state.watch_existed_at_load.push(watch.exists());
        }
        state.accept_roms
    }

    fn close_rom(&mut self) {
        self.record(Call::CloseRom);
    }

    fn step(&mut self, frame: &mut FrameBuffer) {
        if self.burst_remaining == 0 {
            self.burst_remaining = std::mem::take(&mut self.state.lock().fast_forward_burst);
        }
        self.burst_remaining = self.burst_remaining.saturating_sub(1);
        self.steps += 1;
        // Whole-frame write so a torn read would show mixed values
        frame.pixels.fill(self.steps);
        self.record(Call::Step);
    }

    fn is_fast_forwarding(&self) -> bool {
        self.burst_remaining > 0
    }

    fn set_renderer_3d(&mut self, mode: Renderer3D) {
        self.record(Call::SetRenderer3D(mode));
    }

    fn set_sound_core(&mut self, core: SoundCore) {
        self.record(Call::SetSoundCore(core));
    }

    fn set_cpu_mode(&mut self, mode: CpuMode) {
        self.record(Call::SetCpuMode(mode));
    }

    fn set_sound_sync_mode(&mut self, mode: SoundSyncMode) {
        self.record(Call::SetSoundSyncMode(mode));
    }

    fn audio_control(&self) -> Arc<dyn AudioControl> {
        self.audio.clone()
    }

    fn cheat_store(&self) -> Arc<dyn CheatStore> {
        self.cheats.clone()
    }
}

/// Route engine/thread logs through the test harness; honors `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Config rooted in a fresh temp dir
pub fn test_config() -> (Config, TempDir) {
    init_tracing();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = Config::default();
    config.paths.working_dir = temp_dir.path().join("work");
    (config, temp_dir)
}

/// Poll `condition` until it holds, failing the test after five seconds
pub fn wait_until<F: FnMut() -> bool>(what: &str, mut condition: F) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        std::thread::sleep(Duration::from_millis(1));
    }
}

pub fn wait_for_state(handle: &EmulatorHandle, state: ExecutionState) {
    wait_until(&format!("{:?}", state), || handle.state() == state);
}

/// Calls recorded after the first `from` entries
pub fn calls_since(state: &SharedMock, from: usize) -> Vec<Call> {
    state.lock().calls[from..].to_vec()
}

pub fn call_count(state: &SharedMock) -> usize {
    state.lock().calls.len()
}
