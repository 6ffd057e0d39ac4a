//! The emulator thread
//!
//! [`EmulatorThread`] owns the engine and runs the tick loop on a dedicated
//! OS thread. Everything else talks to it through an [`EmulatorHandle`]:
//! requests are written into pending slots or atomic flags, and any request
//! that must end a pause-gate wait also notifies the gate.
//!
//! One tick:
//! 1. resolve a pending ROM load (emitting lifecycle events),
//! 2. apply the latest value of each pending configuration kind,
//! 3. if running, step the engine under the frame lock (one step, or a whole
//!    fast-forward burst), then publish the frame,
//! 4. otherwise sleep on the pause gate until signalled.

use crate::cheats::CheatEditor;
use crate::frame::{FrameCounter, FrameLock, RateWindow};
use crate::gate::PauseGate;
use crate::notifier::{LifecycleNotifier, LoadEvent};
use crate::slot::{ConfigChange, PendingChanges};
use crate::workdir::WorkingDirs;
use crossbeam::channel::Sender;
use nds_core::{AudioControl, CheatStore, Config, EmulatorError, Engine, Result};
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

/// Name given to the OS thread
pub const THREAD_NAME: &str = "emulator";

/// Execution state of the emulator thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExecutionState {
    /// Thread created, engine not touched yet
    Uninitialized = 0,
    /// Preparing directories and initializing the engine
    Initializing = 1,
    /// No ROM loaded; waiting for a load request
    Idle = 2,
    /// Stepping the engine
    Running = 3,
    /// Paused by request; waiting on the pause gate
    Paused = 4,
    /// Shutdown observed, releasing the engine
    Stopping = 5,
    /// Thread has exited
    Stopped = 6,
}

impl ExecutionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Initializing,
            2 => Self::Idle,
            3 => Self::Running,
            4 => Self::Paused,
            5 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The engine ran this many steps under one frame-lock hold
    Stepped(u64),
    /// Nothing to run; the thread slept on the pause gate
    Parked,
    /// Shutdown was requested; no work was done
    Stopping,
}

/// Audio mute state plus the engine handle that enforces it
struct AudioState {
    muted: bool,
    /// Engine handles may only be touched once the engine is initialized
    engine_ready: bool,
    control: Arc<dyn AudioControl>,
}

impl AudioState {
    fn apply(&self, muted: bool) {
        self.control.set_audio_muted(muted);
        self.control.set_mic_muted(muted);
    }
}

/// State shared between the emulator thread and its handles
struct Shared {
    pending: PendingChanges,
    paused: AtomicBool,
    stopping: AtomicBool,
    gate: PauseGate,
    frame: FrameLock,
    counter: FrameCounter,
    notifier: LifecycleNotifier,
    /// Written only by the emulator thread
    state: AtomicU8,
    /// Written only by the emulator thread
    rom: RwLock<Option<PathBuf>>,
    audio: Mutex<AudioState>,
    cheats: Arc<dyn CheatStore>,
}

impl Shared {
    fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
        if paused {
            self.mute();
        }
    }

    /// Mute synchronously with the pause request. A second call is a no-op.
    fn mute(&self) {
        let mut audio = self.audio.lock();
        if audio.muted {
            return;
        }
        audio.muted = true;
        if audio.engine_ready {
            audio.apply(true);
        }
    }

    /// Unmute unless a pause slipped in since the caller checked
    fn unmute_if_running(&self) {
        let mut audio = self.audio.lock();
        if audio.muted && audio.engine_ready && !self.paused.load(Ordering::Acquire) {
            audio.muted = false;
            audio.apply(false);
            tracing::trace!("Audio unmuted");
        }
    }

    fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }
}

/// Control surface of a running emulator thread
///
/// Cheap to clone; every method may be called from any thread.
#[derive(Clone)]
pub struct EmulatorHandle {
    shared: Arc<Shared>,
}

impl EmulatorHandle {
    /// Ask the thread to load a ROM. The outcome arrives as [`LoadEvent`]s.
    pub fn request_load(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        tracing::debug!("Load requested: {}", path.display());
        self.shared.pending.rom.set(path);
        self.shared.gate.notify();
    }

    /// Queue a configuration change, applied on the next tick
    pub fn request_config_change(&self, change: ConfigChange) {
        tracing::debug!("Config change requested: {:?}", change);
        self.shared.pending.set(change);
    }

    /// Pause or resume. Pausing mutes audio and microphone before returning.
    pub fn request_pause(&self, paused: bool) {
        self.shared.set_paused(paused);
        if !paused {
            self.shared.gate.notify();
        }
    }

    /// Stop the thread. Irreversible.
    pub fn request_shutdown(&self) {
        tracing::info!("Shutdown requested");
        self.shared.stopping.store(true, Ordering::Release);
        self.shared.gate.notify();
    }

    /// Wake a parked thread without changing anything. It re-reads its
    /// flags, applies queued config changes and parks again if it still has
    /// nothing to run.
    pub fn wake(&self) {
        self.shared.gate.notify();
    }

    pub fn state(&self) -> ExecutionState {
        ExecutionState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    pub fn is_paused(&self) -> bool {
        self.shared.is_paused()
    }

    pub fn is_audio_muted(&self) -> bool {
        self.shared.audio.lock().muted
    }

    /// ROM loaded by the last completed load
    pub fn loaded_rom(&self) -> Option<PathBuf> {
        self.shared.rom.read().clone()
    }

    /// Frames emulated so far
    pub fn frame_count(&self) -> u64 {
        self.shared.counter.frames()
    }

    pub fn fps(&self) -> u32 {
        self.shared.counter.fps()
    }

    /// Lock guarding the frame buffer; presenters must not hold it long
    pub fn frame_lock(&self) -> &FrameLock {
        &self.shared.frame
    }

    /// Whether a frame finished since the last call
    pub fn take_frame_ready(&self) -> bool {
        self.shared.frame.take_ready()
    }

    /// Send future load events to a different UI
    pub fn set_event_sink(&self, sink: Sender<LoadEvent>) {
        self.shared.notifier.set_sink(sink);
    }

    pub fn cheat_editor(&self) -> CheatEditor {
        CheatEditor::new(Arc::clone(&self.shared.cheats))
    }
}

/// Join handle of a spawned emulator thread
pub struct EmulatorJoinHandle {
    inner: JoinHandle<Result<()>>,
}

impl EmulatorJoinHandle {
    /// Wait for the thread to exit and return how it ended
    pub fn join(self) -> Result<()> {
        self.inner.join().map_err(|_| EmulatorError::ThreadPanicked)?
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

/// Tick loop state owned by the emulator thread
pub struct EmulatorThread<E: Engine> {
    engine: E,
    shared: Arc<Shared>,
    working_dir: PathBuf,
    rom_loaded: bool,
    rate: RateWindow,
}

impl<E: Engine> EmulatorThread<E> {
    /// Prepare a thread around `engine`. The configured emulation modes are
    /// queued so the first tick applies them.
    pub fn new(engine: E, config: &Config, events: Sender<LoadEvent>) -> Self {
        let pending = PendingChanges::new();
        pending.seed(&config.emulation);

        let shared = Arc::new(Shared {
            pending,
            paused: AtomicBool::new(false),
            stopping: AtomicBool::new(false),
            gate: PauseGate::new(),
            frame: FrameLock::new(),
            counter: FrameCounter::new(),
            notifier: LifecycleNotifier::new(events),
            state: AtomicU8::new(ExecutionState::Uninitialized as u8),
            rom: RwLock::new(None),
            audio: Mutex::new(AudioState {
                muted: true,
                engine_ready: engine.is_initialized(),
                control: engine.audio_control(),
            }),
            cheats: engine.cheat_store(),
        });

        Self {
            engine,
            shared,
            working_dir: config.working_dir(),
            rom_loaded: false,
            rate: RateWindow::new(Instant::now(), 0),
        }
    }

    pub fn handle(&self) -> EmulatorHandle {
        EmulatorHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn state(&self) -> ExecutionState {
        ExecutionState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Run the tick loop on a new OS thread
    pub fn spawn(self) -> Result<EmulatorJoinHandle>
    where
        E: 'static,
    {
        let inner = std::thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || self.run())?;
        Ok(EmulatorJoinHandle { inner })
    }

    /// Run ticks until shutdown or a fatal error, then release the engine
    pub fn run(mut self) -> Result<()> {
        tracing::info!("Emulator thread started");

        let result = self.run_loop();
        if let Err(err) = &result {
            tracing::error!("Emulator thread aborted: {}", err);
        }

        self.shutdown();
        result
    }

    fn run_loop(&mut self) -> Result<()> {
        loop {
            if self.tick()? == TickOutcome::Stopping {
                return Ok(());
            }
        }
    }

    /// Run one iteration of the loop
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.shared.is_stopping() {
            return Ok(TickOutcome::Stopping);
        }

        if self.state() == ExecutionState::Uninitialized {
            self.initialize()?;
        }

        self.process_pending_load();
        self.apply_config_changes()?;

        if self.rom_loaded && !self.shared.is_paused() {
            let steps = self.run_frame()?;
            Ok(TickOutcome::Stepped(steps))
        } else {
            self.park();
            Ok(TickOutcome::Parked)
        }
    }

    fn set_state(&self, state: ExecutionState) {
        let previous = self.shared.state.swap(state as u8, Ordering::AcqRel);
        if previous != state as u8 {
            tracing::debug!(
                "Emulator state {:?} -> {:?}",
                ExecutionState::from_u8(previous),
                state
            );
        }
    }

    fn require_initialized(&self, operation: &'static str) -> Result<()> {
        if self.engine.is_initialized() {
            Ok(())
        } else {
            Err(EmulatorError::NotInitialized(operation))
        }
    }

    /// First-tick setup: working tree, stale ROM cleanup, engine init
    fn initialize(&mut self) -> Result<()> {
        self.set_state(ExecutionState::Initializing);

        let dirs = WorkingDirs::new(&self.working_dir);
        dirs.create()?;
        let purged = dirs.purge_stale_roms(self.engine.rom_archive_extension())?;
        if purged > 0 {
            tracing::info!("Removed {} stale ROM image(s) from {}", purged, dirs.temp.display());
        }

        self.engine.set_working_directories(&dirs.root, &dirs.temp);
        if !self.engine.is_initialized() {
            self.engine.initialize()?;
        }
        self.require_initialized("initialize")?;

        {
            let mut audio = self.shared.audio.lock();
            audio.engine_ready = true;
            audio.apply(audio.muted);
        }

        tracing::info!("Engine initialized, working directory {}", dirs.root.display());
        self.set_state(ExecutionState::Idle);
        Ok(())
    }

    fn process_pending_load(&mut self) {
        let Some(path) = self.shared.pending.rom.take() else {
            return;
        };

        tracing::info!("Loading ROM: {}", path.display());
        self.shared.notifier.emit(LoadEvent::Started(path.clone()));

        if self.rom_loaded {
            self.engine.close_rom();
            self.rom_loaded = false;
            *self.shared.rom.write() = None;
        }

        if self.engine.load_rom(&path) {
            self.rom_loaded = true;
            *self.shared.rom.write() = Some(path.clone());
            self.shared.set_paused(false);
            self.rate.restart(Instant::now(), self.shared.counter.frames());
            self.shared.notifier.emit(LoadEvent::Ended(path));
            tracing::info!("ROM loaded");
        } else {
            tracing::warn!("Engine rejected ROM: {}", path.display());
            self.shared.notifier.emit(LoadEvent::Ended(path.clone()));
            self.shared.notifier.emit(LoadEvent::Error(path));
        }
    }

    fn apply_config_changes(&mut self) -> Result<()> {
        let pending = &self.shared.pending;

        if let Some(mode) = pending.renderer_3d.take() {
            self.require_initialized("set_renderer_3d")?;
            tracing::debug!("Applying 3D renderer {:?}", mode);
            self.engine.set_renderer_3d(mode);
        }
        if let Some(core) = pending.sound_core.take() {
            self.require_initialized("set_sound_core")?;
            tracing::debug!("Applying sound core {:?}", core);
            self.engine.set_sound_core(core);
        }
        if let Some(mode) = pending.cpu_mode.take() {
            self.require_initialized("set_cpu_mode")?;
            tracing::debug!("Applying CPU mode {:?}", mode);
            self.engine.set_cpu_mode(mode);
        }
        if let Some(mode) = pending.sound_sync_mode.take() {
            self.require_initialized("set_sound_sync_mode")?;
            tracing::debug!("Applying sound sync mode {:?}", mode);
            self.engine.set_sound_sync_mode(mode);
        }
        Ok(())
    }

    /// Step the engine under the frame lock; returns the steps taken
    fn run_frame(&mut self) -> Result<u64> {
        self.require_initialized("step")?;
        self.set_state(ExecutionState::Running);
        self.shared.unmute_if_running();

        let steps = {
            let mut frame = self.shared.frame.lock();
            let mut steps = 0;
            loop {
                self.engine.step(&mut frame);
                steps += 1;
                if !self.engine.is_fast_forwarding() {
                    break;
                }
            }
            steps
        };

        self.shared.frame.mark_ready();
        let total = self.shared.counter.advance(steps);
        if let Some(fps) = self.rate.sample(Instant::now(), total) {
            self.shared.counter.set_fps(fps);
        }
        tracing::trace!("Frame done: {} step(s), {} total", steps, total);
        Ok(steps)
    }

    /// Sleep on the pause gate until something could change what we do
    fn park(&self) {
        let state = if self.shared.is_paused() {
            ExecutionState::Paused
        } else {
            ExecutionState::Idle
        };
        self.set_state(state);

        let shared = &self.shared;
        let rom_loaded = self.rom_loaded;
        shared.gate.wait_unless(|| {
            shared.is_stopping()
                || shared.pending.rom.is_pending()
                || (rom_loaded && !shared.is_paused())
        });
    }

    fn shutdown(&mut self) {
        self.set_state(ExecutionState::Stopping);
        self.shared.stopping.store(true, Ordering::Release);

        if self.rom_loaded {
            self.engine.close_rom();
            self.rom_loaded = false;
            *self.shared.rom.write() = None;
        }

        self.set_state(ExecutionState::Stopped);
        tracing::info!(
            "Emulator thread stopped after {} frames",
            self.shared.counter.frames()
        );
    }
}
