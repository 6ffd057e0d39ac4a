//! Execution thread for nds-emu
//!
//! This crate runs the engine on a dedicated thread and provides the
//! control surface used by UI, presenter and settings code.

pub mod cheats;
pub mod frame;
pub mod gate;
pub mod notifier;
pub mod slot;
pub mod thread;
pub mod workdir;

pub use cheats::CheatEditor;
pub use frame::{FrameCounter, FrameLock, RateWindow};
pub use gate::PauseGate;
pub use notifier::{event_channel, LifecycleNotifier, LoadEvent};
pub use slot::{ConfigChange, PendingChanges, PendingSlot};
pub use thread::{
    EmulatorHandle, EmulatorJoinHandle, EmulatorThread, ExecutionState, TickOutcome,
};
pub use workdir::WorkingDirs;
