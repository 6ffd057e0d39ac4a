//! Single-value mailboxes for cross-thread configuration handoff
//!
//! Each slot holds at most one pending value. Writers overwrite, the
//! execution thread takes. Values written between two ticks collapse to the
//! last one, which is fine because every kind is an absolute setting.

use nds_core::config::{CpuMode, EmulationConfig, Renderer3D, SoundCore, SoundSyncMode};
use parking_lot::Mutex;
use std::path::PathBuf;

/// Last-write-wins mailbox
#[derive(Debug)]
pub struct PendingSlot<T> {
    value: Mutex<Option<T>>,
}

impl<T> PendingSlot<T> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    /// Store `value`, discarding anything not yet taken
    pub fn set(&self, value: T) {
        *self.value.lock() = Some(value);
    }

    /// Remove and return the pending value
    pub fn take(&self) -> Option<T> {
        self.value.lock().take()
    }

    pub fn is_pending(&self) -> bool {
        self.value.lock().is_some()
    }
}

impl<T> Default for PendingSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A configuration change requested by a control thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    Renderer3D(Renderer3D),
    SoundCore(SoundCore),
    CpuMode(CpuMode),
    SoundSyncMode(SoundSyncMode),
}

/// All pending requests, one slot per kind
#[derive(Debug, Default)]
pub struct PendingChanges {
    pub rom: PendingSlot<PathBuf>,
    pub renderer_3d: PendingSlot<Renderer3D>,
    pub sound_core: PendingSlot<SoundCore>,
    pub cpu_mode: PendingSlot<CpuMode>,
    pub sound_sync_mode: PendingSlot<SoundSyncMode>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a change into the slot for its kind
    pub fn set(&self, change: ConfigChange) {
        match change {
            ConfigChange::Renderer3D(mode) => self.renderer_3d.set(mode),
            ConfigChange::SoundCore(core) => self.sound_core.set(core),
            ConfigChange::CpuMode(mode) => self.cpu_mode.set(mode),
            ConfigChange::SoundSyncMode(mode) => self.sound_sync_mode.set(mode),
        }
    }

    /// Queue every mode from a configuration, as done once at spawn
    pub fn seed(&self, config: &EmulationConfig) {
        self.renderer_3d.set(config.renderer_3d);
        self.sound_core.set(config.sound_core);
        self.cpu_mode.set(config.cpu_mode);
        self.sound_sync_mode.set(config.sound_sync_mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_slot_last_write_wins() {
        let slot = PendingSlot::new();
        assert_eq!(slot.take(), None);

        slot.set(1);
        slot.set(2);
        slot.set(3);
        assert!(slot.is_pending());
        assert_eq!(slot.take(), Some(3));
        assert_eq!(slot.take(), None);
        assert!(!slot.is_pending());
    }

    #[test]
    fn test_change_routing() {
        let pending = PendingChanges::new();
        pending.set(ConfigChange::CpuMode(CpuMode::Interpreter));
        pending.set(ConfigChange::SoundSyncMode(SoundSyncMode::Synchronous));

        assert_eq!(pending.cpu_mode.take(), Some(CpuMode::Interpreter));
        assert_eq!(pending.sound_sync_mode.take(), Some(SoundSyncMode::Synchronous));
        assert_eq!(pending.renderer_3d.take(), None);
        assert_eq!(pending.sound_core.take(), None);
    }

    #[test]
    fn test_seed_fills_every_mode() {
        let pending = PendingChanges::new();
        pending.seed(&EmulationConfig::default());

        assert_eq!(pending.renderer_3d.take(), Some(Renderer3D::SoftRasterizer));
        assert_eq!(pending.sound_core.take(), Some(SoundCore::Native));
        assert_eq!(pending.cpu_mode.take(), Some(CpuMode::Jit));
        assert_eq!(pending.sound_sync_mode.take(), Some(SoundSyncMode::DualSynchAsynch));
        assert!(!pending.rom.is_pending());
    }

    #[test]
    fn test_concurrent_writers_leave_one_value() {
        let slot = Arc::new(PendingSlot::new());
        let mut handles = Vec::new();

        for t in 0..4u64 {
            let slot = Arc::clone(&slot);
            handles.push(thread::spawn(move || {
                for i in 0..1000u64 {
                    slot.set((t << 32) | i);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let value = slot.take().unwrap();
        assert_eq!(value & 0xFFFF_FFFF, 999);
        assert_eq!(slot.take(), None);
    }
}
