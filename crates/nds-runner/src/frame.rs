//! Frame memory lock and frame statistics
//!
//! The execution thread holds the [`FrameLock`] only while the engine is
//! stepping. Presenters take it just long enough to copy the frame out.

use nds_core::FrameBuffer;
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Window over which the frame rate is measured
const RATE_WINDOW: Duration = Duration::from_secs(1);

/// Mutual exclusion around the frame buffer
pub struct FrameLock {
    frame: Mutex<FrameBuffer>,
    /// Number of times the lock has been taken
    acquisitions: AtomicU64,
    /// Set when a completed frame has not yet been taken by a presenter
    ready: AtomicBool,
}

impl FrameLock {
    pub fn new() -> Self {
        Self {
            frame: Mutex::new(FrameBuffer::new()),
            acquisitions: AtomicU64::new(0),
            ready: AtomicBool::new(false),
        }
    }

    /// Block until the frame is free. Not re-entrant.
    pub fn lock(&self) -> MutexGuard<'_, FrameBuffer> {
        let guard = self.frame.lock();
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        guard
    }

    /// Take the frame only if nobody is writing it
    pub fn try_lock(&self) -> Option<MutexGuard<'_, FrameBuffer>> {
        let guard = self.frame.try_lock()?;
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        Some(guard)
    }

    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.load(Ordering::Relaxed)
    }

    pub fn is_locked(&self) -> bool {
        self.frame.is_locked()
    }

    /// Flag the buffer as holding a finished frame
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Consume the finished-frame flag
    pub fn take_ready(&self) -> bool {
        self.ready.swap(false, Ordering::AcqRel)
    }
}

impl Default for FrameLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Frames emulated and the last measured rate, readable from any thread
///
/// Written only by the execution thread.
pub struct FrameCounter {
    frames: AtomicU64,
    fps: AtomicU32,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self {
            frames: AtomicU64::new(0),
            fps: AtomicU32::new(0),
        }
    }

    /// Add `count` frames and return the new total
    pub fn advance(&self, count: u64) -> u64 {
        self.frames.fetch_add(count, Ordering::AcqRel) + count
    }

    pub fn set_fps(&self, fps: u32) {
        self.fps.store(fps, Ordering::Release);
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Frames per second over the last complete window
    pub fn fps(&self) -> u32 {
        self.fps.load(Ordering::Acquire)
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame rate measurement window, owned by the execution thread
#[derive(Debug)]
pub struct RateWindow {
    started: Instant,
    frames_at_start: u64,
}

impl RateWindow {
    pub fn new(now: Instant, total: u64) -> Self {
        Self {
            started: now,
            frames_at_start: total,
        }
    }

    /// Start a fresh window, e.g. after a new ROM is loaded
    pub fn restart(&mut self, now: Instant, total: u64) {
        self.started = now;
        self.frames_at_start = total;
    }

    /// Rate over the current window once it spans at least one second.
    /// A completed window is replaced by a new one starting at `now`.
    pub fn sample(&mut self, now: Instant, total: u64) -> Option<u32> {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed < RATE_WINDOW {
            return None;
        }
        let frames = total.saturating_sub(self.frames_at_start);
        let fps = (frames as f64 / elapsed.as_secs_f64()).round() as u32;
        self.restart(now, total);
        tracing::trace!("Frame rate: {} fps", fps);
        Some(fps)
    }
}
