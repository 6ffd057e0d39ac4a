//! Load lifecycle events sent to the UI
//!
//! Delivery goes through an unbounded channel so the execution thread never
//! waits on the UI. Events of one load attempt are emitted in order from a
//! single thread, so the receiver sees them in order.

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Load lifecycle event, carrying the ROM path it concerns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// A load attempt has begun
    Started(PathBuf),
    /// The attempt finished, successfully or not
    Ended(PathBuf),
    /// The engine rejected the ROM; always follows `Ended`
    Error(PathBuf),
}

impl LoadEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::Started(path) | Self::Ended(path) | Self::Error(path) => path,
        }
    }
}

/// Create a channel suitable for receiving [`LoadEvent`]s
pub fn event_channel() -> (Sender<LoadEvent>, Receiver<LoadEvent>) {
    channel::unbounded()
}

/// Sends load events to the currently bound UI sink
pub struct LifecycleNotifier {
    sink: Mutex<Sender<LoadEvent>>,
}

impl LifecycleNotifier {
    pub fn new(sink: Sender<LoadEvent>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Rebind to a new UI. Later events go only to `sink`.
    pub fn set_sink(&self, sink: Sender<LoadEvent>) {
        *self.sink.lock() = sink;
    }

    pub fn emit(&self, event: LoadEvent) {
        if let Err(err) = self.sink.lock().try_send(event) {
            tracing::debug!("UI gone, dropping {:?}", err.into_inner());
        }
    }
}
