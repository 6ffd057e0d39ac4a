//! Error types for the nds-emu execution core

use crate::engine::CheatKind;
use thiserror::Error;

/// Main error type for the emulator
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Cheat error: {0}")]
    Cheat(#[from] CheatError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Engine used before initialization: {0}")]
    NotInitialized(&'static str),

    #[error("Emulator thread panicked")]
    ThreadPanicked,
}

/// Errors reported by the native engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
}

/// Cheat list errors
#[derive(Error, Debug)]
pub enum CheatError {
    #[error("No cheat at index {index} (list has {count})")]
    InvalidIndex { index: usize, count: usize },

    #[error("Cheat {index} ({kind}) cannot be edited")]
    NotEditable { index: usize, kind: CheatKind },

    #[error("Failed to persist cheat list: {0}")]
    Persist(String),
}

/// Result type alias for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;
