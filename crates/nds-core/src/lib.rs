//! Core types for the nds-emu execution scheduler
//!
//! This crate provides error handling, configuration, logging setup and the
//! interface to the native engine that the execution thread drives.

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod null_engine;

pub use config::Config;
pub use engine::{AudioControl, Cheat, CheatKind, CheatStore, Engine, FrameBuffer};
pub use error::{CheatError, EmulatorError, EngineError, Result};
pub use null_engine::NullEngine;
