// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`supervisor`] spawns the SAM CLI, waits for its readiness marker and
//!   stops it again.
//! - [`scanner`] detects the readiness marker across output chunks.
//! - [`signal`] provides the one-shot signals for readiness and exit.
//! - [`options`] turns [`SamCliOptions`] into command-line arguments.

pub mod options;
pub mod scanner;
pub mod signal;
pub mod supervisor;

pub use options::{SamCliOptions, WarmContainers};
pub use scanner::MarkerScanner;
pub use signal::Completion;
pub use supervisor::{
    OutputSink, ProcessHandle, ProcessState, READY_MARKER, SpawnRequest, spawn_process,
};
