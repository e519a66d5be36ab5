// src/config/mod.rs

//! Configuration loading and validation for samlocal.
//!
//! Responsibilities:
//! - Define the TOML-backed function map (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like handler/route sanity (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, FunctionConfig, GeneratorSection, RawConfigFile, SINGLE_ROUTE_KEY};
pub use validate::validate_functions;
