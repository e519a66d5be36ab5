// src/errors.rs

//! Crate-wide error type.
//!
//! Assembly-time problems (bad config, routes on unknown functions) are
//! returned synchronously. Process-level failures after readiness are not
//! errors at all: they go out on the `error` topic of the generator.

use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SamLocalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "No function resource with name \"{0}\". Please create the function first before adding routes."
    )]
    UnknownFunction(String),

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited before it was ready to accept connections ({})", describe_status(.status))]
    StartupFailed {
        program: String,
        status: Option<ExitStatus>,
    },

    #[error("generator is already running; call stop() first")]
    AlreadyRunning,

    #[error("generator has not been started")]
    NotStarted,

    #[error("generator has been stopped and its workspace released")]
    Stopped,

    #[error("operation requires a generator in {expected} mode")]
    WrongMode { expected: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Lambda invocation failed: {0}")]
    Invoke(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn describe_status(status: &Option<ExitStatus>) -> String {
    match status {
        Some(status) => status.to_string(),
        None => "exit status unknown".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SamLocalError>;
