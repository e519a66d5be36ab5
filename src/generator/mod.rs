// src/generator/mod.rs

//! Generator facade: unpack functions, assemble the template, run `sam local`.
//!
//! ```no_run
//! # async fn demo() -> samlocal::errors::Result<()> {
//! use std::collections::BTreeMap;
//! use samlocal::config::FunctionConfig;
//! use samlocal::exec::SamCliOptions;
//! use samlocal::generator::{generate_api_sam, GeneratorProps};
//!
//! let mut function = FunctionConfig::new("handler.handler", "nodejs14.x", "fixture/first.zip");
//! function.route = Some("/test".into());
//!
//! let mut sam = generate_api_sam(GeneratorProps::new(BTreeMap::from([("first".into(), function)])))?;
//! let instance = sam.start(SamCliOptions::new()).await?;
//! let response = sam.send_api_request("/test", &[]).await?;
//! println!("{} -> {}", instance.endpoint, response.status());
//! sam.stop().await?;
//! # Ok(())
//! # }
//! ```

mod facade;
pub mod names;

use std::collections::BTreeMap;
use std::fmt;
use std::net::TcpListener;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::config::FunctionConfig;
use crate::errors::Result;
use crate::events::{Callback, Topic};

pub use facade::SamGenerator;
pub use names::NameTable;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_REGION: &str = "local";

/// Which `sam local` subcommand backs the generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorMode {
    /// `start-api`: functions reachable over HTTP through their routes.
    #[default]
    Api,
    /// `start-lambda`: functions reachable through the Lambda `Invoke` API.
    Sdk,
}

impl GeneratorMode {
    pub fn verb(&self) -> &'static str {
        match self {
            GeneratorMode::Api => "start-api",
            GeneratorMode::Sdk => "start-lambda",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorMode::Api => "api",
            GeneratorMode::Sdk => "sdk",
        }
    }
}

impl fmt::Display for GeneratorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneratorMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "api" => Ok(GeneratorMode::Api),
            "sdk" => Ok(GeneratorMode::Sdk),
            other => Err(format!("invalid mode: {other} (expected \"api\" or \"sdk\")")),
        }
    }
}

/// Where a started instance can be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamInstance {
    pub host: String,
    pub port: u16,
    pub endpoint: String,
    pub region: String,
}

/// Options for [`SamGenerator::generate_functions`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Base directory for relative artifact paths (default: process cwd).
    pub cwd: Option<PathBuf>,
    pub randomize_function_names: bool,
}

/// Input of [`generate_api_sam`] / [`generate_local_sam`].
#[derive(Clone, Default)]
pub struct GeneratorProps {
    pub functions: BTreeMap<String, FunctionConfig>,
    pub options: GenerateOptions,
    pub on_data: Option<Callback>,
    pub on_error: Option<Callback>,
    pub sam_binary: Option<String>,
}

impl fmt::Debug for GeneratorProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorProps")
            .field("functions", &self.functions)
            .field("options", &self.options)
            .field("on_data", &self.on_data.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("sam_binary", &self.sam_binary)
            .finish()
    }
}

impl GeneratorProps {
    pub fn new(functions: BTreeMap<String, FunctionConfig>) -> Self {
        Self {
            functions,
            ..Self::default()
        }
    }
}

/// Generator in API mode with `props.functions` already unpacked.
pub fn generate_api_sam(props: GeneratorProps) -> Result<SamGenerator> {
    generate(GeneratorMode::Api, props)
}

/// Generator in SDK mode with `props.functions` already unpacked.
pub fn generate_local_sam(props: GeneratorProps) -> Result<SamGenerator> {
    generate(GeneratorMode::Sdk, props)
}

fn generate(mode: GeneratorMode, props: GeneratorProps) -> Result<SamGenerator> {
    let mut generator = SamGenerator::new(mode)?;
    if let Some(binary) = props.sam_binary {
        generator = generator.with_sam_binary(binary);
    }

    generator.generate_functions(&props.functions, &props.options)?;

    if let Some(callback) = props.on_data {
        generator.on(Topic::Data, move |chunk| callback(chunk));
    }
    if let Some(callback) = props.on_error {
        generator.on(Topic::Error, move |chunk| callback(chunk));
    }

    Ok(generator)
}

/// Ask the OS for a currently unused TCP port on the loopback interface.
///
/// The port is released before returning, so another process may grab it.
pub fn free_port() -> Result<u16> {
    let listener = TcpListener::bind((DEFAULT_HOST, 0))?;
    Ok(listener.local_addr()?.port())
}
