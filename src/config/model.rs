// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::exec::SamCliOptions;
use crate::generator::GeneratorMode;

/// Route key used when a function declares a single `route`.
pub const SINGLE_ROUTE_KEY: &str = "api";

/// Method used when a function has routes but no explicit `method`.
pub const DEFAULT_METHOD: &str = "any";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// mode = "api"
/// cwd = "fixtures"
///
/// [cli]
/// warm_containers = "LAZY"
///
/// [function.first]
/// filename = "first.zip"
/// handler = "handler.handler"
/// runtime = "nodejs14.x"
/// route = "/test"
/// method = "get"
/// ```
///
/// This is the unvalidated form; use `ConfigFile::try_from` (or
/// [`crate::config::load_and_validate`]) to get a checked [`ConfigFile`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Generator behaviour from `[config]`.
    #[serde(default)]
    pub config: GeneratorSection,

    /// Options forwarded to `sam local ...` from `[cli]`.
    #[serde(default)]
    pub cli: SamCliOptions,

    /// All functions from `[function.<name>]`, keyed by external name.
    #[serde(default)]
    pub function: BTreeMap<String, FunctionConfig>,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: GeneratorSection,
    pub cli: SamCliOptions,
    pub function: BTreeMap<String, FunctionConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: GeneratorSection,
        cli: SamCliOptions,
        function: BTreeMap<String, FunctionConfig>,
    ) -> Self {
        Self {
            config,
            cli,
            function,
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorSection {
    /// `"api"` (start-api, HTTP access) or `"sdk"` (start-lambda, Invoke access).
    #[serde(default)]
    pub mode: GeneratorMode,

    /// Base directory for relative `filename`s. Defaults to the directory
    /// containing the config file when loaded by the binary.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Append a random suffix to internal function names.
    #[serde(default)]
    pub randomize_function_names: bool,

    /// SAM CLI executable.
    #[serde(default = "default_sam_binary")]
    pub sam_binary: String,
}

fn default_sam_binary() -> String {
    "sam".to_string()
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            mode: GeneratorMode::default(),
            cwd: None,
            randomize_function_names: false,
            sam_binary: default_sam_binary(),
        }
    }
}

/// `[function.<name>]` section: one Lambda function to emulate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunctionConfig {
    /// Handler inside the unpacked artifact, e.g. `handler.handler`.
    pub handler: String,

    /// Lambda runtime identifier, e.g. `nodejs14.x`.
    pub runtime: String,

    /// Zip artifact, absolute or relative to the generator's `cwd`.
    pub filename: PathBuf,

    /// Single HTTP route. Takes precedence over `routes`.
    #[serde(default)]
    pub route: Option<String>,

    /// Named HTTP routes (route key → path).
    #[serde(default)]
    pub routes: Option<BTreeMap<String, String>>,

    /// HTTP method for every route of this function (default `any`).
    #[serde(default)]
    pub method: Option<String>,

    /// Memory in MB (default 128).
    #[serde(default)]
    pub memory_size: Option<u32>,

    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

impl FunctionConfig {
    pub fn new(handler: impl Into<String>, runtime: impl Into<String>, filename: impl Into<PathBuf>) -> Self {
        Self {
            handler: handler.into(),
            runtime: runtime.into(),
            filename: filename.into(),
            route: None,
            routes: None,
            method: None,
            memory_size: None,
            environment: BTreeMap::new(),
        }
    }

    pub fn effective_method(&self) -> &str {
        self.method.as_deref().unwrap_or(DEFAULT_METHOD)
    }

    /// Normalise `route` / `routes` into `(route key, path)` pairs.
    ///
    /// A single `route` is keyed by [`SINGLE_ROUTE_KEY`]; when both are set,
    /// `route` wins and `routes` is ignored.
    pub fn route_bindings(&self) -> Vec<(String, String)> {
        if let Some(route) = &self.route {
            return vec![(SINGLE_ROUTE_KEY.to_string(), route.clone())];
        }

        self.routes
            .iter()
            .flatten()
            .map(|(key, path)| (key.clone(), path.clone()))
            .collect()
    }

    pub fn has_routes(&self) -> bool {
        self.route.is_some() || self.routes.as_ref().is_some_and(|r| !r.is_empty())
    }
}
