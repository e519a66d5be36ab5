// src/exec/options.rs

//! Options forwarded to `sam local start-api` / `sam local start-lambda`.
//!
//! Only a fixed set of options is recognised. Anything else that ends up in
//! [`SamCliOptions::extra`] (unknown TOML keys, or keys added through
//! [`SamCliOptions::with_extra`]) is dropped with a warning when the argument
//! list is built.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use crate::generator::GeneratorMode;

/// `--warm-containers` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WarmContainers {
    Eager,
    Lazy,
}

impl WarmContainers {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarmContainers::Eager => "EAGER",
            WarmContainers::Lazy => "LAZY",
        }
    }
}

/// A single rendered option value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OptionValue {
    Text(String),
    Flag(bool),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SamCliOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub template: Option<String>,
    pub env_vars: Option<String>,
    pub parameter_overrides: Option<String>,
    pub debug_port: Option<String>,
    pub debugger_path: Option<String>,
    pub debug_args: Option<String>,
    pub warm_containers: Option<WarmContainers>,
    pub debug_function: Option<String>,
    pub docker_volume_basedir: Option<String>,
    pub docker_network: Option<String>,
    pub container_env_vars: Option<String>,
    pub log_file: Option<String>,
    pub layer_cache_basedir: Option<String>,
    pub skip_pull_image: Option<bool>,
    pub force_image_build: Option<bool>,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub config_file: Option<String>,
    pub config_env: Option<String>,
    pub debug: Option<bool>,

    /// `start-api` only.
    pub static_dir: Option<String>,

    /// Unrecognised keys; never forwarded.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SamCliOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_warm_containers(mut self, mode: WarmContainers) -> Self {
        self.warm_containers = Some(mode);
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<String>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Recognised options in the order they are emitted.
    fn known_entries(&self) -> Vec<(&'static str, Option<OptionValue>)> {
        let text = |v: &Option<String>| v.clone().map(OptionValue::Text);
        let flag = |v: &Option<bool>| v.map(OptionValue::Flag);

        vec![
            ("host", text(&self.host)),
            ("port", self.port.map(|p| OptionValue::Text(p.to_string()))),
            ("template", text(&self.template)),
            ("env-vars", text(&self.env_vars)),
            ("parameter-overrides", text(&self.parameter_overrides)),
            ("debug-port", text(&self.debug_port)),
            ("debugger-path", text(&self.debugger_path)),
            ("debug-args", text(&self.debug_args)),
            (
                "warm-containers",
                self.warm_containers
                    .map(|w| OptionValue::Text(w.as_str().to_string())),
            ),
            ("debug-function", text(&self.debug_function)),
            ("docker-volume-basedir", text(&self.docker_volume_basedir)),
            ("docker-network", text(&self.docker_network)),
            ("container-env-vars", text(&self.container_env_vars)),
            ("log-file", text(&self.log_file)),
            ("layer-cache-basedir", text(&self.layer_cache_basedir)),
            ("skip-pull-image", flag(&self.skip_pull_image)),
            ("force-image-build", flag(&self.force_image_build)),
            ("profile", text(&self.profile)),
            ("region", text(&self.region)),
            ("config-file", text(&self.config_file)),
            ("config-env", text(&self.config_env)),
            ("debug", flag(&self.debug)),
        ]
    }

    /// Flatten into `--option value` / `--flag` arguments for `mode`.
    pub fn to_args(&self, mode: GeneratorMode) -> Vec<String> {
        let mut args = Vec::new();

        for (name, value) in self.known_entries() {
            push_option(&mut args, name, value);
        }

        if let Some(dir) = &self.static_dir {
            match mode {
                GeneratorMode::Api => {
                    push_option(&mut args, "static-dir", Some(OptionValue::Text(dir.clone())))
                }
                GeneratorMode::Sdk => {
                    warn!(option = "static_dir", "Unknown option for start-lambda. It is ignored.")
                }
            }
        }

        for key in self.extra.keys() {
            warn!(option = %key, "Unknown option: {key}. It is ignored.");
        }

        args
    }
}

fn push_option(args: &mut Vec<String>, name: &str, value: Option<OptionValue>) {
    match value {
        Some(OptionValue::Text(v)) => {
            args.push(format!("--{name}"));
            args.push(v);
        }
        Some(OptionValue::Flag(true)) => args.push(format!("--{name}")),
        Some(OptionValue::Flag(false)) | None => {}
    }
}
