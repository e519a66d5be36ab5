// src/config/validate.rs

use std::collections::BTreeMap;

use crate::config::model::{ConfigFile, FunctionConfig, RawConfigFile};
use crate::errors::{Result, SamLocalError};

const MIN_MEMORY_MB: u32 = 128;
const MAX_MEMORY_MB: u32 = 10_240;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SamLocalError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.cli, raw.function))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_functions(cfg)?;
    validate_functions(&cfg.function)?;
    if cfg.config.sam_binary.trim().is_empty() {
        return Err(SamLocalError::Config(
            "[config].sam_binary must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn ensure_has_functions(cfg: &RawConfigFile) -> Result<()> {
    if cfg.function.is_empty() {
        return Err(SamLocalError::Config(
            "config must contain at least one [function.<name>] section".to_string(),
        ));
    }
    Ok(())
}

/// Check every entry of a function map.
///
/// Also used by the generator, so programmatic callers get the same checks as
/// the TOML loader.
pub fn validate_functions(functions: &BTreeMap<String, FunctionConfig>) -> Result<()> {
    for (name, function) in functions {
        validate_function(name, function)?;
    }
    Ok(())
}

fn validate_function(name: &str, f: &FunctionConfig) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SamLocalError::Config(
            "function names must not be empty".to_string(),
        ));
    }

    for (field, value) in [("handler", &f.handler), ("runtime", &f.runtime)] {
        if value.trim().is_empty() {
            return Err(SamLocalError::Config(format!(
                "function '{name}' has an empty `{field}`"
            )));
        }
    }

    if f.filename.as_os_str().is_empty() {
        return Err(SamLocalError::Config(format!(
            "function '{name}' has an empty `filename`"
        )));
    }

    if let Some(mem) = f.memory_size {
        if !(MIN_MEMORY_MB..=MAX_MEMORY_MB).contains(&mem) {
            return Err(SamLocalError::Config(format!(
                "function '{name}': memory_size must be between {MIN_MEMORY_MB} and {MAX_MEMORY_MB} MB (got {mem})"
            )));
        }
    }

    if let Some(method) = &f.method {
        if method.trim().is_empty() {
            return Err(SamLocalError::Config(format!(
                "function '{name}' has an empty `method`"
            )));
        }
    }

    for (key, path) in f.route_bindings() {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SamLocalError::Config(format!(
                "function '{name}': route key '{key}' must be non-empty and alphanumeric"
            )));
        }
        if !path.starts_with('/') {
            return Err(SamLocalError::Config(format!(
                "function '{name}': route '{path}' must start with '/'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function() -> FunctionConfig {
        FunctionConfig::new("handler.handler", "nodejs14.x", "first.zip")
    }

    #[test]
    fn accepts_minimal_function() {
        let map = BTreeMap::from([("first".to_string(), function())]);
        assert!(validate_functions(&map).is_ok());
    }

    #[test]
    fn rejects_relative_route() {
        let mut f = function();
        f.route = Some("test".to_string());
        let map = BTreeMap::from([("first".to_string(), f)]);

        match validate_functions(&map) {
            Err(SamLocalError::Config(msg)) => assert!(msg.contains("must start with '/'")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_memory() {
        let mut f = function();
        f.memory_size = Some(64);
        let map = BTreeMap::from([("first".to_string(), f)]);

        assert!(matches!(
            validate_functions(&map),
            Err(SamLocalError::Config(_))
        ));
    }

    #[test]
    fn rejects_route_keys_with_symbols() {
        let mut f = function();
        f.routes = Some(BTreeMap::from([("get-user".to_string(), "/user".to_string())]));
        let map = BTreeMap::from([("first".to_string(), f)]);

        assert!(matches!(
            validate_functions(&map),
            Err(SamLocalError::Config(_))
        ));
    }
}
