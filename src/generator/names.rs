// src/generator/names.rs

use std::collections::BTreeMap;

use rand::distributions::{Alphanumeric, DistString};

use crate::errors::{Result, SamLocalError};

const RANDOM_SUFFIX_LEN: usize = 8;
const FALLBACK_BASE: &str = "fn";

/// External function name ↔ internal (template) name.
///
/// SAM logical IDs may only contain ASCII letters and digits. Without
/// randomisation the external name is used as-is and must already satisfy
/// that; with randomisation it is stripped to its alphanumeric characters and
/// given a random suffix.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    to_internal: BTreeMap<String, String>,
    to_external: BTreeMap<String, String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign (or return the existing) internal name for `external`.
    pub fn assign(&mut self, external: &str, randomize: bool) -> Result<String> {
        if let Some(existing) = self.to_internal.get(external) {
            return Ok(existing.clone());
        }

        let internal = if randomize {
            self.random_name(external)
        } else {
            if !is_valid_logical_id(external) {
                return Err(SamLocalError::Config(format!(
                    "function name '{external}' may only contain ASCII letters and digits \
                     (enable randomize_function_names to sanitise it)"
                )));
            }
            external.to_string()
        };

        self.to_internal
            .insert(external.to_string(), internal.clone());
        self.to_external
            .insert(internal.clone(), external.to_string());
        Ok(internal)
    }

    fn random_name(&self, external: &str) -> String {
        let mut base = sanitize(external);
        if base.is_empty() {
            base = FALLBACK_BASE.to_string();
        }

        let mut rng = rand::thread_rng();
        loop {
            let candidate = format!(
                "{base}{}",
                Alphanumeric.sample_string(&mut rng, RANDOM_SUFFIX_LEN)
            );
            if !self.to_external.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    pub fn internal(&self, external: &str) -> Option<&str> {
        self.to_internal.get(external).map(String::as_str)
    }

    pub fn external(&self, internal: &str) -> Option<&str> {
        self.to_external.get(internal).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.to_internal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_internal.is_empty()
    }

    /// `(external, internal)` pairs ordered by external name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.to_internal
            .iter()
            .map(|(e, i)| (e.as_str(), i.as_str()))
    }
}

fn is_valid_logical_id(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

fn sanitize(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}
