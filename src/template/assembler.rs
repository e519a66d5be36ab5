// src/template/assembler.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, SamLocalError};
use crate::template::model::{
    Environment, FUNCTION_RESOURCE_TYPE, FunctionProperties, FunctionResource, OutputValue,
    Outputs, RouteEvent, TemplateDocument, WEB_ENDPOINT_VALUE,
};

/// File name `sam local` picks up from its working directory.
pub const TEMPLATE_FILE_NAME: &str = "template.yml";

pub const DEFAULT_MEMORY_SIZE: u32 = 128;
pub const DEFAULT_RUNTIME: &str = "nodejs16.x";
pub const DEFAULT_TIMEOUT: u32 = 30;

/// Caller-supplied properties of a function resource.
///
/// `None` fields fall back to the assembler defaults; `Some` always wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionArgs {
    pub handler: String,
    pub description: Option<String>,
    pub runtime: Option<String>,
    pub memory_size: Option<u32>,
    pub timeout: Option<u32>,
    pub environment: Option<BTreeMap<String, String>>,
}

impl FunctionArgs {
    pub fn new(handler: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            ..Self::default()
        }
    }
}

/// Builder for the SAM template handed to `sam local`.
#[derive(Debug, Clone, Default)]
pub struct SamTemplate {
    document: TemplateDocument,
}

impl SamTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &TemplateDocument {
        &self.document
    }

    pub fn resource(&self, name: &str) -> Option<&FunctionResource> {
        self.document.resources.get(name)
    }

    pub fn len(&self) -> usize {
        self.document.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.resources.is_empty()
    }

    /// Insert or overwrite the resource `name`.
    pub fn add_function(&mut self, name: &str, args: FunctionArgs) {
        let properties = FunctionProperties {
            handler: args.handler,
            description: args.description,
            runtime: args.runtime.unwrap_or_else(|| DEFAULT_RUNTIME.to_string()),
            memory_size: args.memory_size.unwrap_or(DEFAULT_MEMORY_SIZE),
            timeout: args.timeout.unwrap_or(DEFAULT_TIMEOUT),
            environment: args.environment.map(|variables| Environment { variables }),
            events: None,
        };

        debug!(function = %name, handler = %properties.handler, "adding function resource");

        self.document.resources.insert(
            name.to_string(),
            FunctionResource {
                kind: FUNCTION_RESOURCE_TYPE.to_string(),
                properties,
            },
        );
    }

    /// Attach `event` to the function `name` under `route_key`.
    ///
    /// The function must already exist. The first route also adds the
    /// `WebEndpoint` output.
    pub fn add_route(&mut self, name: &str, route_key: &str, event: RouteEvent) -> Result<()> {
        let resource = self
            .document
            .resources
            .get_mut(name)
            .ok_or_else(|| SamLocalError::UnknownFunction(name.to_string()))?;

        debug!(
            function = %name,
            route_key = %route_key,
            path = %event.properties.path,
            method = %event.properties.method,
            "adding route"
        );

        resource
            .properties
            .events
            .get_or_insert_with(BTreeMap::new)
            .insert(route_key.to_string(), event);

        self.ensure_web_endpoint_output();
        Ok(())
    }

    fn ensure_web_endpoint_output(&mut self) {
        if self.document.outputs.is_none() {
            self.document.outputs = Some(Outputs {
                web_endpoint: OutputValue {
                    value: WEB_ENDPOINT_VALUE.to_string(),
                },
            });
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.document)?)
    }

    /// Write `template.yml` into `dir`, replacing any previous version.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(TEMPLATE_FILE_NAME);
        fs::write(&path, self.to_yaml()?)?;
        debug!(path = %path.display(), resources = self.len(), "template written");
        Ok(path)
    }
}
