// src/template/model.rs

//! Serde model of a SAM template.
//!
//! Only the subset of the format that local emulation needs is modelled.
//! All maps are `BTreeMap`s so rendering is deterministic.

use std::collections::BTreeMap;

use serde::Serialize;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";
pub const SERVERLESS_TRANSFORM: &str = "AWS::Serverless-2016-10-31";
pub const FUNCTION_RESOURCE_TYPE: &str = "AWS::Serverless::Function";
pub const WEB_ENDPOINT_VALUE: &str =
    "!Sub 'https://${ServerlessRestApi}.execute-api.${AWS::Region}.amazonaws.com/Prod/'";

/// API Gateway caps integrations at 29 seconds.
pub const ROUTE_TIMEOUT_MILLIS: u32 = 29_000;
pub const PAYLOAD_FORMAT_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateDocument {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(rename = "Transform")]
    pub transform: Vec<String>,

    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, FunctionResource>,

    #[serde(rename = "Outputs", skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Outputs>,
}

impl Default for TemplateDocument {
    fn default() -> Self {
        Self {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            transform: vec![SERVERLESS_TRANSFORM.to_string()],
            resources: BTreeMap::new(),
            outputs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Outputs {
    pub web_endpoint: OutputValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputValue {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionResource {
    #[serde(rename = "Type")]
    pub kind: String,
    pub properties: FunctionProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionProperties {
    pub handler: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub runtime: String,

    /// In MB.
    pub memory_size: u32,

    /// In seconds.
    pub timeout: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<BTreeMap<String, RouteEvent>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Environment {
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RouteEventType {
    HttpApi,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteEvent {
    #[serde(rename = "Type")]
    pub kind: RouteEventType,
    pub properties: RouteProperties,
}

impl RouteEvent {
    /// HTTP API (payload format 2.0) route with the maximum integration timeout.
    pub fn http_api(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            kind: RouteEventType::HttpApi,
            properties: RouteProperties {
                path: path.into(),
                method: method.into(),
                timeout_in_millis: ROUTE_TIMEOUT_MILLIS,
                payload_format_version: PAYLOAD_FORMAT_VERSION.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteProperties {
    pub path: String,
    pub method: String,
    pub timeout_in_millis: u32,
    pub payload_format_version: String,
}
