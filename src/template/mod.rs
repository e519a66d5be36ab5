// src/template/mod.rs

//! SAM template assembly.
//!
//! - [`model`] is the serde model of the document `sam local` consumes.
//! - [`assembler`] owns the document and applies defaults, routes and the
//!   API output entry.

pub mod assembler;
pub mod model;

pub use assembler::{FunctionArgs, SamTemplate, TEMPLATE_FILE_NAME};
pub use model::{
    Environment, FunctionProperties, FunctionResource, OutputValue, Outputs, RouteEvent,
    RouteEventType, RouteProperties, TemplateDocument,
};
