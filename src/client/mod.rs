// src/client/mod.rs

//! Clients for a running SAM CLI instance.
//!
//! - [`http`]: plain HTTP against `sam local start-api`.
//! - [`lambda`]: Lambda `Invoke` against `sam local start-lambda`.

pub mod http;
pub mod lambda;

pub use http::ApiClient;
pub use lambda::{InvocationType, InvokeResponse, LambdaInvoker};
