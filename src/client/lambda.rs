// src/client/lambda.rs

use aws_config::BehaviorVersion;
use aws_sdk_lambda::config::{Credentials, Region};
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::{Result, SamLocalError};

pub use aws_sdk_lambda::types::InvocationType;

/// `sam local start-lambda` ignores credentials, but the SDK insists on some.
const LOCAL_ACCESS_KEY: &str = "samlocal";
const LOCAL_SECRET_KEY: &str = "samlocal";

/// Result of a Lambda `Invoke` call.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeResponse {
    pub status_code: i32,
    pub payload: Vec<u8>,
    pub function_error: Option<String>,
}

impl InvokeResponse {
    pub fn payload_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// Lambda client pointed at a local endpoint.
#[derive(Debug, Clone)]
pub struct LambdaInvoker {
    client: aws_sdk_lambda::Client,
}

impl LambdaInvoker {
    pub async fn connect(endpoint: &str, region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(Region::new(region.to_string()))
            .credentials_provider(Credentials::new(
                LOCAL_ACCESS_KEY,
                LOCAL_SECRET_KEY,
                None,
                None,
                "samlocal-static",
            ))
            .load()
            .await;

        Self {
            client: aws_sdk_lambda::Client::new(&config),
        }
    }

    pub async fn invoke(
        &self,
        function_name: &str,
        invocation_type: InvocationType,
        payload: Vec<u8>,
    ) -> Result<InvokeResponse> {
        debug!(
            function = %function_name,
            invocation_type = %invocation_type.as_str(),
            bytes = payload.len(),
            "invoking function"
        );

        let output = self
            .client
            .invoke()
            .function_name(function_name)
            .invocation_type(invocation_type)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| SamLocalError::Invoke(DisplayErrorContext(&e).to_string()))?;

        Ok(InvokeResponse {
            status_code: output.status_code(),
            payload: output
                .payload()
                .map(|blob| blob.as_ref().to_vec())
                .unwrap_or_default(),
            function_error: output.function_error().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn response_payload_decodes_as_json() {
        let response = InvokeResponse {
            status_code: 200,
            payload: br#"{"statusCode":200,"body":"Hello World!"}"#.to_vec(),
            function_error: None,
        };

        let body: Value = response.json().unwrap();
        assert_eq!(body["body"], "Hello World!");
        assert_eq!(response.payload_str(), r#"{"statusCode":200,"body":"Hello World!"}"#);
    }
}
