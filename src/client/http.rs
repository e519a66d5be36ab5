// src/client/http.rs

use tracing::debug;

use crate::errors::Result;

/// HTTP client bound to the endpoint of a running `start-api` instance.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ApiClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `{endpoint}{path}`; `path` is expected to start with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Send a GET request to `path` with optional extra headers.
    pub async fn get(&self, path: &str, headers: &[(&str, &str)]) -> Result<reqwest::Response> {
        let url = self.url(path);
        debug!(%url, "sending API gateway request");

        let mut request = self.client.get(&url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        Ok(request.send().await?)
    }
}
