// src/proxy/mod.rs

//! Generator for a Lambda@Edge proxy package.
//!
//! The proxy runs as the single function `proxy` behind `start-lambda`.
//! Alongside it a small HTTP server hands out the proxy configuration; its
//! address reaches the function through the origin custom headers of each
//! request event.

pub mod cloudfront;
pub mod config_server;

use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::InvocationType;
use crate::errors::{Result, SamLocalError};
use crate::events::{Callback, Topic};
use crate::exec::SamCliOptions;
use crate::generator::{GeneratorMode, SamGenerator, SamInstance};
use crate::template::FunctionArgs;

pub use cloudfront::{convert_to_cloudfront_headers, request_event};
pub use config_server::ConfigServer;

pub const PROXY_FUNCTION_NAME: &str = "proxy";
pub const PROXY_HANDLER: &str = "handler.handler";
pub const PROXY_DESCRIPTION: &str = "Lambda@Edge Proxy";
pub const DEFAULT_PROXY_RUNTIME: &str = "nodejs12.x";
const PROXY_MEMORY_SIZE: u32 = 128;
const PROXY_TIMEOUT: u32 = 30;

/// Overrides the address the function uses to reach the config server.
pub const HOST_IP_ENV: &str = "SAMLOCAL_HOST_IP";

#[derive(Clone, Default)]
pub struct ProxyProps {
    /// Zip of the proxy package.
    pub package: PathBuf,
    /// Body served by the config server.
    pub proxy_config: String,
    pub runtime: Option<String>,
    pub on_data: Option<Callback>,
    pub on_error: Option<Callback>,
    pub cli_options: SamCliOptions,
    pub sam_binary: Option<String>,
}

impl fmt::Debug for ProxyProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyProps")
            .field("package", &self.package)
            .field("runtime", &self.runtime)
            .field("cli_options", &self.cli_options)
            .field("sam_binary", &self.sam_binary)
            .finish_non_exhaustive()
    }
}

/// Running (or runnable) proxy plus its config server.
#[derive(Debug)]
pub struct ProxyGenerator {
    generator: SamGenerator,
    proxy_config: String,
    cli_options: SamCliOptions,
    config_server: Option<ConfigServer>,
}

/// Unpack the proxy package and write its template.
pub fn generate_proxy_sam(props: ProxyProps) -> Result<ProxyGenerator> {
    let mut generator = SamGenerator::new(GeneratorMode::Sdk)?;
    if let Some(binary) = props.sam_binary {
        generator = generator.with_sam_binary(binary);
    }

    let args = FunctionArgs {
        description: Some(PROXY_DESCRIPTION.to_string()),
        runtime: Some(
            props
                .runtime
                .unwrap_or_else(|| DEFAULT_PROXY_RUNTIME.to_string()),
        ),
        memory_size: Some(PROXY_MEMORY_SIZE),
        timeout: Some(PROXY_TIMEOUT),
        ..FunctionArgs::new(PROXY_HANDLER)
    };
    generator.add_function_package(PROXY_FUNCTION_NAME, &props.package, false, args)?;
    generator.write_template()?;

    if let Some(callback) = props.on_data {
        generator.on(Topic::Data, move |chunk| callback(chunk));
    }
    if let Some(callback) = props.on_error {
        generator.on(Topic::Error, move |chunk| callback(chunk));
    }

    Ok(ProxyGenerator {
        generator,
        proxy_config: props.proxy_config,
        cli_options: props.cli_options,
        config_server: None,
    })
}

impl ProxyGenerator {
    pub fn generator(&self) -> &SamGenerator {
        &self.generator
    }

    pub fn config_port(&self) -> Option<u16> {
        self.config_server.as_ref().map(ConfigServer::port)
    }

    /// Start `sam local start-lambda` and the config server.
    pub async fn start(&mut self) -> Result<SamInstance> {
        let instance = self.generator.start(self.cli_options.clone()).await?;

        if self.config_server.is_none() {
            match ConfigServer::bind(self.proxy_config.clone()).await {
                Ok(server) => self.config_server = Some(server),
                Err(e) => {
                    if let Err(stop_err) = self.generator.stop().await {
                        warn!(error = %stop_err, "failed to stop sam local after config server error");
                    }
                    return Err(e);
                }
            }
        }

        Ok(instance)
    }

    /// Stop SAM, then the config server. Both always run.
    pub async fn stop(&mut self) -> Result<()> {
        let sam_result = self.generator.stop().await;

        let server_result = match self.config_server.take() {
            Some(server) => server.shutdown().await,
            None => Ok(()),
        };

        sam_result.and(server_result)
    }

    /// Invoke the proxy with a request event for `uri` and return
    /// the decoded response (a CloudFront request or result).
    pub async fn send_request_event(
        &self,
        uri: &str,
        headers: &BTreeMap<String, String>,
    ) -> Result<Value> {
        let port = self.config_port().ok_or(SamLocalError::NotStarted)?;
        let config_endpoint = format!("http://{}:{port}/", local_host_ip());
        debug!(%uri, %config_endpoint, "sending request event");

        let event = request_event(uri, headers, &config_endpoint);
        let response = self
            .generator
            .send_event(
                PROXY_FUNCTION_NAME,
                InvocationType::RequestResponse,
                serde_json::to_vec(&event)?,
            )
            .await?;

        if let Some(error) = &response.function_error {
            warn!(%error, payload = %response.payload_str(), "proxy function returned an error");
        }
        response.json()
    }
}

/// Address of this machine as seen from a container.
///
/// `localhost` inside the Lambda container is the container itself.
pub fn local_host_ip() -> IpAddr {
    if let Ok(value) = std::env::var(HOST_IP_ENV) {
        match value.parse() {
            Ok(ip) => return ip,
            Err(e) => warn!(env = HOST_IP_ENV, %value, error = %e, "ignoring invalid host IP"),
        }
    }

    match outbound_interface_ip() {
        Ok(ip) => ip,
        Err(e) => {
            warn!(error = %e, "could not determine host IP; using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

// Connecting a UDP socket sends nothing, it only picks the route.
fn outbound_interface_ip() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind(("0.0.0.0", 0))?;
    socket.connect(("10.255.255.255", 1))?;
    Ok(socket.local_addr()?.ip())
}
