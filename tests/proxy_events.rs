// tests/proxy_events.rs
#![cfg(unix)]

mod common;

use std::collections::BTreeMap;

use samlocal::errors::SamLocalError;
use samlocal::proxy::{generate_proxy_sam, ProxyProps};

use common::{fixtures, init_tracing, with_timeout, Fixture};

const PROXY_CONFIG: &str = r#"{"routes":[{"src":"/","dest":"/index"}]}"#;

fn props(fixture: &Fixture, sam: &std::path::Path) -> ProxyProps {
    ProxyProps {
        package: fixture.zip.clone(),
        proxy_config: PROXY_CONFIG.to_string(),
        sam_binary: Some(sam.display().to_string()),
        ..ProxyProps::default()
    }
}

#[test]
fn proxy_template_has_single_edge_function() {
    init_tracing();
    let fixture = Fixture::new();
    let sam = fixtures::write_fake_sam(fixture.dir.path()).unwrap();

    let proxy = generate_proxy_sam(props(&fixture, &sam)).unwrap();
    let generator = proxy.generator();
    let template = generator.template();

    assert_eq!(template.len(), 1);
    let props = &template.resource("proxy").unwrap().properties;
    assert_eq!(props.handler, "proxy/handler.handler");
    assert_eq!(props.description.as_deref(), Some("Lambda@Edge Proxy"));
    assert_eq!(props.runtime, "nodejs12.x");
    assert_eq!(props.memory_size, 128);
    assert_eq!(props.timeout, 30);
    assert!(props.events.is_none());

    let workspace = generator.workspace_path().unwrap();
    assert!(workspace.join("template.yml").is_file());
    assert!(workspace.join("proxy").join("handler.js").is_file());
}

#[tokio::test]
async fn start_serves_proxy_config_and_stop_cleans_up() {
    init_tracing();
    let fixture = Fixture::new();
    let sam = fixtures::write_fake_sam(fixture.dir.path()).unwrap();

    let mut proxy = generate_proxy_sam(ProxyProps {
        runtime: Some("nodejs16.x".to_string()),
        ..props(&fixture, &sam)
    })
    .unwrap();
    let workspace = proxy.generator().workspace_path().unwrap().to_path_buf();

    let instance = with_timeout(proxy.start()).await.unwrap();
    assert!(instance.endpoint.starts_with("http://127.0.0.1:"));

    let args = fixtures::recorded_args(fixture.dir.path()).unwrap();
    assert_eq!(&args[..2], ["local", "start-lambda"]);

    let port = proxy.config_port().expect("config server running");
    let body = reqwest::get(format!("http://127.0.0.1:{port}/anything"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, PROXY_CONFIG);

    with_timeout(proxy.stop()).await.unwrap();
    assert!(proxy.config_port().is_none());
    assert!(!workspace.exists());
}

#[tokio::test]
async fn request_event_before_start_fails() {
    init_tracing();
    let fixture = Fixture::new();
    let sam = fixtures::write_fake_sam(fixture.dir.path()).unwrap();

    let proxy = generate_proxy_sam(props(&fixture, &sam)).unwrap();
    let err = proxy
        .send_request_event("/", &BTreeMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SamLocalError::NotStarted), "got {err:?}");
}
