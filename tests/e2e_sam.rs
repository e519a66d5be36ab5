// tests/e2e_sam.rs
//
// Needs the AWS SAM CLI and a running Docker daemon:
// `cargo test --test e2e_sam -- --ignored`

mod common;

use std::sync::Arc;

use samlocal::client::InvocationType;
use samlocal::exec::{SamCliOptions, WarmContainers};
use samlocal::generator::{generate_api_sam, generate_local_sam, GenerateOptions, GeneratorProps};
use serde_json::{json, Value};

use common::{function_map, init_tracing, Fixture, FunctionConfigBuilder};

fn props(fixture: &Fixture, route: Option<&str>) -> GeneratorProps {
    let mut function = FunctionConfigBuilder::new("first.zip");
    if let Some(route) = route {
        function = function.route(route).method("get");
    }

    GeneratorProps {
        functions: function_map([("first", function.build())]),
        options: GenerateOptions {
            cwd: Some(fixture.path()),
            randomize_function_names: false,
        },
        on_data: Some(Arc::new(|chunk: &[u8]| print!("{}", String::from_utf8_lossy(chunk)))),
        on_error: Some(Arc::new(|chunk: &[u8]| eprint!("{}", String::from_utf8_lossy(chunk)))),
        sam_binary: None,
    }
}

#[tokio::test]
#[ignore]
async fn api_gateway_route_returns_hello_world() {
    init_tracing();
    let fixture = Fixture::new();

    let mut sam = generate_api_sam(props(&fixture, Some("/test"))).unwrap();
    sam.start(SamCliOptions::new().with_warm_containers(WarmContainers::Lazy))
        .await
        .unwrap();

    let response = sam.send_api_request("/test", &[]).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "Hello World!");

    sam.stop().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn sdk_invoke_returns_handler_payload() {
    init_tracing();
    let fixture = Fixture::new();

    let mut sam = generate_local_sam(props(&fixture, None)).unwrap();
    sam.start(SamCliOptions::new()).await.unwrap();

    let result = sam
        .send_event("first", InvocationType::RequestResponse, Vec::new())
        .await;
    sam.stop().await.unwrap();

    let response = result.unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(
        response.json::<Value>().unwrap(),
        json!({
            "isBase64Encoded": false,
            "statusCode": 200,
            "body": "Hello World!",
            "headers": { "content-type": "application/json" }
        })
    );
}
