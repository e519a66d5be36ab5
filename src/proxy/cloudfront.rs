// src/proxy/cloudfront.rs

//! CloudFront request events as seen by a Lambda@Edge function.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

const CLIENT_IP: &str = "203.0.113.178";
const VIA: &str = "2.0 2afae0d44e2540f472c0635ab62c232b.cloudfront.net (CloudFront)";

/// `{"x-custom": [{"key": "X-Custom", "value": "..."}]}`
pub fn convert_to_cloudfront_headers(headers: &BTreeMap<String, String>) -> Map<String, Value> {
    headers
        .iter()
        .map(|(key, value)| {
            (
                key.to_lowercase(),
                json!([{ "key": key, "value": value }]),
            )
        })
        .collect()
}

/// Split `uri` into path and raw query string, dropping any fragment.
pub fn split_uri(uri: &str) -> (String, String) {
    let without_fragment = uri.split('#').next().unwrap_or_default();
    let (path, query) = without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""));

    let path = if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    (path, query.to_string())
}

/// Request event for a GET of `uri`.
///
/// The record carries the `origin` block of an origin request, but
/// `eventType` stays `viewer-request`, which is what the proxy handler sees.
///
/// The proxy reads its configuration from `config_endpoint`, passed as the
/// `x-env-config-endpoint` origin custom header. Caller headers are merged
/// under the fixed CloudFront ones.
pub fn request_event(
    uri: &str,
    headers: &BTreeMap<String, String>,
    config_endpoint: &str,
) -> Value {
    let (path, querystring) = split_uri(uri);

    let mut request_headers = convert_to_cloudfront_headers(headers);
    request_headers.insert(
        "x-forwarded-for".into(),
        json!([{ "key": "X-Forwarded-For", "value": CLIENT_IP }]),
    );
    request_headers.insert(
        "user-agent".into(),
        json!([{ "key": "User-Agent", "value": "Amazon CloudFront" }]),
    );
    request_headers.insert("via".into(), json!([{ "key": "Via", "value": VIA }]));

    json!({
        "Records": [{
            "cf": {
                "config": {
                    "distributionDomainName": "d111111abcdef8.cloudfront.net",
                    "distributionId": "EDFDVBD6EXAMPLE",
                    "eventType": "viewer-request",
                    "requestId": "4TyzHTaYWb1GX1qTfsHhEqV6HUDd_BzoBZnwfnvQc_1oF26ClkoUSEQ=="
                },
                "request": {
                    "clientIp": CLIENT_IP,
                    "headers": request_headers,
                    "method": "GET",
                    "origin": {
                        "s3": {
                            "customHeaders": {
                                "x-env-config-endpoint": [
                                    { "key": "x-env-config-endpoint", "value": config_endpoint }
                                ],
                                "x-env-api-endpoint": [
                                    { "key": "x-env-api-endpoint", "value": "local-apigw.local" }
                                ]
                            },
                            "domainName": "s3.local",
                            "path": "",
                            "authMethod": "none",
                            "region": "local"
                        }
                    },
                    "querystring": querystring,
                    "uri": path
                }
            }
        }]
    })
}
