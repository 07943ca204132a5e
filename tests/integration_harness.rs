//! Integration test harness that runs the example handlers end to end:
//! - events built from layered defaults
//! - every trigger type
//! - both handler calling conventions
//!
//! This mirrors what CloudFront does with a function: build the event, call
//! the handler, check the returned payload before using it.

use edge_handler_example::{
    ASSET_BUCKET_DOMAIN, PROCESSED_HEADER, SECURITY_HEADERS, add_security_headers,
    broken_status_handler, callback_add_header, redirect_legacy_paths, route_to_s3_origin,
};
use lambda_edge_event::{
    EdgeEventError, EventDefaults, EventType, RequestEventBuilder, ResponseEventBuilder,
    validate_request, validate_request_origin,
};
use serde_json::json;

fn defaults() -> EventDefaults {
    EventDefaults::builder()
        .distribution_domain_name("d111111abcdef8.cloudfront.net")
        .distribution_id("EDFDVBD6EXAMPLE")
        .generate_request_id(true)
        .build()
}

fn request_builder(event_type: EventType) -> RequestEventBuilder {
    RequestEventBuilder::with_defaults(event_type, &defaults()).unwrap()
}

fn response_builder(event_type: EventType) -> ResponseEventBuilder {
    ResponseEventBuilder::with_defaults(event_type, &defaults()).unwrap()
}

#[tokio::test]
async fn test_viewer_request_pipeline() {
    let mut builder = request_builder(EventType::ViewerRequest);
    builder
        .uri("/legacy/blog/post-1")
        .request_header("Host", "www.example.org");

    let rewritten = builder.execute(redirect_legacy_paths).await.unwrap();
    assert_eq!(rewritten["uri"], "/v2/blog/post-1");
    assert_eq!(rewritten["headers"]["host"][0]["value"], "www.example.org");

    let tagged = builder.execute_callback(callback_add_header).await.unwrap();
    assert_eq!(
        tagged["headers"]["x-edge-processed"][0]["key"],
        PROCESSED_HEADER
    );
    assert_eq!(tagged["uri"], "/legacy/blog/post-1");
}

#[tokio::test]
async fn test_origin_request_pipeline() {
    let mut builder = request_builder(EventType::OriginRequest);
    builder
        .uri("/static/img/logo.svg")
        .custom_origin("app.example.org", "/")
        .unwrap()
        .origin_read_timeout(30)
        .unwrap()
        .origin_ssl_protocols(["TLSv1.2"])
        .unwrap();

    let routed = builder.execute(route_to_s3_origin).await.unwrap();
    assert_eq!(routed["origin"]["s3"]["domainName"], ASSET_BUCKET_DOMAIN);
    validate_request(&routed).unwrap();
    validate_request_origin(&routed).unwrap();

    builder.uri("/api/orders");
    let untouched = builder.execute(route_to_s3_origin).await.unwrap();
    assert_eq!(
        untouched["origin"]["custom"]["domainName"],
        "app.example.org"
    );
}

#[tokio::test]
async fn test_origin_request_with_invalid_origin_is_rejected() {
    let mut builder = RequestEventBuilder::origin_request();
    builder
        .uri("/api/orders")
        .custom_origin("app.example.org", "/")
        .unwrap()
        .origin_keepalive_timeout(120)
        .unwrap();

    let err = builder.execute(route_to_s3_origin).await.unwrap_err();
    let EdgeEventError::Validation(err) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(err.path, "origin.custom.keepaliveTimeout");
}

#[tokio::test]
async fn test_response_pipelines() {
    for event_type in [EventType::OriginResponse, EventType::ViewerResponse] {
        let mut builder = response_builder(event_type);
        builder
            .status(200)
            .response_header("Content-Type", "text/html; charset=utf-8");

        let response = builder.execute(add_security_headers).await.unwrap();
        for (key, value) in SECURITY_HEADERS {
            let name = key.to_lowercase();
            assert_eq!(
                response["headers"][name.as_str()],
                json!([{ "key": key, "value": value }]),
                "{event_type}: {key}"
            );
        }
    }
}

#[tokio::test]
async fn test_broken_handler_is_caught() {
    let builder = response_builder(EventType::OriginResponse);
    let err = builder.execute(broken_status_handler).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "invalid payload field `status`: expected a known HTTP status code, found \"299\""
    );
}

#[test]
fn test_builders_refuse_triggers_of_the_other_flavor() {
    let err =
        RequestEventBuilder::with_defaults(EventType::ViewerResponse, &defaults()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "viewer-response events cannot be built by a request builder"
    );
    assert!(ResponseEventBuilder::new(EventType::OriginRequest).is_err());
}

#[tokio::test]
async fn test_each_run_gets_a_fresh_request_id() {
    let first = request_builder(EventType::ViewerRequest);
    let second = request_builder(EventType::ViewerRequest);

    assert_ne!(
        first.document().config.request_id,
        second.document().config.request_id
    );
}
