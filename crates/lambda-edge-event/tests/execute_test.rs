//! Integration tests for running handlers against built events.

use lambda_edge_event::{
    BoxError, Callback, EdgeEvent, EdgeEventError, HandlerContext, InvocationError,
    RequestEventBuilder, ResponseEventBuilder,
};
use serde_json::{Value, json};
use std::time::Duration;

fn request_of(event: &Value) -> Value {
    event["Records"][0]["cf"]["request"].clone()
}

fn response_of(event: &Value) -> Value {
    event["Records"][0]["cf"]["response"].clone()
}

async fn passthrough_request(event: Value, _ctx: HandlerContext) -> Result<Value, BoxError> {
    Ok(request_of(&event))
}

#[tokio::test]
async fn test_handler_sees_the_built_event() {
    let mut builder = RequestEventBuilder::viewer_request();
    builder
        .uri("/index.html")
        .request_header("Host", "example.org");

    let expected = builder.to_value().unwrap();
    let payload = builder
        .execute(|event, ctx| async move {
            assert_eq!(event, expected);
            assert_eq!(ctx, HandlerContext::default());
            Ok::<_, BoxError>(request_of(&event))
        })
        .await
        .unwrap();

    assert_eq!(payload["uri"], "/index.html");
}

#[tokio::test]
async fn test_handler_mutation_does_not_leak_between_runs() {
    let builder = RequestEventBuilder::viewer_request();

    builder
        .execute(|mut event, _ctx| async move {
            event["Records"][0]["cf"]["request"]["uri"] = json!("/mutated");
            Ok::<_, BoxError>(request_of(&event))
        })
        .await
        .unwrap();

    let second = builder.execute(passthrough_request).await.unwrap();
    assert_eq!(second["uri"], "/");
}

#[tokio::test]
async fn test_payload_returned_unchanged() {
    let builder = RequestEventBuilder::viewer_request();
    let payload = builder
        .execute(|event, _ctx| async move {
            let mut request = request_of(&event);
            request["x-extra"] = json!({"kept": true});
            Ok::<_, BoxError>(request)
        })
        .await
        .unwrap();

    assert_eq!(payload["x-extra"], json!({"kept": true}));
}

#[tokio::test]
async fn test_typed_handler() {
    let mut builder = ResponseEventBuilder::viewer_response();
    builder.status(200);

    let payload = builder
        .execute(|event, _ctx| async move {
            let event: EdgeEvent = serde_json::from_value(event)?;
            let mut response = event
                .document()
                .and_then(|doc| doc.response.clone())
                .ok_or("no response")?;
            response.set_status(503);
            response.headers.add("Retry-After", "120");
            Ok::<_, BoxError>(serde_json::to_value(response)?)
        })
        .await
        .unwrap();

    assert_eq!(payload["status"], "503");
    assert_eq!(payload["statusDescription"], "Service Unavailable");
    assert_eq!(payload["headers"]["retry-after"][0]["value"], "120");
}

#[tokio::test]
async fn test_request_validation_reports_first_violation() {
    let builder = RequestEventBuilder::viewer_request();
    let err = builder
        .execute(|event, _ctx| async move {
            let mut request = request_of(&event);
            request["clientIp"] = json!(42);
            request["uri"] = json!("no-slash");
            Ok::<_, BoxError>(request)
        })
        .await
        .unwrap_err();

    let EdgeEventError::Validation(err) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(err.path, "clientIp");
}

#[tokio::test]
async fn test_request_validation_rejects_non_object() {
    let builder = RequestEventBuilder::viewer_request();
    let err = builder
        .execute(|_event, _ctx| async { Ok::<_, BoxError>(json!("not a request")) })
        .await
        .unwrap_err();

    assert!(matches!(err, EdgeEventError::Validation(ref e) if e.path == "payload"));
}

#[tokio::test]
async fn test_origin_changes_checked_for_origin_requests() {
    let mut builder = RequestEventBuilder::origin_request();
    builder.custom_origin("example.org", "/").unwrap();

    let err = builder
        .execute(|event, _ctx| async move {
            let mut request = request_of(&event);
            request["origin"]["custom"]["port"] = json!(8);
            Ok::<_, BoxError>(request)
        })
        .await
        .unwrap_err();

    let EdgeEventError::Validation(err) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(err.path, "origin.custom.port");
    assert_eq!(err.found, "8");
}

#[tokio::test]
async fn test_viewer_requests_skip_origin_checks() {
    let builder = RequestEventBuilder::viewer_request();
    builder
        .execute(|event, _ctx| async move {
            let mut request = request_of(&event);
            request["origin"] = json!({"custom": {}, "s3": {}});
            Ok::<_, BoxError>(request)
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_response_validation() {
    let builder = ResponseEventBuilder::origin_response();

    builder
        .execute(|event, _ctx| async move { Ok::<_, BoxError>(response_of(&event)) })
        .await
        .unwrap();

    let err = builder
        .execute(|event, _ctx| async move {
            let mut response = response_of(&event);
            response["status"] = json!(200);
            Ok::<_, BoxError>(response)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EdgeEventError::Validation(ref e) if e.path == "status"));
}

#[tokio::test]
async fn test_callback_settled_after_delay() {
    let builder = ResponseEventBuilder::viewer_response();
    let payload = builder
        .execute_callback(|event, _ctx, callback: Callback| {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                callback.succeed(response_of(&event));
            });
        })
        .await
        .unwrap();

    assert_eq!(payload["status"], "200");
}

#[tokio::test]
async fn test_callback_failure_and_drop() {
    let builder = RequestEventBuilder::viewer_request();

    let err = builder
        .execute_callback(|_event, _ctx, callback| callback.fail("denied by policy"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "handler failed: denied by policy");

    let err = builder
        .execute_callback(|_event, _ctx, callback| {
            tokio::spawn(async move { drop(callback) });
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EdgeEventError::Invocation(InvocationError::CallbackDropped)
    ));
}

#[tokio::test]
async fn test_callback_payload_is_validated() {
    let builder = ResponseEventBuilder::viewer_response();
    let err = builder
        .execute_callback(|_event, _ctx, callback| callback.succeed(json!({"status": "200"})))
        .await
        .unwrap_err();

    assert!(matches!(err, EdgeEventError::Validation(ref e) if e.path == "headers"));
}
