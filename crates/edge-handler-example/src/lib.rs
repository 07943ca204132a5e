//! Example Lambda@Edge handlers exercised through `lambda-edge-event`.
//!
//! Each handler takes the raw event and an empty context, the way CloudFront
//! calls a function, and returns the request or response CloudFront should
//! continue with. Some decode the event into the typed model, others edit the
//! JSON directly; both are common in real edge functions.
//!
//! ## Handlers
//!
//! - [`redirect_legacy_paths`] - viewer-request, rewrites `/legacy/*` uris
//! - [`route_to_s3_origin`] - origin-request, sends `/static/*` to a bucket
//! - [`add_security_headers`] - origin/viewer-response, appends security headers
//! - [`callback_add_header`] - callback-style, tags the request from another task
//! - [`broken_status_handler`] - returns a status CloudFront rejects
//!
//! ## Example
//!
//! ```no_run
//! use edge_handler_example::{init_tracing, redirect_legacy_paths};
//! use lambda_edge_event::RequestEventBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     init_tracing()?;
//!
//!     let mut builder = RequestEventBuilder::viewer_request();
//!     builder.uri("/legacy/about.html");
//!
//!     let request = builder.execute(redirect_legacy_paths).await?;
//!     assert_eq!(request["uri"], "/v2/about.html");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use lambda_edge_event::{Callback, EdgeEvent, EdgeRequest, EdgeResponse, HandlerContext};
use serde_json::{Value, json};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Prefix of paths kept for old clients.
pub const LEGACY_PREFIX: &str = "/legacy/";
/// Prefix legacy paths are rewritten to.
pub const CURRENT_PREFIX: &str = "/v2/";
/// Prefix of paths served from the asset bucket.
pub const STATIC_PREFIX: &str = "/static/";
/// Bucket serving static assets.
pub const ASSET_BUCKET_DOMAIN: &str = "assets-example.s3.amazonaws.com";
/// Region of the asset bucket.
pub const ASSET_BUCKET_REGION: &str = "us-east-1";
/// Header set by [`callback_add_header`].
pub const PROCESSED_HEADER: &str = "X-Edge-Processed";

/// Headers appended by [`add_security_headers`].
pub const SECURITY_HEADERS: [(&str, &str); 4] = [
    (
        "Strict-Transport-Security",
        "max-age=63072000; includeSubDomains; preload",
    ),
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    ("Referrer-Policy", "same-origin"),
];

/// Errors returned by the example handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The event did not have the expected structure.
    #[error("malformed event: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    /// The event had no record.
    #[error("event has no records")]
    NoRecords,

    /// A response handler was attached to a request trigger.
    #[error("event carries no response")]
    NoResponse,
}

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).try_init()
}

fn decode(event: Value) -> Result<EdgeEvent, HandlerError> {
    let event: EdgeEvent = serde_json::from_value(event)?;
    if event.records.is_empty() {
        return Err(HandlerError::NoRecords);
    }
    Ok(event)
}

fn into_request(event: EdgeEvent) -> Result<EdgeRequest, HandlerError> {
    event
        .records
        .into_iter()
        .next()
        .map(|record| record.cf.request)
        .ok_or(HandlerError::NoRecords)
}

fn into_response(event: EdgeEvent) -> Result<EdgeResponse, HandlerError> {
    event
        .records
        .into_iter()
        .next()
        .ok_or(HandlerError::NoRecords)?
        .cf
        .response
        .ok_or(HandlerError::NoResponse)
}

/// Rewrites `/legacy/<rest>` to `/v2/<rest>` and passes other requests through.
///
/// # Errors
///
/// Fails if the event cannot be decoded.
pub async fn redirect_legacy_paths(
    event: Value,
    _ctx: HandlerContext,
) -> Result<Value, HandlerError> {
    let mut request = into_request(decode(event)?)?;

    if let Some(rest) = request.uri.strip_prefix(LEGACY_PREFIX) {
        let rewritten = format!("{CURRENT_PREFIX}{rest}");
        tracing::info!(from = %request.uri, to = %rewritten, "Rewriting legacy path");
        request.uri = rewritten;
    }

    Ok(serde_json::to_value(request)?)
}

/// Sends `/static/*` requests to the asset bucket.
///
/// Works on the raw JSON: the origin block is replaced with an S3 origin
/// using origin access identity and the `host` header is pointed at the bucket.
///
/// # Errors
///
/// Fails if the event has no request.
pub async fn route_to_s3_origin(event: Value, _ctx: HandlerContext) -> Result<Value, HandlerError> {
    let mut request = event
        .pointer("/Records/0/cf/request")
        .cloned()
        .ok_or(HandlerError::NoRecords)?;

    let is_static = request["uri"]
        .as_str()
        .is_some_and(|uri| uri.starts_with(STATIC_PREFIX));
    if !is_static {
        return Ok(request);
    }

    tracing::info!(bucket = ASSET_BUCKET_DOMAIN, "Routing to asset bucket");
    request["origin"] = json!({
        "s3": {
            "authMethod": "origin-access-identity",
            "customHeaders": {},
            "domainName": ASSET_BUCKET_DOMAIN,
            "path": "/assets",
            "region": ASSET_BUCKET_REGION,
        }
    });
    request["headers"]["host"] = json!([{ "key": "Host", "value": ASSET_BUCKET_DOMAIN }]);

    Ok(request)
}

/// Appends [`SECURITY_HEADERS`] to the response.
///
/// # Errors
///
/// Fails if the event carries no response.
pub async fn add_security_headers(
    event: Value,
    _ctx: HandlerContext,
) -> Result<Value, HandlerError> {
    let mut response = into_response(decode(event)?)?;

    for (key, value) in SECURITY_HEADERS {
        response.headers.add(key, value);
    }
    tracing::debug!(status = %response.status, "Added security headers");

    Ok(serde_json::to_value(response)?)
}

/// Tags the request with [`PROCESSED_HEADER`], settling the callback from a
/// spawned task.
///
/// Must be called inside a tokio runtime.
pub fn callback_add_header(event: Value, _ctx: HandlerContext, callback: Callback) {
    tokio::spawn(async move {
        callback.done(tag_processed(event).map_err(Into::into));
    });
}

fn tag_processed(event: Value) -> Result<Value, HandlerError> {
    let mut request = into_request(decode(event)?)?;
    request.headers.add(PROCESSED_HEADER, "true");
    Ok(serde_json::to_value(request)?)
}

/// Returns the response with a status code CloudFront does not know.
///
/// # Errors
///
/// Fails if the event carries no response.
pub async fn broken_status_handler(
    event: Value,
    _ctx: HandlerContext,
) -> Result<Value, HandlerError> {
    let mut response = into_response(decode(event)?)?;
    response.status = "299".to_string();
    Ok(serde_json::to_value(response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_edge_event::{EdgeEventError, RequestEventBuilder, ResponseEventBuilder};

    #[tokio::test]
    async fn test_legacy_path_rewritten() {
        let mut builder = RequestEventBuilder::viewer_request();
        builder
            .uri("legacy/docs/index.html")
            .querystring("?lang=en");

        let request = builder.execute(redirect_legacy_paths).await.unwrap();
        assert_eq!(request["uri"], "/v2/docs/index.html");
        assert_eq!(request["querystring"], "lang=en");
    }

    #[tokio::test]
    async fn test_other_paths_untouched() {
        let mut builder = RequestEventBuilder::viewer_request();
        builder.uri("/about");

        let request = builder.execute(redirect_legacy_paths).await.unwrap();
        assert_eq!(request["uri"], "/about");
    }

    #[tokio::test]
    async fn test_static_requests_go_to_bucket() {
        let mut builder = RequestEventBuilder::origin_request();
        builder
            .uri("/static/app.js")
            .custom_origin("app.example.org", "/")
            .unwrap()
            .origin_read_timeout(30)
            .unwrap();

        let request = builder.execute(route_to_s3_origin).await.unwrap();
        assert_eq!(request["origin"]["s3"]["domainName"], ASSET_BUCKET_DOMAIN);
        assert!(request["origin"].get("custom").is_none());
        assert_eq!(request["headers"]["host"][0]["value"], ASSET_BUCKET_DOMAIN);
    }

    #[tokio::test]
    async fn test_security_headers_appended() {
        let mut builder = ResponseEventBuilder::origin_response();
        builder.response_header("Content-Type", "text/html");

        let response = builder.execute(add_security_headers).await.unwrap();
        assert_eq!(response["headers"]["x-frame-options"][0]["value"], "DENY");
        assert_eq!(response["headers"]["content-type"][0]["value"], "text/html");
    }

    #[tokio::test]
    async fn test_security_headers_need_a_response() {
        let builder = RequestEventBuilder::viewer_request();
        let err = builder.execute(add_security_headers).await.unwrap_err();
        assert!(matches!(err, EdgeEventError::Handler(_)));
        assert!(err.to_string().contains("event carries no response"));
    }

    #[tokio::test]
    async fn test_callback_handler_tags_request() {
        let builder = RequestEventBuilder::viewer_request();
        let request = builder.execute_callback(callback_add_header).await.unwrap();
        assert_eq!(
            request["headers"]["x-edge-processed"][0]["key"],
            PROCESSED_HEADER
        );
    }

    #[tokio::test]
    async fn test_broken_status_rejected() {
        let builder = ResponseEventBuilder::viewer_response();
        let err = builder.execute(broken_status_handler).await.unwrap_err();
        let EdgeEventError::Validation(err) = err else {
            panic!("expected a validation error, got {err:?}");
        };
        assert_eq!(err.path, "status");
        assert_eq!(err.found, "\"299\"");
    }

    #[test]
    fn test_malformed_event() {
        assert!(matches!(
            decode(json!({"Records": []})),
            Err(HandlerError::NoRecords)
        ));
        assert!(matches!(
            decode(json!({"records": 1})),
            Err(HandlerError::MalformedEvent(_))
        ));
    }
}
