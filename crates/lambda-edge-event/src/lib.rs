//! # Lambda@Edge Event Builder
//!
//! Build CloudFront Lambda@Edge events and check what a handler returns,
//! without deploying to CloudFront.
//!
//! ## Overview
//!
//! An [`EventBuilder`] produces the `{"Records": [{"cf": ...}]}` document
//! CloudFront hands to a function for one of the four triggers, runs a handler
//! against it, and validates the handler's payload against the structure
//! CloudFront accepts for that trigger.
//!
//! ## Features
//!
//! - **Fluent mutators**: chainable setters with input normalization
//! - **Origin modes**: custom HTTP and S3 origins, with mode-checked setters
//! - **Payload validation**: first violation reported with its field path
//! - **Two handler conventions**: async handlers and callback handlers
//! - **Layered defaults**: figment-backed [`EventDefaults`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use lambda_edge_event::{BoxError, RequestEventBuilder};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut builder = RequestEventBuilder::viewer_request();
//!     builder
//!         .uri("/index.html")
//!         .request_header("Host", "example.org");
//!
//!     let payload = builder
//!         .execute(|event, _ctx| async move {
//!             let mut request = event["Records"][0]["cf"]["request"].clone();
//!             request["uri"] = json!("/home.html");
//!             Ok::<_, BoxError>(request)
//!         })
//!         .await?;
//!
//!     assert_eq!(payload["uri"], "/home.html");
//!     Ok(())
//! }
//! ```
//!
//! ## Callback Handlers
//!
//! Handlers written against a completion callback settle through a
//! [`Callback`]. Dropping the callback without calling it is an
//! [`InvocationError::CallbackDropped`].
//!
//! ```no_run
//! use lambda_edge_event::ResponseEventBuilder;
//!
//! # async fn run() -> Result<(), lambda_edge_event::EdgeEventError> {
//! let mut builder = ResponseEventBuilder::viewer_response();
//! builder.status(404);
//!
//! let payload = builder
//!     .execute_callback(|event, _ctx, callback| {
//!         callback.succeed(event["Records"][0]["cf"]["response"].clone());
//!     })
//!     .await?;
//! assert_eq!(payload["statusDescription"], "Not Found");
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events: `debug` around each handler run, `warn`
//! when a payload fails validation, `trace` for origin mode switches. Install
//! any subscriber to see them.

pub mod builder;
pub mod config;
pub mod error;
pub mod event;
pub mod graph;
pub mod headers;
pub mod invocation;
pub mod origin;
pub mod schema;
pub mod status;
pub mod validation;

pub use builder::{
    EventBuilder, Flavor, RequestEventBuilder, RequestFlavor, ResponseEventBuilder, ResponseFlavor,
};
pub use config::{EventDefaults, EventDefaultsBuilder};
pub use error::{
    BoxError, CycleError, EdgeEventError, InvocationError, Result, SchemaError, ValidationError,
};
pub use event::{
    EdgeEvent, EdgeRequest, EdgeResponse, EventConfig, EventDocument, EventRecord, RequestBody,
};
pub use graph::SharedValue;
pub use headers::{HeaderCollection, HeaderEntry};
pub use invocation::{Callback, HandlerContext, invoke, invoke_callback};
pub use origin::{CustomOrigin, IntegerInput, Origin, S3Origin};
pub use schema::{
    BodyAction, BodyEncoding, EventType, HttpMethod, OriginProtocol, S3AuthMethod, SslProtocol,
};
pub use status::{lookup_status, status_description};
pub use validation::{
    PayloadShape, validate, validate_request, validate_request_origin, validate_response,
};
