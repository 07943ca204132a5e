//! Runs every example handler against a freshly built event and prints the
//! payload, or the reason it was rejected.
//!
//! Environment variables:
//! - `RUST_LOG` - log filter (default: info)
//! - `EDGE_EVENT_*` - event defaults, see `lambda_edge_event::config`

use edge_handler_example::{
    add_security_headers, broken_status_handler, callback_add_header, init_tracing,
    redirect_legacy_paths, route_to_s3_origin,
};
use lambda_edge_event::{EventDefaults, EventType, RequestEventBuilder, ResponseEventBuilder};
use serde_json::Value;

fn report(name: &str, result: lambda_edge_event::Result<Value>) {
    match result {
        Ok(payload) => println!("{name}: {payload:#}"),
        Err(err) => println!("{name}: rejected: {err}"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing()?;
    let defaults = EventDefaults::load()?;

    let mut viewer = RequestEventBuilder::with_defaults(EventType::ViewerRequest, &defaults)?;
    viewer.uri("/legacy/pricing.html");
    report(
        "redirect_legacy_paths",
        viewer.execute(redirect_legacy_paths).await,
    );
    report(
        "callback_add_header",
        viewer.execute_callback(callback_add_header).await,
    );

    let mut origin = RequestEventBuilder::with_defaults(EventType::OriginRequest, &defaults)?;
    origin
        .uri("/static/app.css")
        .custom_origin("app.example.org", "/")?
        .origin_read_timeout(30)?;
    report(
        "route_to_s3_origin",
        origin.execute(route_to_s3_origin).await,
    );

    let mut response = ResponseEventBuilder::with_defaults(EventType::OriginResponse, &defaults)?;
    response.response_header("Content-Type", "text/html");
    report(
        "add_security_headers",
        response.execute(add_security_headers).await,
    );
    report(
        "broken_status_handler",
        response.execute(broken_status_handler).await,
    );

    Ok(())
}
