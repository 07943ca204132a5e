//! Lambda@Edge event model.
//!
//! The wire shape handed to a handler is
//!
//! ```json
//! { "Records": [ { "cf": { "config": {...}, "request": {...}, "response": {...} } } ] }
//! ```
//!
//! All types serialize to the camelCase field names CloudFront uses and can be
//! decoded again, so a handler may work on [`EdgeEvent`] instead of raw JSON.

use crate::headers::HeaderCollection;
use crate::origin::Origin;
use crate::schema::{BodyAction, BodyEncoding, EventType, HttpMethod};
use crate::status::status_description;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// Default viewer address.
pub const DEFAULT_CLIENT_IP: &str = "127.0.0.1";

/// Top-level event envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeEvent {
    /// Always a single record for Lambda@Edge.
    #[serde(rename = "Records")]
    pub records: Vec<EventRecord>,
}

impl EdgeEvent {
    /// Wraps a document in the single-record envelope.
    pub fn new(document: EventDocument) -> Self {
        Self {
            records: vec![EventRecord { cf: document }],
        }
    }

    /// The document of the first record.
    pub fn document(&self) -> Option<&EventDocument> {
        self.records.first().map(|record| &record.cf)
    }
}

/// One record of the envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// The CloudFront document.
    pub cf: EventDocument,
}

/// The `cf` document: distribution config, request and optional response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDocument {
    /// Distribution and trigger metadata.
    pub config: EventConfig,
    /// The viewer or origin request.
    pub request: EdgeRequest,
    /// Present for response triggers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<EdgeResponse>,
}

/// Distribution metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventConfig {
    /// e.g. `d111111abcdef8.cloudfront.net`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_domain_name: Option<String>,
    /// e.g. `EDFDVBD6EXAMPLE`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_id: Option<String>,
    /// The trigger this event simulates.
    pub event_type: EventType,
    /// CloudFront request id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl EventConfig {
    /// Config with only the trigger set.
    pub fn new(event_type: EventType) -> Self {
        Self {
            distribution_domain_name: None,
            distribution_id: None,
            event_type,
            request_id: None,
        }
    }
}

/// The request CloudFront hands to the function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRequest {
    /// Viewer IP address.
    pub client_ip: String,
    /// Request headers.
    pub headers: HeaderCollection,
    /// HTTP method.
    pub method: HttpMethod,
    /// Query string without the leading `?`.
    pub querystring: String,
    /// Path, always with exactly one leading `/`.
    pub uri: String,
    /// Request body, request triggers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
    /// Origin configuration, origin triggers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
}

impl Default for EdgeRequest {
    fn default() -> Self {
        Self {
            client_ip: DEFAULT_CLIENT_IP.to_string(),
            headers: HeaderCollection::new(),
            method: HttpMethod::Get,
            querystring: String::new(),
            uri: "/".to_string(),
            body: None,
            origin: None,
        }
    }
}

/// Request body as exposed to the function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    /// Whether the function may replace the body.
    pub action: BodyAction,
    /// Body content, encoded as `encoding` says.
    pub data: String,
    /// Encoding of `data`.
    pub encoding: BodyEncoding,
    /// Whether CloudFront truncated the body.
    pub input_truncated: bool,
}

impl RequestBody {
    /// Read-only, base64-encoded body for `content`.
    pub fn read_only(content: impl AsRef<[u8]>, input_truncated: bool) -> Self {
        Self {
            action: BodyAction::ReadOnly,
            data: STANDARD.encode(content),
            encoding: BodyEncoding::Base64,
            input_truncated,
        }
    }
}

/// The response a response trigger receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResponse {
    /// Status code in decimal, e.g. `"200"`.
    pub status: String,
    /// Reason phrase from the status table, empty for unknown codes.
    pub status_description: String,
    /// Response headers.
    pub headers: HeaderCollection,
}

impl EdgeResponse {
    /// Response with the given status and no headers.
    pub fn with_status(code: u16) -> Self {
        let mut response = Self {
            status: String::new(),
            status_description: String::new(),
            headers: HeaderCollection::new(),
        };
        response.set_status(code);
        response
    }

    /// Sets `status` and looks up `statusDescription`.
    pub fn set_status(&mut self, code: u16) {
        self.status = code.to_string();
        self.status_description = status_description(code).unwrap_or_default().to_string();
    }
}

impl Default for EdgeResponse {
    fn default() -> Self {
        Self::with_status(200)
    }
}

/// Strips a leading run of `/` and whitespace plus trailing whitespace, then
/// prefixes exactly one `/`.
pub fn normalize_uri(uri: &str) -> String {
    let path = uri
        .trim_start_matches(|c: char| c == '/' || c.is_whitespace())
        .trim_end();
    format!("/{path}")
}

/// Strips a leading run of `?` and whitespace plus trailing whitespace.
pub fn normalize_querystring(querystring: &str) -> String {
    querystring
        .trim_start_matches(|c: char| c == '?' || c.is_whitespace())
        .trim_end()
        .to_string()
}
