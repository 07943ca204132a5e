//! Structural validation of handler payloads.
//!
//! Handlers return arbitrary JSON, so validation works on [`serde_json::Value`]
//! rather than on the typed model. Every check asserts presence and type of one
//! field explicitly and the first failing check is reported with the dotted
//! path of the field, e.g. `origin.custom.readTimeout`.
//!
//! The `found` text of a violation renders scalars as JSON (`"TRACE"`, `8`,
//! `null`), containers as `an array` or `an object`, and a missing field as
//! `nothing`.
//!
//! Three shapes are supported:
//!
//! - [`validate_request`] for the request a request trigger returns
//! - [`validate_request_origin`] for the `origin` of an origin-request payload
//! - [`validate_response`] for the response a response trigger returns

use crate::error::ValidationError;
use crate::schema::{
    BodyAction, BodyEncoding, HttpMethod, OriginProtocol, S3AuthMethod, SslProtocol,
};
use crate::status::lookup_status;
use serde_json::{Map, Value};
use std::ops::RangeInclusive;

const ROOT_PATH: &str = "payload";
const KEEPALIVE_TIMEOUT_RANGE: RangeInclusive<f64> = 1.0..=60.0;
const READ_TIMEOUT_RANGE: RangeInclusive<f64> = 4.0..=60.0;
const EPHEMERAL_PORT_RANGE: RangeInclusive<f64> = 1024.0..=65535.0;

/// The payload shapes a handler may be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// A request returned from a request trigger.
    Request,
    /// The origin block of a request returned from an origin-request trigger.
    RequestOrigin,
    /// A response returned from a response trigger.
    Response,
}

/// Validates `payload` against `shape`.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate(shape: PayloadShape, payload: &Value) -> Result<(), ValidationError> {
    match shape {
        PayloadShape::Request => validate_request(payload),
        PayloadShape::RequestOrigin => validate_request_origin(payload),
        PayloadShape::Response => validate_response(payload),
    }
}

/// Validates a request payload.
///
/// Requires string `clientIp`, object `headers`, a supported `method`, string
/// `querystring` and a `uri` starting with `/`. An optional `body` must carry a
/// known `action` and `encoding`, string `data` and an `inputTruncated` field.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate_request(payload: &Value) -> Result<(), ValidationError> {
    let request = Fields::root(payload)?;

    request.string("clientIp")?;
    request.object("headers")?;

    let method = request.string("method")?;
    if method.parse::<HttpMethod>().is_err() {
        return Err(request.violation("method", "a supported HTTP method", quoted(method)));
    }

    request.string("querystring")?;

    let uri = request.string("uri")?;
    if !uri.starts_with('/') {
        return Err(request.violation("uri", "a path starting with `/`", quoted(uri)));
    }

    if request.has("body") {
        let body = request.object("body")?;
        body.one_of("action", &BodyAction::NAMES)?;
        body.string("data")?;
        body.one_of("encoding", &BodyEncoding::NAMES)?;
        body.present("inputTruncated")?;
    }

    Ok(())
}

/// Validates the `origin` block of an origin-request payload.
///
/// The origin must define exactly one of `custom` or `s3`.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate_request_origin(payload: &Value) -> Result<(), ValidationError> {
    let request = Fields::root(payload)?;
    let origin = request.object("origin")?;

    match (origin.has("custom"), origin.has("s3")) {
        (true, false) => validate_custom_origin(&origin.object("custom")?),
        (false, true) => validate_s3_origin(&origin.object("s3")?),
        (true, true) => Err(ValidationError::new(
            origin.prefix.clone(),
            "exactly one of `custom` or `s3`",
            "both",
        )),
        (false, false) => Err(ValidationError::new(
            origin.prefix.clone(),
            "exactly one of `custom` or `s3`",
            "neither",
        )),
    }
}

fn validate_custom_origin(custom: &Fields<'_>) -> Result<(), ValidationError> {
    custom.object("customHeaders")?;
    custom.domain_name()?;
    custom.number_in("keepaliveTimeout", KEEPALIVE_TIMEOUT_RANGE)?;
    custom.origin_path()?;

    let port = custom.number("port")?;
    if port != 80.0 && port != 443.0 && !EPHEMERAL_PORT_RANGE.contains(&port) {
        return Err(custom.violation("port", "80, 443 or 1024-65535", port));
    }

    custom.one_of("protocol", &OriginProtocol::NAMES)?;
    custom.number_in("readTimeout", READ_TIMEOUT_RANGE)?;

    let protocols = custom.present("sslProtocols")?;
    let Some(protocols) = protocols.as_array() else {
        return Err(custom.violation("sslProtocols", "an array", describe(protocols)));
    };
    for (idx, protocol) in protocols.iter().enumerate() {
        let known = protocol
            .as_str()
            .is_some_and(|name| SslProtocol::from_name(name).is_some());
        if !known {
            return Err(ValidationError::new(
                format!("{}.sslProtocols.{idx}", custom.prefix),
                "one of SSLv3, TLSv1, TLSv1.1, TLSv1.2",
                describe(protocol),
            ));
        }
    }

    Ok(())
}

fn validate_s3_origin(s3: &Fields<'_>) -> Result<(), ValidationError> {
    s3.one_of("authMethod", &S3AuthMethod::NAMES)?;
    s3.object("customHeaders")?;
    s3.domain_name()?;
    s3.origin_path()?;
    s3.string("region")?;
    Ok(())
}

/// Validates a response payload.
///
/// Requires object `headers`, string `statusDescription` and a string
/// `status` naming a known status code.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate_response(payload: &Value) -> Result<(), ValidationError> {
    let response = Fields::root(payload)?;

    response.object("headers")?;
    let status = response.string("status")?;
    response.string("statusDescription")?;

    if lookup_status(status).is_none() {
        return Err(response.violation("status", "a known HTTP status code", quoted(status)));
    }

    Ok(())
}

/// Whether `path` is a valid origin path: `/` itself, or starting with `/`
/// and not ending with one.
pub fn is_valid_origin_path(path: &str) -> bool {
    path.starts_with('/') && (path == "/" || !path.ends_with('/'))
}

/// A JSON object together with the path it was reached by.
struct Fields<'a> {
    prefix: String,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn root(payload: &'a Value) -> Result<Self, ValidationError> {
        match payload {
            Value::Object(map) => Ok(Self {
                prefix: String::new(),
                map,
            }),
            other => Err(ValidationError::new(
                ROOT_PATH,
                "an object",
                describe(other),
            )),
        }
    }

    fn path(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.prefix)
        }
    }

    fn violation(
        &self,
        name: &str,
        expected: &str,
        found: impl std::fmt::Display,
    ) -> ValidationError {
        ValidationError::new(self.path(name), expected, found.to_string())
    }

    fn has(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    fn present(&self, name: &str) -> Result<&'a Value, ValidationError> {
        self.map
            .get(name)
            .ok_or_else(|| self.violation(name, "a value", "nothing"))
    }

    fn object(&self, name: &str) -> Result<Fields<'a>, ValidationError> {
        match self.present(name)? {
            Value::Object(map) => Ok(Fields {
                prefix: self.path(name),
                map,
            }),
            other => Err(self.violation(name, "an object", describe(other))),
        }
    }

    fn string(&self, name: &str) -> Result<&'a str, ValidationError> {
        let value = self.present(name)?;
        value
            .as_str()
            .ok_or_else(|| self.violation(name, "a string", describe(value)))
    }

    fn number(&self, name: &str) -> Result<f64, ValidationError> {
        let value = self.present(name)?;
        value
            .as_f64()
            .ok_or_else(|| self.violation(name, "a number", describe(value)))
    }

    fn number_in(&self, name: &str, range: RangeInclusive<f64>) -> Result<f64, ValidationError> {
        let value = self.number(name)?;
        if !range.contains(&value) {
            let expected = format!("a number from {} to {}", range.start(), range.end());
            return Err(self.violation(name, &expected, value));
        }
        Ok(value)
    }

    fn one_of(&self, name: &str, allowed: &[&str]) -> Result<&'a str, ValidationError> {
        let value = self.string(name)?;
        if !allowed.contains(&value) {
            let expected = format!("one of {}", allowed.join(", "));
            return Err(self.violation(name, &expected, quoted(value)));
        }
        Ok(value)
    }

    fn domain_name(&self) -> Result<&'a str, ValidationError> {
        let domain_name = self.string("domainName")?;
        if domain_name.trim().is_empty() {
            return Err(self.violation(
                "domainName",
                "a non-empty domain name",
                quoted(domain_name),
            ));
        }
        Ok(domain_name)
    }

    fn origin_path(&self) -> Result<&'a str, ValidationError> {
        let path = self.string("path")?;
        if !is_valid_origin_path(path) {
            return Err(self.violation(
                "path",
                "`/` or a path starting with `/` without a trailing `/`",
                quoted(path),
            ));
        }
        Ok(path)
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
        scalar => scalar.to_string(),
    }
}

fn quoted(text: &str) -> String {
    describe(&Value::from(text))
}
