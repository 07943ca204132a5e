//! Fixed enumerations shared by the event builder and the payload validators.
//!
//! Keeping these in one place means the values the builder writes are exactly
//! the values the validators accept.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four CloudFront lifecycle points a Lambda@Edge function can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    /// After CloudFront receives a request from a viewer.
    ViewerRequest,
    /// Before CloudFront forwards a request to the origin.
    OriginRequest,
    /// After CloudFront receives the response from the origin.
    OriginResponse,
    /// Before CloudFront returns the response to the viewer.
    ViewerResponse,
}

impl EventType {
    /// Returns the wire name, e.g. `"viewer-request"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewerRequest => "viewer-request",
            Self::OriginRequest => "origin-request",
            Self::OriginResponse => "origin-response",
            Self::ViewerResponse => "viewer-response",
        }
    }

    /// Origin-facing triggers carry the origin configuration in the request.
    pub fn has_origin(&self) -> bool {
        matches!(self, Self::OriginRequest | Self::OriginResponse)
    }

    /// Whether handlers for this trigger receive and return a response.
    pub fn is_response_trigger(&self) -> bool {
        matches!(self, Self::OriginResponse | Self::ViewerResponse)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP methods Lambda@Edge accepts on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `DELETE`
    Delete,
    /// `GET`
    #[default]
    Get,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `PATCH`
    Patch,
    /// `POST`
    Post,
    /// `PUT`
    Put,
}

impl HttpMethod {
    /// Every accepted method, in alphabetical order.
    pub const ALL: [HttpMethod; 7] = [
        Self::Delete,
        Self::Get,
        Self::Head,
        Self::Options,
        Self::Patch,
        Self::Post,
        Self::Put,
    ];

    /// Returns the method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = SchemaError;

    /// Matching is exact: `"get"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| SchemaError::InvalidHttpMethod(s.to_string()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SSL/TLS protocols CloudFront may negotiate with a custom origin.
///
/// Variant order is the canonical order used when writing protocol lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SslProtocol {
    /// `SSLv3`
    #[serde(rename = "SSLv3")]
    SslV3,
    /// `TLSv1`
    #[serde(rename = "TLSv1")]
    TlsV1,
    /// `TLSv1.1`
    #[serde(rename = "TLSv1.1")]
    TlsV1_1,
    /// `TLSv1.2`
    #[serde(rename = "TLSv1.2")]
    TlsV1_2,
}

impl SslProtocol {
    /// All protocols in canonical order.
    pub const ALL: [SslProtocol; 4] = [Self::SslV3, Self::TlsV1, Self::TlsV1_1, Self::TlsV1_2];

    /// Returns the protocol name as CloudFront spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SslV3 => "SSLv3",
            Self::TlsV1 => "TLSv1",
            Self::TlsV1_1 => "TLSv1.1",
            Self::TlsV1_2 => "TLSv1.2",
        }
    }

    /// Looks up a protocol by exact name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

/// What a handler may do with the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyAction {
    /// Body is informational only.
    #[default]
    ReadOnly,
    /// Handler replaces the body.
    Replace,
}

impl BodyAction {
    /// Accepted wire names.
    pub const NAMES: [&'static str; 2] = ["read-only", "replace"];
}

/// Encoding of `RequestBody::data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    /// Base64-encoded bytes.
    #[default]
    Base64,
    /// Plain text.
    Text,
}

impl BodyEncoding {
    /// Accepted wire names.
    pub const NAMES: [&'static str; 2] = ["base64", "text"];
}

/// Protocol CloudFront uses to reach a custom origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginProtocol {
    /// Plain HTTP.
    Http,
    /// HTTPS.
    #[default]
    Https,
}

impl OriginProtocol {
    /// Accepted wire names.
    pub const NAMES: [&'static str; 2] = ["http", "https"];
}

/// How CloudFront authenticates against an S3 origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum S3AuthMethod {
    /// Anonymous access.
    #[default]
    None,
    /// Signed with an origin access identity.
    OriginAccessIdentity,
}

impl S3AuthMethod {
    /// Accepted wire names.
    pub const NAMES: [&'static str; 2] = ["none", "origin-access-identity"];
}
