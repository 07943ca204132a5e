//! Origin configuration carried by origin-facing requests.
//!
//! An origin is either a generic HTTP server ([`CustomOrigin`]) or an S3
//! bucket ([`S3Origin`]), never both. On the wire this is an object with a
//! single `custom` or `s3` key, or an empty object before a mode is chosen.

use crate::headers::HeaderCollection;
use crate::schema::{OriginProtocol, S3AuthMethod, SslProtocol};
use serde::{Deserialize, Serialize};

/// Default keep-alive timeout in seconds.
pub const DEFAULT_KEEPALIVE_TIMEOUT: i64 = 1;
/// Default origin port.
pub const DEFAULT_PORT: i64 = 443;
/// Default read timeout in seconds.
pub const DEFAULT_READ_TIMEOUT: i64 = 4;

/// Origin of an origin-facing request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "OriginRepr", into = "OriginRepr")]
pub enum Origin {
    /// No mode chosen yet.
    #[default]
    Unset,
    /// Custom HTTP origin.
    Custom(CustomOrigin),
    /// S3 bucket origin.
    S3(S3Origin),
}

impl Origin {
    /// Short name of the current mode, used in error messages.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Unset => "no",
            Self::Custom(_) => "custom",
            Self::S3(_) => "s3",
        }
    }

    /// Custom headers of whichever mode is set.
    pub fn custom_headers_mut(&mut self) -> Option<&mut HeaderCollection> {
        match self {
            Self::Unset => None,
            Self::Custom(custom) => Some(&mut custom.custom_headers),
            Self::S3(s3) => Some(&mut s3.custom_headers),
        }
    }
}

/// A custom HTTP origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomOrigin {
    /// Headers CloudFront adds when forwarding to the origin.
    pub custom_headers: HeaderCollection,
    /// Origin host name.
    pub domain_name: String,
    /// Keep-alive timeout in seconds. Valid range 1-60.
    pub keepalive_timeout: i64,
    /// Path prefix on the origin.
    pub path: String,
    /// 80, 443 or 1024-65535.
    pub port: i64,
    /// Protocol used to reach the origin.
    pub protocol: OriginProtocol,
    /// Read timeout in seconds. Valid range 4-60.
    pub read_timeout: i64,
    /// Allowed protocols, canonical order, no duplicates.
    pub ssl_protocols: Vec<SslProtocol>,
}

impl CustomOrigin {
    /// Creates a custom origin with CloudFront's defaults.
    pub fn new(domain_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            custom_headers: HeaderCollection::new(),
            domain_name: domain_name.into(),
            keepalive_timeout: DEFAULT_KEEPALIVE_TIMEOUT,
            path: path.into(),
            port: DEFAULT_PORT,
            protocol: OriginProtocol::Https,
            read_timeout: DEFAULT_READ_TIMEOUT,
            ssl_protocols: Vec::new(),
        }
    }
}

/// An S3 bucket origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Origin {
    /// Authentication against the bucket.
    pub auth_method: S3AuthMethod,
    /// Headers CloudFront adds when forwarding to the bucket.
    pub custom_headers: HeaderCollection,
    /// Bucket host name.
    pub domain_name: String,
    /// Path prefix in the bucket.
    pub path: String,
    /// Bucket region; may be empty.
    pub region: String,
}

impl S3Origin {
    /// Creates an S3 origin with anonymous access.
    pub fn new(
        domain_name: impl Into<String>,
        region: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            auth_method: S3AuthMethod::None,
            custom_headers: HeaderCollection::new(),
            domain_name: domain_name.into(),
            path: path.into(),
            region: region.into(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OriginRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom: Option<CustomOrigin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    s3: Option<S3Origin>,
}

impl TryFrom<OriginRepr> for Origin {
    type Error = &'static str;

    fn try_from(repr: OriginRepr) -> Result<Self, Self::Error> {
        match (repr.custom, repr.s3) {
            (None, None) => Ok(Origin::Unset),
            (Some(custom), None) => Ok(Origin::Custom(custom)),
            (None, Some(s3)) => Ok(Origin::S3(s3)),
            (Some(_), Some(_)) => Err("origin must not define both `custom` and `s3`"),
        }
    }
}

impl From<Origin> for OriginRepr {
    fn from(origin: Origin) -> Self {
        match origin {
            Origin::Unset => OriginRepr::default(),
            Origin::Custom(custom) => OriginRepr {
                custom: Some(custom),
                s3: None,
            },
            Origin::S3(s3) => OriginRepr {
                custom: None,
                s3: Some(s3),
            },
        }
    }
}

/// Loosely typed integer input for the numeric origin setters.
///
/// Integers pass through. Text is read like a leading-integer parse: leading
/// whitespace and a sign are allowed, parsing stops at the first non-digit,
/// and text without any digits becomes `0`. Floats are truncated; NaN becomes
/// `0`. Nothing is range-checked here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerInput(i64);

impl IntegerInput {
    /// The coerced value.
    pub fn get(self) -> i64 {
        self.0
    }
}

macro_rules! integer_input_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for IntegerInput {
                fn from(value: $ty) -> Self {
                    Self(i64::from(value))
                }
            }
        )*
    };
}

integer_input_from!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for IntegerInput {
    fn from(value: f64) -> Self {
        // `as` saturates and maps NaN to 0
        Self(value.trunc() as i64)
    }
}

impl From<&str> for IntegerInput {
    fn from(value: &str) -> Self {
        Self(parse_leading_integer(value))
    }
}

impl From<String> for IntegerInput {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

fn parse_leading_integer(input: &str) -> i64 {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10)
                .saturating_add(i64::from(digit - b'0'))
        });

    if negative { -magnitude } else { magnitude }
}
