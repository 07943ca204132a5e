//! Fluent construction of edge events and execution of handlers against them.
//!
//! [`EventBuilder`] owns one [`EventDocument`] and mutates it in place; every
//! mutator returns `&mut Self` so calls chain. The flavor parameter decides
//! which mutators exist: request builders can set a body, response builders
//! can set status and response headers.
//!
//! ```
//! use lambda_edge_event::RequestEventBuilder;
//!
//! # fn main() -> Result<(), lambda_edge_event::SchemaError> {
//! let mut builder = RequestEventBuilder::origin_request();
//! builder
//!     .uri("images/logo.png")
//!     .request_header("Host", "example.org")
//!     .http_method("HEAD")?
//!     .custom_origin("origin.example.org", "/")?
//!     .origin_port(8443)?;
//!
//! assert_eq!(builder.document().request.uri, "/images/logo.png");
//! # Ok(())
//! # }
//! ```

use crate::config::EventDefaults;
use crate::error::{BoxError, EdgeEventError, SchemaError, ValidationError};
use crate::event::{
    EdgeEvent, EdgeRequest, EdgeResponse, EventConfig, EventDocument, RequestBody,
    normalize_querystring, normalize_uri,
};
use crate::invocation::{self, Callback, HandlerContext};
use crate::origin::{CustomOrigin, IntegerInput, Origin, S3Origin};
use crate::schema::{EventType, HttpMethod, OriginProtocol, S3AuthMethod, SslProtocol};
use crate::validation::{validate_request, validate_request_origin, validate_response};
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;

mod private {
    pub trait Sealed {}
}

/// Selects the request or response variant of an [`EventBuilder`].
pub trait Flavor: private::Sealed {
    /// Short name used in error messages.
    const NAME: &'static str;

    /// Whether builders of this flavor can simulate `event_type`.
    fn accepts(event_type: EventType) -> bool;

    /// Adds the flavor's sub-documents to a fresh document.
    fn prepare(document: &mut EventDocument);

    /// Checks a payload returned by a handler for this flavor.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    fn check_payload(document: &EventDocument, payload: &Value) -> Result<(), ValidationError>;
}

/// Builds events for viewer-request and origin-request triggers.
#[derive(Debug, Clone, Copy)]
pub struct RequestFlavor;

/// Builds events for origin-response and viewer-response triggers.
#[derive(Debug, Clone, Copy)]
pub struct ResponseFlavor;

impl private::Sealed for RequestFlavor {}
impl private::Sealed for ResponseFlavor {}

impl Flavor for RequestFlavor {
    const NAME: &'static str = "request";

    fn accepts(event_type: EventType) -> bool {
        !event_type.is_response_trigger()
    }

    fn prepare(document: &mut EventDocument) {
        document.request.body = Some(RequestBody::read_only("", false));
    }

    fn check_payload(document: &EventDocument, payload: &Value) -> Result<(), ValidationError> {
        validate_request(payload)?;
        if document.request.origin.is_some() {
            validate_request_origin(payload)?;
        }
        Ok(())
    }
}

impl Flavor for ResponseFlavor {
    const NAME: &'static str = "response";

    fn accepts(event_type: EventType) -> bool {
        event_type.is_response_trigger()
    }

    fn prepare(document: &mut EventDocument) {
        document.response = Some(EdgeResponse::default());
    }

    fn check_payload(_document: &EventDocument, payload: &Value) -> Result<(), ValidationError> {
        validate_response(payload)
    }
}

/// Builder for request-trigger events.
pub type RequestEventBuilder = EventBuilder<RequestFlavor>;

/// Builder for response-trigger events.
pub type ResponseEventBuilder = EventBuilder<ResponseFlavor>;

/// Owns and mutates one edge event document.
#[derive(Debug, Clone)]
pub struct EventBuilder<F: Flavor> {
    document: EventDocument,
    flavor: PhantomData<F>,
}

impl<F: Flavor> EventBuilder<F> {
    /// Creates a builder for `event_type`, with an origin for origin triggers.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::FlavorMismatch`] if this flavor cannot simulate
    /// `event_type`.
    pub fn new(event_type: EventType) -> Result<Self, SchemaError> {
        Self::with_origin(event_type, event_type.has_origin())
    }

    /// Creates a builder, choosing explicitly whether the request has an origin.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::FlavorMismatch`] if this flavor cannot simulate
    /// `event_type`.
    pub fn with_origin(event_type: EventType, has_origin: bool) -> Result<Self, SchemaError> {
        if !F::accepts(event_type) {
            return Err(SchemaError::FlavorMismatch {
                event_type: event_type.as_str(),
                flavor: F::NAME,
            });
        }
        Ok(Self::create(event_type, has_origin))
    }

    /// Creates a builder seeded from configured defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::FlavorMismatch`] if this flavor cannot simulate
    /// `event_type`.
    pub fn with_defaults(
        event_type: EventType,
        defaults: &EventDefaults,
    ) -> Result<Self, SchemaError> {
        let mut builder = Self::new(event_type)?;
        builder.client_ip(&defaults.client_ip).uri(&defaults.uri);

        let config = &mut builder.document.config;
        config.distribution_domain_name = defaults.distribution_domain_name.clone();
        config.distribution_id = defaults.distribution_id.clone();
        config.request_id = defaults.resolve_request_id();

        Ok(builder)
    }

    fn create(event_type: EventType, has_origin: bool) -> Self {
        let mut document = EventDocument {
            config: EventConfig::new(event_type),
            request: EdgeRequest {
                origin: has_origin.then(Origin::default),
                ..EdgeRequest::default()
            },
            response: None,
        };
        F::prepare(&mut document);

        Self {
            document,
            flavor: PhantomData,
        }
    }

    /// The document as built so far.
    pub fn document(&self) -> &EventDocument {
        &self.document
    }

    /// The trigger this event simulates.
    pub fn event_type(&self) -> EventType {
        self.document.config.event_type
    }

    /// Whether the request carries an origin.
    pub fn has_origin(&self) -> bool {
        self.document.request.origin.is_some()
    }

    /// A copy of the document in the `Records` envelope.
    pub fn to_event(&self) -> EdgeEvent {
        EdgeEvent::new(self.document.clone())
    }

    /// The event as JSON, exactly as a handler receives it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_value(&self) -> Result<Value, EdgeEventError> {
        Ok(serde_json::to_value(self.to_event())?)
    }

    /// Sets `config.distributionDomainName`.
    pub fn distribution_domain_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.document.config.distribution_domain_name = Some(name.into());
        self
    }

    /// Sets `config.distributionId`.
    pub fn distribution_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.document.config.distribution_id = Some(id.into());
        self
    }

    /// Sets `config.requestId`.
    pub fn request_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.document.config.request_id = Some(id.into());
        self
    }

    /// Sets `request.clientIp`. No validation.
    pub fn client_ip(&mut self, ip: impl Into<String>) -> &mut Self {
        self.document.request.client_ip = ip.into();
        self
    }

    /// Appends a request header.
    pub fn request_header(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> &mut Self {
        self.document.request.headers.add(key, value);
        self
    }

    /// Sets `request.method`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidHttpMethod`] unless `method` is one of
    /// `DELETE GET HEAD OPTIONS PATCH POST PUT`.
    pub fn http_method(&mut self, method: &str) -> Result<&mut Self, SchemaError> {
        let method: HttpMethod = method.parse()?;
        tracing::trace!(%method, "Setting request method");
        self.document.request.method = method;
        Ok(self)
    }

    /// Sets `request.querystring`, dropping leading `?` and whitespace.
    pub fn querystring(&mut self, querystring: &str) -> &mut Self {
        self.document.request.querystring = normalize_querystring(querystring);
        self
    }

    /// Sets `request.uri` with exactly one leading `/`.
    pub fn uri(&mut self, uri: &str) -> &mut Self {
        self.document.request.uri = normalize_uri(uri);
        self
    }

    fn origin_mut(&mut self) -> Result<&mut Origin, SchemaError> {
        let event_type = self.document.config.event_type;
        self.document
            .request
            .origin
            .as_mut()
            .ok_or(SchemaError::OriginUnavailable(event_type.as_str()))
    }

    fn custom_origin_mut(&mut self) -> Result<&mut CustomOrigin, SchemaError> {
        match self.origin_mut()? {
            Origin::Custom(custom) => Ok(custom),
            other => Err(SchemaError::OriginModeMismatch {
                expected: "custom",
                found: other.mode(),
            }),
        }
    }

    fn s3_origin_mut(&mut self) -> Result<&mut S3Origin, SchemaError> {
        match self.origin_mut()? {
            Origin::S3(s3) => Ok(s3),
            other => Err(SchemaError::OriginModeMismatch {
                expected: "s3",
                found: other.mode(),
            }),
        }
    }

    /// Replaces the origin with a fresh custom origin.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::OriginUnavailable`] if the event has no origin.
    pub fn custom_origin(
        &mut self,
        domain_name: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<&mut Self, SchemaError> {
        let origin = self.origin_mut()?;
        *origin = Origin::Custom(CustomOrigin::new(domain_name, path));
        tracing::trace!("Switched to custom origin");
        Ok(self)
    }

    /// Sets the custom origin keep-alive timeout. Not range-checked.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] unless a custom origin is set.
    pub fn origin_keepalive_timeout(
        &mut self,
        seconds: impl Into<IntegerInput>,
    ) -> Result<&mut Self, SchemaError> {
        self.custom_origin_mut()?.keepalive_timeout = seconds.into().get();
        Ok(self)
    }

    /// Sets the custom origin port. Not range-checked.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] unless a custom origin is set.
    pub fn origin_port(&mut self, port: impl Into<IntegerInput>) -> Result<&mut Self, SchemaError> {
        self.custom_origin_mut()?.port = port.into().get();
        Ok(self)
    }

    /// Chooses `https` (`true`) or `http` for the custom origin.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] unless a custom origin is set.
    pub fn origin_https(&mut self, use_https: bool) -> Result<&mut Self, SchemaError> {
        self.custom_origin_mut()?.protocol = if use_https {
            OriginProtocol::Https
        } else {
            OriginProtocol::Http
        };
        Ok(self)
    }

    /// Sets the custom origin read timeout. Not range-checked.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] unless a custom origin is set.
    pub fn origin_read_timeout(
        &mut self,
        seconds: impl Into<IntegerInput>,
    ) -> Result<&mut Self, SchemaError> {
        self.custom_origin_mut()?.read_timeout = seconds.into().get();
        Ok(self)
    }

    /// Sets the custom origin SSL protocols.
    ///
    /// Unknown names are dropped and the result is in canonical order
    /// (`SSLv3, TLSv1, TLSv1.1, TLSv1.2`) without duplicates, whatever the
    /// input order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] unless a custom origin is set.
    pub fn origin_ssl_protocols<I, S>(&mut self, protocols: I) -> Result<&mut Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: Vec<SslProtocol> = protocols
            .into_iter()
            .filter_map(|name| SslProtocol::from_name(name.as_ref()))
            .collect();

        self.custom_origin_mut()?.ssl_protocols = SslProtocol::ALL
            .into_iter()
            .filter(|protocol| requested.contains(protocol))
            .collect();
        Ok(self)
    }

    /// Replaces the origin with a fresh S3 origin using anonymous access.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::OriginUnavailable`] if the event has no origin.
    pub fn s3_origin(
        &mut self,
        domain_name: impl Into<String>,
        region: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<&mut Self, SchemaError> {
        let origin = self.origin_mut()?;
        *origin = Origin::S3(S3Origin::new(domain_name, region, path));
        tracing::trace!("Switched to s3 origin");
        Ok(self)
    }

    /// Toggles origin access identity authentication on the S3 origin.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] unless an S3 origin is set.
    pub fn origin_access_identity(&mut self, enabled: bool) -> Result<&mut Self, SchemaError> {
        self.s3_origin_mut()?.auth_method = if enabled {
            S3AuthMethod::OriginAccessIdentity
        } else {
            S3AuthMethod::None
        };
        Ok(self)
    }

    /// Appends a custom header to whichever origin mode is set.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if no origin mode is set.
    pub fn origin_custom_header(
        &mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<&mut Self, SchemaError> {
        let Some(headers) = self.origin_mut()?.custom_headers_mut() else {
            return Err(SchemaError::OriginModeMismatch {
                expected: "custom or s3",
                found: "no",
            });
        };
        headers.add(key, value);
        Ok(self)
    }

    /// Runs a handler that returns its payload through a future.
    ///
    /// The handler receives a fresh JSON copy of the event, so nothing it does
    /// affects this builder. Its payload is validated for this flavor and
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Fails if the handler fails or its payload is invalid.
    pub async fn execute<H, Fut, E>(&self, handler: H) -> Result<Value, EdgeEventError>
    where
        H: FnOnce(Value, HandlerContext) -> Fut,
        Fut: Future<Output = Result<Value, E>>,
        E: Into<BoxError>,
    {
        let event = self.to_value()?;
        tracing::debug!(event_type = %self.event_type(), "Invoking edge handler");

        let payload = invocation::invoke(handler, event).await?;
        self.check(payload)
    }

    /// Runs a callback-style handler.
    ///
    /// Same contract as [`execute`](Self::execute), except the handler settles
    /// through a [`Callback`].
    ///
    /// # Errors
    ///
    /// Fails if the handler fails, drops its callback, or returns an invalid
    /// payload.
    pub async fn execute_callback<H>(&self, handler: H) -> Result<Value, EdgeEventError>
    where
        H: FnOnce(Value, HandlerContext, Callback),
    {
        let event = self.to_value()?;
        tracing::debug!(event_type = %self.event_type(), "Invoking callback edge handler");

        let payload = invocation::invoke_callback(handler, event).await?;
        self.check(payload)
    }

    fn check(&self, payload: Value) -> Result<Value, EdgeEventError> {
        if let Err(err) = F::check_payload(&self.document, &payload) {
            tracing::warn!(
                event_type = %self.event_type(),
                path = %err.path,
                "Handler returned an invalid payload"
            );
            return Err(EdgeEventError::Validation(err));
        }

        tracing::debug!(event_type = %self.event_type(), "Handler payload valid");
        Ok(payload)
    }
}

impl EventBuilder<RequestFlavor> {
    /// Builder for a viewer-request event.
    pub fn viewer_request() -> Self {
        Self::create(EventType::ViewerRequest, false)
    }

    /// Builder for an origin-request event, with an unset origin.
    pub fn origin_request() -> Self {
        Self::create(EventType::OriginRequest, true)
    }

    /// Sets a read-only, base64-encoded request body.
    pub fn body(&mut self, content: impl AsRef<[u8]>, input_truncated: bool) -> &mut Self {
        self.document.request.body = Some(RequestBody::read_only(content, input_truncated));
        self
    }
}

impl EventBuilder<ResponseFlavor> {
    /// Builder for a viewer-response event.
    pub fn viewer_response() -> Self {
        Self::create(EventType::ViewerResponse, false)
    }

    /// Builder for an origin-response event, with an unset origin.
    pub fn origin_response() -> Self {
        Self::create(EventType::OriginResponse, true)
    }

    fn response_mut(&mut self) -> &mut EdgeResponse {
        self.document
            .response
            .get_or_insert_with(EdgeResponse::default)
    }

    /// Appends a response header.
    pub fn response_header(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> &mut Self {
        self.response_mut().headers.add(key, value);
        self
    }

    /// Sets the response status and its description.
    ///
    /// Unknown codes are accepted with an empty description.
    pub fn status(&mut self, code: u16) -> &mut Self {
        self.response_mut().set_status(code);
        self
    }
}
