//! Error types for building edge events and validating handler payloads.

use thiserror::Error;

/// Boxed error returned by a handler under test.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error for event construction and handler execution.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EdgeEventError {
    /// A mutator received input the event schema cannot hold.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The handler returned a payload that violates the event schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The handler broke the invocation contract.
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// The handler itself reported a failure.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    /// The event could not be converted to JSON.
    #[error("failed to serialize event")]
    Serialization(#[from] serde_json::Error),

    /// Event defaults could not be loaded.
    #[error("configuration error")]
    Config(#[source] Box<figment::Error>),
}

impl From<figment::Error> for EdgeEventError {
    fn from(err: figment::Error) -> Self {
        EdgeEventError::Config(Box::new(err))
    }
}

/// Errors raised synchronously by event mutators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// HTTP method outside `DELETE GET HEAD OPTIONS PATCH POST PUT`.
    #[error("unsupported HTTP method: {0:?}")]
    InvalidHttpMethod(String),

    /// A setter for one origin mode was called while the other (or none) is set.
    #[error("origin mode mismatch: expected {expected} origin, found {found}")]
    OriginModeMismatch {
        /// Mode the setter requires.
        expected: &'static str,
        /// Mode currently configured.
        found: &'static str,
    },

    /// An origin setter was called on an event built without an origin.
    #[error("{0} events do not carry an origin")]
    OriginUnavailable(&'static str),

    /// A builder was asked to simulate a trigger of the other flavor.
    #[error("{event_type} events cannot be built by a {flavor} builder")]
    FlavorMismatch {
        /// Trigger that was requested.
        event_type: &'static str,
        /// Flavor of the builder.
        flavor: &'static str,
    },
}

/// The first schema violation found in a handler payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid payload field `{path}`: expected {expected}, found {found}")]
pub struct ValidationError {
    /// Dot-joined path of the offending field.
    pub path: String,
    /// The constraint the field must satisfy.
    pub expected: String,
    /// What the payload actually contained.
    pub found: String,
}

impl ValidationError {
    pub(crate) fn new(
        path: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Errors from the handler invocation contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// A callback-style handler dropped its callback without settling it.
    #[error("handler returned without invoking its callback")]
    CallbackDropped,
}

/// A shared value graph could not be flattened into a JSON tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value graph contains a cycle")]
pub struct CycleError;

/// Result type for edge event operations.
pub type Result<T> = std::result::Result<T, EdgeEventError>;
