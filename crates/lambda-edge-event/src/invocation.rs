//! Handler invocation.
//!
//! Two calling conventions are supported, each with its own entry point:
//!
//! - [`invoke`] for handlers returning a future of the payload
//! - [`invoke_callback`] for handlers that report through a [`Callback`]
//!
//! Both hand the handler the event and an empty [`HandlerContext`].

use crate::error::{BoxError, EdgeEventError, InvocationError};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use tokio::sync::oneshot;

/// Context passed to every handler. Lambda@Edge handlers get no useful
/// context fields, so this is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HandlerContext {}

/// Completion handle for callback-style handlers.
///
/// The handler settles the invocation by calling [`Callback::done`] (or one
/// of its shorthands) exactly once; `done` consumes the callback. The handle
/// may be moved to another task. Dropping it without settling fails the
/// invocation with [`InvocationError::CallbackDropped`].
#[derive(Debug)]
#[must_use = "the invocation only settles once the callback is called"]
pub struct Callback {
    sender: oneshot::Sender<Result<Value, BoxError>>,
}

impl Callback {
    /// Settles the invocation with a payload or an error.
    pub fn done(self, result: Result<Value, BoxError>) {
        // The receiver only disappears if the caller stopped awaiting.
        let _ = self.sender.send(result);
    }

    /// Settles the invocation with a payload.
    pub fn succeed(self, payload: Value) {
        self.done(Ok(payload));
    }

    /// Settles the invocation with an error.
    pub fn fail(self, err: impl Into<BoxError>) {
        self.done(Err(err.into()));
    }
}

/// Invokes a handler that returns its payload through a future.
///
/// # Errors
///
/// Returns [`EdgeEventError::Handler`] if the handler resolves to an error.
pub async fn invoke<H, Fut, E>(handler: H, event: Value) -> Result<Value, EdgeEventError>
where
    H: FnOnce(Value, HandlerContext) -> Fut,
    Fut: Future<Output = Result<Value, E>>,
    E: Into<BoxError>,
{
    handler(event, HandlerContext::default())
        .await
        .map_err(|err| EdgeEventError::Handler(err.into()))
}

/// Invokes a handler that reports through a [`Callback`].
///
/// # Errors
///
/// Returns [`EdgeEventError::Handler`] if the handler settles with an error,
/// or [`InvocationError::CallbackDropped`] if it never settles the callback.
pub async fn invoke_callback<H>(handler: H, event: Value) -> Result<Value, EdgeEventError>
where
    H: FnOnce(Value, HandlerContext, Callback),
{
    let (sender, receiver) = oneshot::channel();
    handler(event, HandlerContext::default(), Callback { sender });

    match receiver.await {
        Ok(Ok(payload)) => Ok(payload),
        Ok(Err(err)) => Err(EdgeEventError::Handler(err)),
        Err(_) => Err(InvocationError::CallbackDropped.into()),
    }
}
