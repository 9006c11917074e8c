//! Error types and the opaque exception handle.
//!
//! The core transports failures as [`Exception`] values: cheaply cloneable,
//! type-erased handles that can carry any user error across a promise/future
//! rendezvous. Error handling follows these principles:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - "Rethrow" is an ordinary `Err(Exception)` returned from `get`
//! - Failures compose causally: a cleanup failure can carry the original
//!   failure as a nested cause

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Sentinel error delivered when a promise is dropped before resolving while
/// a future, continuation, or parked fiber was still waiting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("broken promise")]
pub struct BrokenPromise;

/// Ad-hoc text error for failures that have no dedicated type.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct MessageError(String);

/// An opaque, transferable exception handle.
///
/// `Exception` is the unit of failure transported by promises and futures.
/// Cloning copies the handle, not the payload; the same underlying error may
/// be observed from several points of a chain. The payload is any
/// `std::error::Error + Send + Sync` value and can be recovered with
/// [`Exception::downcast_ref`].
///
/// `Exception` deliberately does not implement `std::error::Error` itself,
/// which keeps the blanket `From<E>` conversion below coherent.
#[derive(Debug, Clone)]
pub struct Exception {
    payload: Arc<dyn StdError + Send + Sync>,
    nested: Option<Arc<Exception>>,
}

impl Exception {
    /// Wraps an arbitrary error value into an exception handle.
    #[must_use]
    pub fn new(error: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            payload: Arc::new(error),
            nested: None,
        }
    }

    /// Builds an exception from a plain message.
    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self::new(MessageError(text.into()))
    }

    /// The broken-promise sentinel exception.
    #[must_use]
    pub fn broken_promise() -> Self {
        Self::new(BrokenPromise)
    }

    /// Attaches `cause` as the nested cause of this exception.
    ///
    /// Used when a cleanup step fails after an original failure: the cleanup
    /// exception is the outer one, the original becomes the nested cause.
    #[must_use]
    pub fn with_nested(self, cause: Self) -> Self {
        Self {
            payload: self.payload,
            nested: Some(Arc::new(cause)),
        }
    }

    /// Returns a reference to the payload if it is of type `E`.
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.payload.as_ref().downcast_ref::<E>()
    }

    /// Returns true if the payload is of type `E`.
    #[must_use]
    pub fn is<E: StdError + 'static>(&self) -> bool {
        self.downcast_ref::<E>().is_some()
    }

    /// Returns true if this is the broken-promise sentinel.
    #[must_use]
    pub fn is_broken_promise(&self) -> bool {
        self.is::<BrokenPromise>()
    }

    /// The nested cause, if one was attached.
    #[must_use]
    pub fn nested(&self) -> Option<&Self> {
        self.nested.as_deref()
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.payload)?;
        if let Some(nested) = &self.nested {
            write!(f, " (nested: {nested})")?;
        }
        Ok(())
    }
}

impl<E: StdError + Send + Sync + 'static> From<E> for Exception {
    fn from(error: E) -> Self {
        Self::new(error)
    }
}
