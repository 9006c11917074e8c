//! The single-shot result cell shared by a promise/future pair.
//!
//! [`FutureState`] holds exactly one of four variants at any time:
//!
//! - `Pending`: no result yet
//! - `Value(T)`: the successful payload
//! - `Failed(Exception)`: the failure payload
//! - `Invalid`: a moved-from sentinel; no further operation permitted
//!
//! Transitions are `Pending -> Value | Failed`, then `-> Invalid` when the
//! content is consumed. A value or exception is never written twice; misuse
//! is a programming error and panics.

use crate::error::Exception;
use std::fmt;
use std::mem;

enum State<T> {
    Pending,
    Value(T),
    Failed(Exception),
    Invalid,
}

/// The storage cell carrying the eventual result of one asynchronous
/// operation.
///
/// The cell is movable but not copyable. It lives in one of three places
/// over its lifetime: the rendezvous cell owned jointly by a promise/future
/// pair, a detached future's own storage, or inside a scheduled continuation
/// task.
pub struct FutureState<T>(State<T>);

impl<T> Default for FutureState<T> {
    fn default() -> Self {
        Self::pending()
    }
}

impl<T> FutureState<T> {
    /// A cell with no result yet.
    #[must_use]
    pub const fn pending() -> Self {
        Self(State::Pending)
    }

    /// A cell already holding a successful value.
    #[must_use]
    pub fn of(value: T) -> Self {
        Self(State::Value(value))
    }

    /// A cell already holding a failure.
    #[must_use]
    pub fn failed(exception: Exception) -> Self {
        Self(State::Failed(exception))
    }

    /// The moved-from sentinel.
    #[must_use]
    pub(crate) const fn invalid() -> Self {
        Self(State::Invalid)
    }

    /// True once a value or an exception is present.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self.0, State::Value(_) | State::Failed(_))
    }

    /// True once an exception is present.
    #[must_use]
    pub const fn has_failed(&self) -> bool {
        matches!(self.0, State::Failed(_))
    }

    /// True while no result has been produced.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.0, State::Pending)
    }

    /// True once the content has been consumed.
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        matches!(self.0, State::Invalid)
    }

    /// Stores a successful value.
    ///
    /// # Panics
    ///
    /// Panics unless the cell is pending; writing a resolved cell is a
    /// programming error.
    pub fn set_value(&mut self, value: T) {
        assert!(
            self.is_pending(),
            "set_value on a future state that is not pending"
        );
        self.0 = State::Value(value);
    }

    /// Stores a failure.
    ///
    /// # Panics
    ///
    /// Panics unless the cell is pending.
    pub fn set_exception(&mut self, exception: Exception) {
        assert!(
            self.is_pending(),
            "set_exception on a future state that is not pending"
        );
        self.0 = State::Failed(exception);
    }

    /// Installs the broken-promise sentinel exception.
    ///
    /// Used when a promise is dropped without publishing a result while
    /// something was still waiting.
    ///
    /// # Panics
    ///
    /// Panics unless the cell is pending.
    pub fn set_to_broken_promise(&mut self) {
        self.set_exception(Exception::broken_promise());
    }

    /// Consumes the content, leaving the cell `Invalid`.
    ///
    /// # Panics
    ///
    /// Panics unless the cell is available.
    pub fn take(&mut self) -> Result<T, Exception> {
        self.take_state().into_result()
    }

    /// Moves the whole available state out, leaving the cell `Invalid`.
    ///
    /// # Panics
    ///
    /// Panics unless the cell is available.
    pub(crate) fn take_state(&mut self) -> Self {
        assert!(
            self.is_available(),
            "take on a future state that is not available"
        );
        mem::replace(self, Self::invalid())
    }

    /// Consumes an owned available cell into a result.
    ///
    /// # Panics
    ///
    /// Panics unless the cell is available.
    pub fn into_result(self) -> Result<T, Exception> {
        match self.0 {
            State::Value(value) => Ok(value),
            State::Failed(exception) => Err(exception),
            State::Pending | State::Invalid => {
                panic!("into_result on a future state that is not available")
            }
        }
    }

    /// Observes the content without consuming it.
    ///
    /// The value is returned by clone; the exception by handle copy.
    ///
    /// # Panics
    ///
    /// Panics unless the cell is available.
    pub fn peek(&self) -> Result<T, Exception>
    where
        T: Clone,
    {
        match &self.0 {
            State::Value(value) => Ok(value.clone()),
            State::Failed(exception) => Err(exception.clone()),
            State::Pending | State::Invalid => {
                panic!("peek on a future state that is not available")
            }
        }
    }

    /// Peeks the exception, if one is present.
    #[must_use]
    pub fn peek_exception(&self) -> Option<&Exception> {
        match &self.0 {
            State::Failed(exception) => Some(exception),
            _ => None,
        }
    }

    /// Discards the content, leaving the cell `Invalid`.
    ///
    /// # Panics
    ///
    /// Panics unless the cell is available.
    pub fn ignore(&mut self) {
        assert!(
            self.is_available(),
            "ignore on a future state that is not available"
        );
        self.0 = State::Invalid;
    }
}

impl<T> fmt::Debug for FutureState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            State::Pending => "Pending",
            State::Value(_) => "Value",
            State::Failed(_) => "Failed",
            State::Invalid => "Invalid",
        };
        f.debug_tuple("FutureState").field(&name).finish()
    }
}
