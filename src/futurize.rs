//! Uniform adaptation of callable return types into futures.
//!
//! [`Futurize`] is the one place where "what did the callback return" is
//! decided. Three return categories exist, dispatched by type:
//!
//! - a [`Future`]: passed through unchanged
//! - a `Result`: `Ok` becomes a ready future, `Err` becomes an exception
//!   future (this is the fallible-callback channel)
//! - unit: becomes a ready unit future
//!
//! Every chaining combinator defers to this trait instead of inspecting
//! results itself.

use crate::error::Exception;
use crate::future::{make_exception_future, make_ready_future, Future};

/// Lifts a callback return value into a future.
pub trait Futurize {
    /// The value type of the resulting future.
    type Value: 'static;

    /// Wraps `self` into a future.
    fn futurize(self) -> Future<Self::Value>;
}

impl<T: 'static> Futurize for Future<T> {
    type Value = T;

    fn futurize(self) -> Self {
        self
    }
}

impl<T: 'static, E: Into<Exception>> Futurize for Result<T, E> {
    type Value = T;

    fn futurize(self) -> Future<T> {
        match self {
            Ok(value) => make_ready_future(value),
            Err(error) => make_exception_future(error),
        }
    }
}

impl Futurize for () {
    type Value = ();

    fn futurize(self) -> Future<()> {
        make_ready_future(())
    }
}

/// Invokes a one-argument callable and wraps its result.
pub fn apply<F, A, R>(func: F, arg: A) -> Future<R::Value>
where
    F: FnOnce(A) -> R,
    R: Futurize,
{
    func(arg).futurize()
}

/// Invokes a zero-argument callable and wraps its result.
pub fn invoke<F, R>(func: F) -> Future<R::Value>
where
    F: FnOnce() -> R,
    R: Futurize,
{
    func().futurize()
}
