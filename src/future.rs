//! The reader endpoint: a representation of a possibly not-yet-computed
//! value.
//!
//! A [`Future`] represents the result of an asynchronous computation. It can
//! be unavailable (not computed yet), hold a value, or hold a failure. Its
//! most important operation is scheduling a continuation to run when the
//! result becomes available; only one continuation may be scheduled per
//! future.
//!
//! Chaining combinators all route the "what did the callback return" question
//! through [`Futurize`](crate::futurize::Futurize), so a callback may return
//! another future, a `Result`, or unit interchangeably.
//!
//! When a chain starts from an already-available future and preemption is
//! not required, continuations execute synchronously with no heap
//! allocation; otherwise each deferred continuation costs one task
//! allocation.

use crate::error::Exception;
use crate::executor;
use crate::fiber;
use crate::futurize::{self, Futurize};
use crate::link::{LinkRef, Waiter};
use crate::promise::Promise;
use crate::report;
use crate::state::FutureState;
use crate::task::Continuation;
use std::error::Error as StdError;
use std::fmt;

/// A value that may still be being computed.
///
/// Futures are single-shot: consuming operations take `self`. A future that
/// is dropped while carrying an unconsumed failure reports it through
/// [`report::report_failed_future`].
pub struct Future<T: 'static> {
    state: FutureState<T>,
    link: Option<LinkRef<T>>,
}

/// Creates a future that is already resolved with `value`.
#[must_use]
pub fn make_ready_future<T: 'static>(value: T) -> Future<T> {
    Future::from_state(FutureState::of(value))
}

/// Creates a future that is already resolved with a failure.
#[must_use]
pub fn make_exception_future<T: 'static>(exception: impl Into<Exception>) -> Future<T> {
    Future::from_state(FutureState::failed(exception.into()))
}

impl<T: 'static> Future<T> {
    /// A future carrying its own completed (or moved-from) state.
    pub(crate) fn from_state(state: FutureState<T>) -> Self {
        Self { state, link: None }
    }

    /// A future linked to a promise through the shared rendezvous cell.
    pub(crate) fn linked(link: LinkRef<T>) -> Self {
        Self {
            state: FutureState::invalid(),
            link: Some(link),
        }
    }

    /// True if the future has a value or has failed.
    #[must_use]
    pub fn available(&self) -> bool {
        match &self.link {
            Some(link) => link.borrow().state.is_available(),
            None => self.state.is_available(),
        }
    }

    /// True if the future is available and has failed.
    #[must_use]
    pub fn failed(&self) -> bool {
        match &self.link {
            Some(link) => link.borrow().state.has_failed(),
            None => self.state.has_failed(),
        }
    }

    /// Detaches from the promise, if any, and moves the available state out.
    ///
    /// # Panics
    ///
    /// Panics if the future is not available; that is a programming error.
    fn get_available_state(&mut self) -> FutureState<T> {
        match self.link.take() {
            Some(link) => {
                let mut inner = link.borrow_mut();
                inner.future_dropped = true;
                inner.state.take_state()
            }
            None => self.state.take_state(),
        }
    }

    /// Consumes an available future into its result.
    ///
    /// # Panics
    ///
    /// Panics if the future is not available.
    pub fn into_result(mut self) -> Result<T, Exception> {
        self.get_available_state().into_result()
    }

    /// Gets the value returned by the computation.
    ///
    /// If the future is not yet available, parks the current fiber until it
    /// is; other continuations keep running meanwhile. The result is then
    /// consumed: the value is returned, a failure comes back as `Err`.
    ///
    /// # Panics
    ///
    /// Panics when called on a pending future outside a fiber context; only
    /// fibers may block.
    pub fn get(mut self) -> Result<T, Exception> {
        if !self.available() {
            self.do_wait();
        }
        self.get_available_state().into_result()
    }

    /// Waits for the future to become available without consuming it.
    ///
    /// # Panics
    ///
    /// Panics when called on a pending future outside a fiber context.
    pub fn wait(&mut self) {
        if !self.available() {
            self.do_wait();
        }
    }

    fn do_wait(&mut self) {
        let Some(current) = fiber::get_current_fiber() else {
            panic!("blocking on a pending future outside a fiber context");
        };
        let Some(link) = &self.link else {
            panic!("blocking on a pending future with no promise");
        };
        {
            let mut inner = link.borrow_mut();
            debug_assert!(inner.waiter.is_none(), "future already has a waiter");
            inner.waiter = Waiter::Fiber(current.clone());
        }
        fiber::switch_out(&current);
    }

    /// Consumes the failure carried by this future.
    ///
    /// # Panics
    ///
    /// Panics unless [`failed`](Self::failed) is true.
    pub fn get_exception(mut self) -> Exception {
        assert!(
            self.failed(),
            "get_exception on a future that has not failed"
        );
        match self.get_available_state().into_result() {
            Err(exception) => exception,
            Ok(_) => unreachable!(),
        }
    }

    /// Discards the result, value or failure, without reporting it.
    ///
    /// # Panics
    ///
    /// Panics if the future is not available.
    pub fn ignore_ready_future(&mut self) {
        match &self.link {
            Some(link) => link.borrow_mut().state.ignore(),
            None => self.state.ignore(),
        }
    }

    /// Registers `func` to receive the completed state.
    ///
    /// Already-available futures (reached here when preemption forced the
    /// slow path) go straight to the executor; otherwise the continuation is
    /// parked in the rendezvous cell for the promise to fill in and enqueue.
    fn schedule_continuation<F>(mut self, func: F)
    where
        F: FnOnce(FutureState<T>) + 'static,
    {
        if self.available() {
            let state = self.get_available_state();
            executor::schedule(Box::new(Continuation::with_state(state, func)));
        } else {
            let Some(link) = self.link.take() else {
                panic!("scheduling a continuation on a pending future with no promise");
            };
            let mut inner = link.borrow_mut();
            debug_assert!(inner.waiter.is_none(), "future already has a waiter");
            inner.waiter = Waiter::Task(Box::new(Continuation::new(func)));
        }
    }

    /// Schedules `func` to run with this future's value.
    ///
    /// `func` may return another future, a `Result`, or unit; the returned
    /// future resolves with whatever `func` produced. If this future fails,
    /// `func` is skipped and the failure propagates.
    ///
    /// When the future is already available and preemption is not required,
    /// `func` runs synchronously and the result is an already-resolved
    /// future.
    pub fn then<F, R>(self, func: F) -> Future<R::Value>
    where
        F: FnOnce(T) -> R + 'static,
        R: Futurize,
    {
        if self.available() && !executor::need_preempt() {
            return match self.into_result() {
                Ok(value) => futurize::apply(func, value),
                Err(exception) => make_exception_future(exception),
            };
        }
        let mut chained = Promise::new();
        let result = chained.get_future();
        self.schedule_continuation(move |state| match state.into_result() {
            Ok(value) => futurize::apply(func, value).forward_to(chained),
            Err(exception) => chained.set_exception(exception),
        });
        result
    }

    /// Schedules a plain mapping of this future's value.
    ///
    /// The infallible-value form of [`then`](Self::then): `func` returns the
    /// new value directly. Failures skip `func` and propagate.
    pub fn map<F, U>(self, func: F) -> Future<U>
    where
        F: FnOnce(T) -> U + 'static,
        U: 'static,
    {
        if self.available() && !executor::need_preempt() {
            return match self.into_result() {
                Ok(value) => make_ready_future(func(value)),
                Err(exception) => make_exception_future(exception),
            };
        }
        let mut chained = Promise::new();
        let result = chained.get_future();
        self.schedule_continuation(move |state| match state.into_result() {
            Ok(value) => chained.set_value(func(value)),
            Err(exception) => chained.set_exception(exception),
        });
        result
    }

    /// Schedules `func` to receive this future itself, completed.
    ///
    /// Unlike [`then`](Self::then), `func` runs for both value and failure
    /// outcomes; the error-handling combinators are built on this.
    pub fn then_wrapped<F, R>(self, func: F) -> Future<R::Value>
    where
        F: FnOnce(Self) -> R + 'static,
        R: Futurize,
    {
        if self.available() && !executor::need_preempt() {
            let mut this = self;
            let completed = Self::from_state(this.get_available_state());
            return futurize::apply(func, completed);
        }
        let mut chained = Promise::new();
        let result = chained.get_future();
        self.schedule_continuation(move |state| {
            futurize::apply(func, Self::from_state(state)).forward_to(chained);
        });
        result
    }

    /// Satisfies `promise` with this future's eventual result.
    ///
    /// Equivalent to scheduling a continuation that moves the result into
    /// the promise, but cheaper: an already-available result transfers
    /// urgently, and a pending one rewires the rendezvous so the upstream
    /// completion feeds `promise` directly with no intermediate continuation.
    pub fn forward_to(mut self, promise: Promise<T>) {
        if self.available() {
            let state = self.get_available_state();
            promise.set_urgent_state(state);
        } else {
            let Some(link) = self.link.take() else {
                panic!("forwarding a pending future with no promise");
            };
            let mut inner = link.borrow_mut();
            debug_assert!(inner.waiter.is_none(), "future already has a waiter");
            inner.waiter = Waiter::Forward(promise);
        }
    }

    /// Runs `func` regardless of how this future resolves.
    ///
    /// If `func` returns a pending result the outer completion waits for it.
    /// The original outcome is preserved when the cleanup succeeds. A
    /// cleanup failure propagates instead; if the original had also failed,
    /// the cleanup exception carries the original as its nested cause.
    pub fn finally<F, R>(self, func: F) -> Self
    where
        F: FnOnce() -> R + 'static,
        R: Futurize,
    {
        self.then_wrapped(move |result: Self| {
            futurize::invoke(func).then_wrapped(move |cleanup: Future<R::Value>| match cleanup
                .into_result()
            {
                Ok(_) => result,
                Err(cleanup_exception) => {
                    if result.failed() {
                        let original = result.get_exception();
                        make_exception_future(cleanup_exception.with_nested(original))
                    } else {
                        drop(result);
                        make_exception_future(cleanup_exception)
                    }
                }
            })
        })
    }

    /// Terminates the process if this future fails.
    pub fn or_terminate(self) -> Future<()> {
        self.then_wrapped(|completed: Self| match completed.into_result() {
            Ok(_) => (),
            Err(exception) => report::engine_exit(Some(exception)),
        })
    }

    /// Discards the value, turning this into a unit future.
    ///
    /// Failures propagate unchanged.
    pub fn discard_result(self) -> Future<()> {
        self.then(|_value| ())
    }

    /// Replaces a failure with the result of `func`.
    ///
    /// On success the value propagates unchanged. `func` receives the
    /// exception handle and may return a replacement value immediately, in
    /// the future, or fail itself.
    pub fn handle_exception<F, R>(self, func: F) -> Self
    where
        F: FnOnce(Exception) -> R + 'static,
        R: Futurize<Value = T>,
    {
        self.then_wrapped(move |completed: Self| match completed.into_result() {
            Ok(value) => make_ready_future(value),
            Err(exception) => futurize::apply(func, exception),
        })
    }

    /// Replaces a failure of payload type `E` with the result of `func`.
    ///
    /// Failures of any other type propagate unchanged.
    pub fn handle_exception_type<E, F, R>(self, func: F) -> Self
    where
        E: StdError + 'static,
        F: FnOnce(&E) -> R + 'static,
        R: Futurize<Value = T>,
    {
        self.then_wrapped(move |completed: Self| match completed.into_result() {
            Ok(value) => make_ready_future(value),
            Err(exception) => match exception.downcast_ref::<E>() {
                Some(payload) => futurize::apply(func, payload),
                None => make_exception_future(exception),
            },
        })
    }
}

impl<T: 'static> Drop for Future<T> {
    fn drop(&mut self) {
        let leaked = if let Some(link) = self.link.take() {
            let mut inner = link.borrow_mut();
            inner.future_dropped = true;
            if inner.state.has_failed() && inner.waiter.is_none() {
                match inner.state.take_state().into_result() {
                    Err(exception) => Some(exception),
                    Ok(_) => unreachable!(),
                }
            } else {
                None
            }
        } else if self.state.has_failed() {
            match self.state.take_state().into_result() {
                Err(exception) => Some(exception),
                Ok(_) => unreachable!(),
            }
        } else {
            None
        };
        if let Some(exception) = leaked {
            report::report_failed_future(&exception);
        }
    }
}

impl<T: 'static> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("available", &self.available())
            .field("failed", &self.failed())
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
impl<T: 'static> Future<T> {
    /// Test helper: detach and forget a chain tail we do not observe.
    fn ignore_chain(mut self) {
        if self.available() {
            self.ignore_ready_future();
        }
    }
}
