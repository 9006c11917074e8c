//! The writer endpoint of a single-shot rendezvous.
//!
//! A [`Promise`] will eventually publish exactly one result to its paired
//! [`Future`]. The value may be set before or after the future is taken.
//! Dropping a promise that never resolved while something was waiting
//! delivers the broken-promise sentinel, exactly as if the application had
//! called [`Promise::set_exception`].

use crate::error::Exception;
use crate::future::Future;
use crate::link::{Link, LinkRef};
use crate::state::FutureState;
use std::fmt;
use std::rc::Rc;

/// Allows a future value to be made available at a later time.
pub struct Promise<T: 'static> {
    link: LinkRef<T>,
}

impl<T: 'static> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Promise<T> {
    /// Creates a promise with no associated future yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            link: Link::new_ref(),
        }
    }

    /// Creates and returns the paired future.
    ///
    /// The pair remember each other even as either endpoint moves. May be
    /// called at most once.
    ///
    /// # Panics
    ///
    /// Panics when called a second time; that is a programming error.
    pub fn get_future(&mut self) -> Future<T> {
        {
            let mut inner = self.link.borrow_mut();
            assert!(
                !inner.future_taken,
                "get_future called twice on the same promise"
            );
            inner.future_taken = true;
        }
        Future::linked(Rc::clone(&self.link))
    }

    /// Publishes the successful value and makes the future ready.
    ///
    /// If a continuation was attached it is enqueued on the executor; if a
    /// fiber is parked it is woken. Completing after the paired future was
    /// dropped unconsumed is silently ignored.
    ///
    /// # Panics
    ///
    /// Panics if the promise was already resolved.
    pub fn set_value(&mut self, value: T) {
        Link::complete(&self.link, FutureState::of(value), false);
    }

    /// Publishes a failure and makes the future ready.
    ///
    /// Accepts either an [`Exception`] handle or any error type, which is
    /// wrapped into one.
    ///
    /// # Panics
    ///
    /// Panics if the promise was already resolved.
    pub fn set_exception(&mut self, exception: impl Into<Exception>) {
        Link::complete(&self.link, FutureState::failed(exception.into()), false);
    }

    /// Transfers an already-completed state with urgent scheduling priority.
    ///
    /// Used by `Future::forward_to` when the forwarded future is already
    /// available; the attached continuation may be front-queued so it runs
    /// ahead of newly produced work.
    pub(crate) fn set_urgent_state(self, state: FutureState<T>) {
        Link::complete(&self.link, state, true);
    }

    /// Publishes a ready-made state with the given priority.
    pub(crate) fn complete_state(&self, state: FutureState<T>, urgent: bool) {
        Link::complete(&self.link, state, urgent);
    }
}

impl<T: 'static> Drop for Promise<T> {
    fn drop(&mut self) {
        let broken = {
            let inner = self.link.borrow();
            !inner.resolved
                && (!inner.waiter.is_none() || (inner.future_taken && !inner.future_dropped))
        };
        if broken {
            tracing::debug!("promise dropped unresolved, delivering broken promise");
            let mut state = FutureState::pending();
            state.set_to_broken_promise();
            Link::complete(&self.link, state, false);
        }
    }
}

impl<T: 'static> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise").finish_non_exhaustive()
    }
}
