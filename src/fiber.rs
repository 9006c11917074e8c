//! The blocking hook for cooperative fibers.
//!
//! A fiber is a cooperatively scheduled stackful unit that may park on a
//! future inside `get()` or `wait()`. The core does not implement fibers; it
//! only uses three primitives from the surrounding runtime:
//!
//! - [`get_current_fiber`]: the fiber executing right now, if any
//! - [`switch_out`]: park the fiber until it is switched back in
//! - [`switch_in`]: mark a parked fiber runnable again
//!
//! The fiber subsystem provides those primitives by implementing [`Suspend`]
//! and installing the running fiber with [`run_as_fiber`].

use crate::task::Task;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The two primitives the core needs from a fiber implementation.
pub trait Suspend {
    /// Parks the calling fiber; returns once the fiber is resumed.
    fn suspend(&self);

    /// Marks the fiber runnable again.
    fn resume(&self);
}

/// A cheap cloneable handle to a fiber.
#[derive(Clone)]
pub struct Fiber {
    inner: Rc<dyn Suspend>,
}

impl Fiber {
    /// Wraps a fiber implementation into a handle.
    #[must_use]
    pub fn new(inner: Rc<dyn Suspend>) -> Self {
        Self { inner }
    }
}

impl fmt::Debug for Fiber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fiber").finish_non_exhaustive()
    }
}

thread_local! {
    static CURRENT: RefCell<Option<Fiber>> = const { RefCell::new(None) };
}

struct RestoreCurrent(Option<Fiber>);

impl Drop for RestoreCurrent {
    fn drop(&mut self) {
        CURRENT.with(|current| *current.borrow_mut() = self.0.take());
    }
}

/// The fiber executing on this shard right now, if any.
#[must_use]
pub fn get_current_fiber() -> Option<Fiber> {
    CURRENT.with(|current| current.borrow().clone())
}

/// Parks `fiber` until something switches it back in.
pub fn switch_out(fiber: &Fiber) {
    tracing::trace!("fiber switched out");
    fiber.inner.suspend();
}

/// Marks `fiber` runnable again.
pub fn switch_in(fiber: &Fiber) {
    tracing::trace!("fiber switched in");
    fiber.inner.resume();
}

/// Runs `f` with `fiber` installed as the current fiber.
///
/// The previous current fiber is restored afterwards, also on unwind.
pub fn run_as_fiber<R>(fiber: Fiber, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT.with(|current| current.borrow_mut().replace(fiber));
    let _restore = RestoreCurrent(previous);
    f()
}

/// Executor task that resumes a parked fiber.
///
/// Travels through the run queue like any continuation, so a woken fiber
/// keeps its FIFO position relative to other ready work.
pub(crate) struct WakeTask {
    fiber: Fiber,
}

impl WakeTask {
    pub(crate) fn boxed(fiber: Fiber) -> Box<Self> {
        Box::new(Self { fiber })
    }
}

impl Task for WakeTask {
    fn run_and_dispose(self: Box<Self>) {
        switch_in(&self.fiber);
    }
}
