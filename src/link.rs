//! The rendezvous cell linking a promise to its future.
//!
//! One logical result travels between the two endpoints through a single
//! shared [`Link`]. The result lives in exactly one place at a time: the
//! link's own cell, a detached future's cell, or inside an attached
//! continuation task. The waiter slot records who must be notified when the
//! result arrives.

use crate::executor;
use crate::fiber::{Fiber, WakeTask};
use crate::promise::Promise;
use crate::state::FutureState;
use crate::task::{StatefulTask, Task};
use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

pub(crate) type LinkRef<T> = Rc<RefCell<Link<T>>>;

/// Who is waiting for the result.
pub(crate) enum Waiter<T: 'static> {
    /// Nobody yet; the result stays in the link's cell.
    None,
    /// An attached continuation; completion writes the result into the task
    /// and enqueues it.
    Task(Box<dyn StatefulTask<T>>),
    /// A parked fiber; completion leaves the result in the cell and enqueues
    /// a wake task.
    Fiber(Fiber),
    /// A forwarded promise; completion feeds it directly, with no
    /// intermediate continuation.
    Forward(Promise<T>),
}

impl<T> Waiter<T> {
    pub(crate) fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

pub(crate) struct Link<T: 'static> {
    pub(crate) state: FutureState<T>,
    pub(crate) waiter: Waiter<T>,
    /// `get_future` was called.
    pub(crate) future_taken: bool,
    /// The reader side is gone without consuming the result.
    pub(crate) future_dropped: bool,
    /// A result has been published.
    pub(crate) resolved: bool,
}

/// Work to perform after the link borrow is released.
enum Deferred<T: 'static> {
    Run(Box<dyn Task>),
    Forward(Promise<T>, FutureState<T>),
}

impl<T: 'static> Link<T> {
    pub(crate) fn new_ref() -> LinkRef<T> {
        Rc::new(RefCell::new(Self {
            state: FutureState::pending(),
            waiter: Waiter::None,
            future_taken: false,
            future_dropped: false,
            resolved: false,
        }))
    }

    /// Publishes `result` and makes the link ready.
    ///
    /// With `urgent` set and preemption not required, an attached
    /// continuation is front-queued; this preserves the ordering semantic of
    /// forwarding an already-available result.
    ///
    /// # Panics
    ///
    /// Panics if the link was already resolved; resolving twice is a
    /// programming error.
    pub(crate) fn complete(link: &LinkRef<T>, result: FutureState<T>, urgent: bool) {
        let deferred = {
            let mut inner = link.borrow_mut();
            assert!(!inner.resolved, "promise resolved twice");
            inner.resolved = true;

            if inner.future_dropped && inner.waiter.is_none() {
                // The reader abandoned the rendezvous; completing is a
                // silent no-op.
                tracing::trace!("completion ignored, future was dropped");
                None
            } else {
                match mem::replace(&mut inner.waiter, Waiter::None) {
                    Waiter::None => {
                        inner.state = result;
                        None
                    }
                    Waiter::Task(mut task) => {
                        task.set_state(result);
                        Some(Deferred::Run(task.into_task()))
                    }
                    Waiter::Fiber(fiber) => {
                        inner.state = result;
                        Some(Deferred::Run(WakeTask::boxed(fiber)))
                    }
                    Waiter::Forward(promise) => Some(Deferred::Forward(promise, result)),
                }
            }
        };

        match deferred {
            None => {}
            Some(Deferred::Run(task)) => {
                if urgent && !executor::need_preempt() {
                    executor::schedule_urgent(task);
                } else {
                    executor::schedule(task);
                }
            }
            Some(Deferred::Forward(promise, state)) => {
                promise.complete_state(state, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Continuation;

    #[test]
    fn completion_without_waiter_stays_in_the_cell() {
        let link = Link::new_ref();
        Link::complete(&link, FutureState::of(4), false);
        let inner = link.borrow();
        assert!(inner.resolved);
        assert_eq!(inner.state.peek().unwrap(), 4);
    }

    #[test]
    fn completion_with_task_waiter_enqueues_it() {
        let link = Link::new_ref();
        link.borrow_mut().waiter = Waiter::Task(Box::new(Continuation::new(
            |state: FutureState<i32>| {
                assert_eq!(state.into_result().unwrap(), 4);
            },
        )));
        Link::complete(&link, FutureState::of(4), false);
        assert_eq!(executor::pending_tasks(), 1);
        assert_eq!(executor::run_until_idle(), 1);
        assert!(link.borrow().state.is_pending());
    }

    #[test]
    fn completion_after_reader_dropped_is_ignored() {
        let link = Link::<i32>::new_ref();
        {
            let mut inner = link.borrow_mut();
            inner.future_taken = true;
            inner.future_dropped = true;
        }
        Link::complete(&link, FutureState::of(4), false);
        let inner = link.borrow();
        assert!(inner.resolved);
        assert!(inner.state.is_pending());
    }

    #[test]
    #[should_panic(expected = "resolved twice")]
    fn resolving_twice_panics() {
        let link = Link::new_ref();
        Link::complete(&link, FutureState::of(1), false);
        Link::complete(&link, FutureState::of(2), false);
    }

    #[test]
    fn urgent_completion_front_queues_the_continuation() {
        // A normal task is already queued; the urgent completion must run
        // ahead of it.
        let order = Rc::new(RefCell::new(Vec::new()));
        let order_in_normal = Rc::clone(&order);
        executor::schedule(Box::new(Continuation::with_state(
            FutureState::of(()),
            move |_| order_in_normal.borrow_mut().push("normal"),
        )));

        let link = Link::new_ref();
        let order_in_urgent = Rc::clone(&order);
        link.borrow_mut().waiter = Waiter::Task(Box::new(Continuation::new(
            move |_state: FutureState<i32>| order_in_urgent.borrow_mut().push("urgent"),
        )));
        Link::complete(&link, FutureState::of(1), true);

        executor::run_until_idle();
        assert_eq!(*order.borrow(), vec!["urgent", "normal"]);
    }

    #[test]
    fn urgent_completion_defers_when_preemption_is_needed() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let order_in_normal = Rc::clone(&order);
        executor::schedule(Box::new(Continuation::with_state(
            FutureState::of(()),
            move |_| order_in_normal.borrow_mut().push("normal"),
        )));

        executor::set_need_preempt(true);
        let link = Link::new_ref();
        let order_in_urgent = Rc::clone(&order);
        link.borrow_mut().waiter = Waiter::Task(Box::new(Continuation::new(
            move |_state: FutureState<i32>| order_in_urgent.borrow_mut().push("urgent"),
        )));
        Link::complete(&link, FutureState::of(1), true);
        executor::set_need_preempt(false);

        executor::run_until_idle();
        assert_eq!(*order.borrow(), vec!["normal", "urgent"]);
    }
}
