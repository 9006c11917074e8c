//! Opaque runnable tasks and the continuation that feeds a callback.
//!
//! A [`Task`] is the unit the executor consumes: heap-allocated, owned by
//! whoever queued it, run exactly once. Consuming the box is the dispose.
//!
//! A [`Continuation`] is the task a `then` chain installs: it owns a
//! [`FutureState`] and the callback, and running it hands the state to the
//! callback by value.

use crate::state::FutureState;
use std::fmt;

/// An opaque runnable the executor invokes exactly once.
pub trait Task {
    /// Performs the work and releases the task.
    fn run_and_dispose(self: Box<Self>);
}

/// A task carrying a result cell and the callback that will receive it.
pub struct Continuation<T, F> {
    state: FutureState<T>,
    func: F,
}

impl<T, F> Continuation<T, F>
where
    F: FnOnce(FutureState<T>),
{
    /// A continuation whose state will be filled in at completion time.
    pub fn new(func: F) -> Self {
        Self {
            state: FutureState::pending(),
            func,
        }
    }

    /// A continuation over an already-completed state.
    pub fn with_state(state: FutureState<T>, func: F) -> Self {
        Self { state, func }
    }
}

impl<T, F> Task for Continuation<T, F>
where
    F: FnOnce(FutureState<T>),
{
    fn run_and_dispose(self: Box<Self>) {
        let this = *self;
        (this.func)(this.state);
    }
}

impl<T, F> fmt::Debug for Continuation<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// A task whose result cell can still be written by the promise.
///
/// When a continuation is attached before the result exists, the promise
/// owns the task and targets its cell on completion, then converts it into a
/// plain [`Task`] for the executor.
pub(crate) trait StatefulTask<T> {
    /// Writes the completed state into the task.
    ///
    /// The task's cell must still be pending.
    fn set_state(&mut self, state: FutureState<T>);

    /// Converts the task into the executor's currency.
    fn into_task(self: Box<Self>) -> Box<dyn Task>;
}

impl<T, F> StatefulTask<T> for Continuation<T, F>
where
    T: 'static,
    F: FnOnce(FutureState<T>) + 'static,
{
    fn set_state(&mut self, state: FutureState<T>) {
        assert!(
            self.state.is_pending(),
            "continuation state written twice"
        );
        self.state = state;
    }

    fn into_task(self: Box<Self>) -> Box<dyn Task> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn continuation_feeds_owned_state_to_callback() {
        let seen = Rc::new(Cell::new(0));
        let seen_in_callback = Rc::clone(&seen);
        let task = Continuation::with_state(FutureState::of(5), move |state| {
            seen_in_callback.set(state.into_result().unwrap());
        });
        Box::new(task).run_and_dispose();
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn set_state_fills_a_pending_continuation() {
        let seen = Rc::new(Cell::new(0));
        let seen_in_callback = Rc::clone(&seen);
        let mut task = Box::new(Continuation::new(move |state: FutureState<i32>| {
            seen_in_callback.set(state.into_result().unwrap());
        }));
        task.set_state(FutureState::of(9));
        task.into_task().run_and_dispose();
        assert_eq!(seen.get(), 9);
    }

    #[test]
    #[should_panic(expected = "written twice")]
    fn set_state_twice_panics() {
        let mut task = Box::new(Continuation::new(|_state: FutureState<i32>| {}));
        task.set_state(FutureState::of(1));
        task.set_state(FutureState::of(2));
    }

    #[test]
    fn debug_names_the_type() {
        let task = Continuation::new(|_state: FutureState<i32>| {});
        assert!(format!("{task:?}").contains("Continuation"));
    }
}
