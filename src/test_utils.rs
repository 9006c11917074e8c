//! Test utilities.
//!
//! Shared helpers for unit tests:
//! - consistent tracing-based logging initialization
//! - phase/completion macros for readable test output
//! - a deterministic executor-draining fiber so blocking `get()` / `wait()`
//!   can be exercised on a single thread

use crate::executor;
use crate::fiber::{run_as_fiber, Fiber, Suspend};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Once;

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_target(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log test completion.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
}

/// Log before assertions for context.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            "Asserting: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}

/// A fiber stand-in that drains the shard executor while "parked".
///
/// `suspend` runs queued tasks until something resumes the fiber, which is
/// exactly what a real fiber scheduler would let happen on the shard while
/// the fiber is switched out. Deterministic and single-threaded.
pub struct DrainFiber {
    ready: Cell<bool>,
}

impl DrainFiber {
    /// A fresh fiber handle backed by the draining implementation.
    #[must_use]
    pub fn handle() -> Fiber {
        Fiber::new(Rc::new(Self {
            ready: Cell::new(false),
        }))
    }
}

impl Suspend for DrainFiber {
    fn suspend(&self) {
        while !self.ready.get() {
            assert!(
                executor::run_pending_task(),
                "parked fiber can never wake: the executor queue is empty"
            );
        }
        self.ready.set(false);
    }

    fn resume(&self) {
        self.ready.set(true);
    }
}

/// Runs `f` inside a test fiber context.
pub fn run_as_test_fiber<R>(f: impl FnOnce() -> R) -> R {
    run_as_fiber(DrainFiber::handle(), f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiber::get_current_fiber;

    #[test]
    fn test_fiber_context_installs_a_current_fiber() {
        run_as_test_fiber(|| {
            assert!(get_current_fiber().is_some());
        });
        assert!(get_current_fiber().is_none());
    }

    #[test]
    fn drain_fiber_resume_unblocks_suspend() {
        let fiber = DrainFiber::handle();
        // Resuming first makes the next suspend a no-op.
        crate::fiber::switch_in(&fiber);
        crate::fiber::switch_out(&fiber);
    }
}
