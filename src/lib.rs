//! Shardsync: single-shot future/promise core for shard-per-core cooperative
//! runtimes.
//!
//! # Overview
//!
//! Shardsync is the producer/consumer rendezvous at the heart of a
//! cooperative, single-threaded-per-core runtime: a [`Promise`] that will
//! eventually publish one result, and a [`Future`] that will eventually
//! observe it and optionally schedule a continuation to run once the result
//! exists. Timers, I/O, networking, and cross-core messaging are external
//! collaborators built on top of this core.
//!
//! # Core guarantees
//!
//! - **Single shot**: one `get_future` per promise, one resolution, one
//!   continuation; misuse panics instead of corrupting the rendezvous
//! - **No silent failure loss**: an abandoned promise delivers the
//!   broken-promise sentinel; a dropped unconsumed failure is reported
//! - **Synchronous fast path**: chaining on an already-available future runs
//!   the callback in place, with zero heap allocation, unless the
//!   cooperative preemption predicate says to yield
//! - **FIFO scheduling**: deferred continuations run in readiness order;
//!   forwarding an available result may front-queue, never preempt
//!
//! # Module structure
//!
//! - [`state`]: the pending/value/exception/invalid result cell
//! - [`task`]: the opaque runnable and the continuation that feeds a callback
//! - [`promise`]: the writer endpoint
//! - [`future`]: the reader endpoint and its chaining combinators
//! - [`futurize`]: uniform adaptation of callback return types
//! - [`executor`]: the shard-local run queue and preemption predicate
//! - [`fiber`]: the blocking hook for cooperative fibers
//! - [`error`]: the opaque exception handle and sentinel errors
//! - [`report`]: diagnostics for leaked failures and fatal exits

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod executor;
pub mod fiber;
pub mod future;
pub mod futurize;
mod link;
pub mod promise;
pub mod report;
pub mod state;
pub mod task;
#[cfg(test)]
mod test_utils;

pub use error::{BrokenPromise, Exception, MessageError};
pub use future::{make_exception_future, make_ready_future, Future};
pub use futurize::Futurize;
pub use promise::Promise;
pub use state::FutureState;
pub use task::{Continuation, Task};
