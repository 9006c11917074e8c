//! Diagnostic hooks for unconsumed failures and fatal exits.

use crate::error::Exception;
use std::cell::Cell;

thread_local! {
    static FAILED_FUTURES: Cell<u64> = const { Cell::new(0) };
}

/// Records a failure that was dropped without anyone consuming it.
///
/// Reporting only; the failure is not escalated. The count is observable
/// through [`failed_futures`].
pub fn report_failed_future(exception: &Exception) {
    FAILED_FUTURES.with(|count| count.set(count.get() + 1));
    tracing::warn!(error = %exception, "exceptional future ignored");
}

/// The number of failures reported on this shard so far.
#[must_use]
pub fn failed_futures() -> u64 {
    FAILED_FUTURES.with(Cell::get)
}

/// Unrecoverably exits the process, attaching the failure that caused it.
///
/// Used by `Future::or_terminate`.
pub fn engine_exit(exception: Option<Exception>) -> ! {
    match exception {
        Some(exception) => tracing::error!(error = %exception, "engine exiting on unhandled failure"),
        None => tracing::error!("engine exit requested"),
    }
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporting_increments_the_shard_counter() {
        let before = failed_futures();
        report_failed_future(&Exception::message("dropped on the floor"));
        report_failed_future(&Exception::message("again"));
        assert_eq!(failed_futures(), before + 2);
    }
}
