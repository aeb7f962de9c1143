//! Completion notifications

use crate::error::ErrorCode;

/// Receives notifications about power and refresh outcomes
///
/// All methods default to doing nothing, so an observer only implements
/// what it cares about. `()` is the silent observer.
///
/// Notifications are delivered synchronously from inside the driver call
/// that produced them, after the bus traffic for that step has finished.
pub trait DisplayObserver {
    /// The panel finished powering up
    fn on_ready(&mut self) {}

    /// Powering up failed
    fn on_error(&mut self, _code: ErrorCode) {}

    /// A stage update finished and its last stage delay has elapsed
    fn on_stage_updated(&mut self, _previous: &[u8], _next: &[u8]) {}
}

impl DisplayObserver for () {}

impl<T: DisplayObserver + ?Sized> DisplayObserver for &mut T {
    fn on_ready(&mut self) {
        (**self).on_ready()
    }

    fn on_error(&mut self, code: ErrorCode) {
        (**self).on_error(code)
    }

    fn on_stage_updated(&mut self, previous: &[u8], next: &[u8]) {
        (**self).on_stage_updated(previous, next)
    }
}
