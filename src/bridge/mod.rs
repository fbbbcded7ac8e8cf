/*!
 * Platform Signal Bridge
 * Intercepts termination signals and funnels them into the registered
 * callback on a controlled thread
 *
 * The two platform paths are deliberately separate: POSIX accepts signals
 * synchronously on a dedicated worker (blocked mask + sigwait), Windows is
 * called back by the OS on an auxiliary thread it manages. Neither path ever
 * runs the callback inside a raw asynchronous signal handler.
 */

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::SignalBridge;
#[cfg(windows)]
pub use windows::SignalBridge;

use crate::registry::CallbackRegistry;
use log::{debug, error};
use std::panic::{self, AssertUnwindSafe};

/// Invoke the registered callback for `code` behind the fault-isolation
/// boundary. The registry lock is released before the call, so the callback
/// may freely call back into this subsystem.
pub(crate) fn dispatch(registry: &CallbackRegistry, code: i32) {
    let Some(callback) = registry.callback() else {
        debug!("Signal {} received with no callback registered", code);
        return;
    };
    if panic::catch_unwind(AssertUnwindSafe(|| callback(code))).is_err() {
        fatal("signal callback panicked across the dispatch boundary");
    }
}

/// Unrecoverable failure in the bridge machinery. OS-level masking, thread
/// control and handler registration are asserted to succeed; failure means
/// the process environment is broken and the process must not continue.
pub(crate) fn fatal(msg: &str) -> ! {
    error!("{}", msg);
    std::process::abort()
}
