/*!
 * Signal Types
 * Termination-signal definitions and result types
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Signal bridge operation result
pub type SignalResult<T> = Result<T, SignalError>;

/// Signal bridge errors
///
/// Only registration conflicts are recoverable. Every other failure in this
/// subsystem (masking, thread control, console handler registration) aborts
/// the process, see `bridge::fatal`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalError {
    #[error("another signal bridge is already active")]
    HandlerAlreadyActive,
}

/// Registered callback. Receives the raw signal number on POSIX or the
/// console control event code on Windows. Runs on the delivery thread and
/// must not panic across this boundary.
pub type HandlerFn = Arc<dyn Fn(i32) + Send + Sync>;

/// Termination-style signals intercepted by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Signal {
    /// Hangup detected on controlling terminal
    SIGHUP = 1,
    /// Interrupt from keyboard (Ctrl+C)
    SIGINT = 2,
    /// Termination request
    SIGTERM = 15,
}

/// The fixed set the bridge blocks and waits on
pub const TERMINATION_SIGNALS: [Signal; 3] = [Signal::SIGHUP, Signal::SIGINT, Signal::SIGTERM];

impl Signal {
    /// Convert from signal number
    pub fn from_number(n: i32) -> Option<Self> {
        match n {
            1 => Some(Signal::SIGHUP),
            2 => Some(Signal::SIGINT),
            15 => Some(Signal::SIGTERM),
            _ => None,
        }
    }

    /// Get signal number
    pub fn number(&self) -> i32 {
        *self as i32
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Signal::SIGHUP => "Hangup",
            Signal::SIGINT => "Interrupt",
            Signal::SIGTERM => "Terminated",
        }
    }

    #[cfg(unix)]
    pub(crate) fn to_nix(self) -> nix::sys::signal::Signal {
        match self {
            Signal::SIGHUP => nix::sys::signal::Signal::SIGHUP,
            Signal::SIGINT => nix::sys::signal::Signal::SIGINT,
            Signal::SIGTERM => nix::sys::signal::Signal::SIGTERM,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.number())
    }
}

/// Console control event codes delivered to the callback on Windows
pub mod console_event {
    pub const CTRL_C: i32 = 0;
    pub const CTRL_BREAK: i32 = 1;
    pub const CTRL_CLOSE: i32 = 2;
    pub const CTRL_LOGOFF: i32 = 5;
    pub const CTRL_SHUTDOWN: i32 = 6;
}
