/*!
 * sigbridge
 * Cross-platform bridge from termination signals to a serialized callback
 *
 * Converts SIGHUP/SIGINT/SIGTERM (POSIX) or console control events
 * (Windows) into invocations of a single registered callback, always on a
 * controlled thread, never inside a raw asynchronous signal handler. The
 * callback may therefore lock, allocate and perform I/O.
 */

pub mod bridge;
pub mod registry;
pub mod types;

// Re-export public API
pub use bridge::SignalBridge;
pub use registry::CallbackRegistry;
pub use types::{console_event, HandlerFn, Signal, SignalError, SignalResult, TERMINATION_SIGNALS};
