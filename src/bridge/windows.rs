/*!
 * Windows Bridge
 * Console control handler registration
 */

use crate::bridge::{dispatch, fatal};
use crate::registry::CallbackRegistry;
use crate::types::{HandlerFn, SignalError, SignalResult};
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use windows_sys::Win32::Foundation::{BOOL, FALSE, TRUE};
use windows_sys::Win32::System::Console::SetConsoleCtrlHandler;

/// Back-reference the handler routine uses to find the registry. Weak so
/// the routine can never extend the bridge's lifetime; one non-empty value
/// process-wide at any time.
static ACTIVE: Mutex<Option<Weak<CallbackRegistry>>> = Mutex::new(None);

/// Runs on the auxiliary thread the OS uses for console events, not the
/// interrupted thread. Always reports the event as handled so the default
/// process termination does not kick in.
unsafe extern "system" fn handler_routine(event: u32) -> BOOL {
    let registry = ACTIVE.lock().as_ref().and_then(Weak::upgrade);
    match registry {
        Some(registry) => dispatch(&registry, event as i32),
        None => debug!("Console event {} with no active bridge", event),
    }
    TRUE
}

/// Live bridge instance. Dropping it unregisters the console handler.
pub struct SignalBridge {
    registry: Arc<CallbackRegistry>,
}

impl SignalBridge {
    /// Activate `registry` with `callback` and register the console control
    /// handler. Fails with `HandlerAlreadyActive` if a bridge is already
    /// active, on this registry or anywhere else in the process.
    pub fn new(registry: Arc<CallbackRegistry>, callback: HandlerFn) -> SignalResult<Self> {
        registry.try_activate(callback)?;

        {
            let mut active = ACTIVE.lock();
            if active.is_some() {
                registry.deactivate();
                return Err(SignalError::HandlerAlreadyActive);
            }
            *active = Some(Arc::downgrade(&registry));
        }

        // Registration runs outside both locks.
        if unsafe { SetConsoleCtrlHandler(Some(handler_routine), TRUE) } == 0 {
            fatal("failed to register console control handler");
        }

        info!("Signal bridge active, console handler installed");
        Ok(Self { registry })
    }
}

impl Drop for SignalBridge {
    /// Unregister the handler routine before clearing the active state, so
    /// no event can observe a half-torn-down bridge.
    fn drop(&mut self) {
        if unsafe { SetConsoleCtrlHandler(Some(handler_routine), FALSE) } == 0 {
            fatal("failed to unregister console control handler");
        }
        *ACTIVE.lock() = None;
        self.registry.deactivate();
        info!("Signal bridge torn down");
    }
}
