/*!
 * Callback Registry
 * Shared registration state: the current callback plus the
 * one-active-bridge state machine
 */

use crate::types::{HandlerFn, SignalError, SignalResult};
use log::debug;
use parking_lot::Mutex;

/// Bridge activity state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BridgeState {
    Inactive,
    Active,
}

struct Inner {
    callback: Option<HandlerFn>,
    state: BridgeState,
}

/// Registration state shared between the host application and the delivery
/// path, behind a single lock.
///
/// The lock is held only for the read or write itself. The delivery path
/// clones the callback out and invokes it after the lock has been released,
/// so a callback that calls back into the registry cannot deadlock.
pub struct CallbackRegistry {
    inner: Mutex<Inner>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                callback: None,
                state: BridgeState::Inactive,
            }),
        }
    }

    /// Replace the registered callback. Takes effect for subsequent
    /// deliveries; a dispatch already in flight keeps the value it read.
    pub fn set_callback(&self, callback: HandlerFn) {
        self.inner.lock().callback = Some(callback);
        debug!("Registered callback replaced");
    }

    /// Get the currently registered callback, if any
    pub fn callback(&self) -> Option<HandlerFn> {
        self.inner.lock().callback.clone()
    }

    /// Check whether a bridge is currently active on this registry
    pub fn is_active(&self) -> bool {
        self.inner.lock().state == BridgeState::Active
    }

    /// Store `callback` and transition `Inactive -> Active`, failing if a
    /// bridge is already active. Platform installation happens after this
    /// returns, outside the lock.
    pub(crate) fn try_activate(&self, callback: HandlerFn) -> SignalResult<()> {
        let mut inner = self.inner.lock();
        if inner.state == BridgeState::Active {
            return Err(SignalError::HandlerAlreadyActive);
        }
        inner.callback = Some(callback);
        inner.state = BridgeState::Active;
        Ok(())
    }

    /// Transition back to `Inactive`. The callback value is left in place;
    /// no delivery path exists once teardown has completed.
    pub(crate) fn deactivate(&self) {
        self.inner.lock().state = BridgeState::Inactive;
        debug!("Bridge deactivated");
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    fn counting_callback(counter: Arc<AtomicI32>) -> HandlerFn {
        Arc::new(move |code| {
            counter.store(code, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_callback_initially_absent() {
        let registry = CallbackRegistry::new();
        assert!(registry.callback().is_none());
        assert!(!registry.is_active());
    }

    #[test]
    fn test_set_and_get_callback() {
        let registry = CallbackRegistry::new();
        let seen = Arc::new(AtomicI32::new(0));

        registry.set_callback(counting_callback(seen.clone()));
        let callback = registry.callback().unwrap();
        callback(15);
        assert_eq!(seen.load(Ordering::SeqCst), 15);
    }

    #[test]
    fn test_hot_swap_replaces_callback() {
        let registry = CallbackRegistry::new();
        let first = Arc::new(AtomicI32::new(0));
        let second = Arc::new(AtomicI32::new(0));

        registry.set_callback(counting_callback(first.clone()));
        registry.set_callback(counting_callback(second.clone()));

        registry.callback().unwrap()(2);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_activation_state_machine() {
        let registry = CallbackRegistry::new();

        assert!(registry.try_activate(Arc::new(|_| {})).is_ok());
        assert!(registry.is_active());

        // Second activation must fail while active
        assert_eq!(
            registry.try_activate(Arc::new(|_| {})),
            Err(SignalError::HandlerAlreadyActive)
        );

        registry.deactivate();
        assert!(!registry.is_active());

        // Callback is left as-is after deactivation
        assert!(registry.callback().is_some());

        // Reactivation succeeds once inactive
        assert!(registry.try_activate(Arc::new(|_| {})).is_ok());
    }

    #[test]
    fn test_dispatch_in_flight_keeps_old_callback() {
        let registry = CallbackRegistry::new();
        let first = Arc::new(AtomicI32::new(0));

        registry.set_callback(counting_callback(first.clone()));
        let in_flight = registry.callback().unwrap();

        // Swap happens between fetch and invocation
        registry.set_callback(Arc::new(|_| {}));
        in_flight(1);
        assert_eq!(first.load(Ordering::SeqCst), 1);
    }
}
