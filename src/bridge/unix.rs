/*!
 * POSIX Bridge
 * Blocked signal mask plus a dedicated sigwait worker thread
 */

use crate::bridge::{dispatch, fatal};
use crate::registry::CallbackRegistry;
use crate::types::{HandlerFn, SignalError, SignalResult, TERMINATION_SIGNALS};
use log::{debug, info};
use nix::errno::Errno;
use nix::sys::pthread::{pthread_kill, pthread_self, Pthread};
use nix::sys::signal::{pthread_sigmask, SigSet, SigmaskHow, Signal as NixSignal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// The blocked mask and the sigwait worker are process-wide interception; a
/// second bridge must be rejected even when built on a different registry.
/// One true value process-wide at any time.
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Teardown handshake shared with the worker. Stop requests are only
/// observed at the sigwait boundary, never during a callback.
struct StopState {
    requested: AtomicBool,
    acknowledged: AtomicBool,
}

/// Live bridge instance. Owns the worker thread; dropping it tears the
/// interception down synchronously.
pub struct SignalBridge {
    registry: Arc<CallbackRegistry>,
    worker: Option<JoinHandle<()>>,
    worker_thread: Pthread,
    stop: Arc<StopState>,
}

fn termination_sigset() -> SigSet {
    let mut set = SigSet::empty();
    for sig in TERMINATION_SIGNALS {
        set.add(sig.to_nix());
    }
    set
}

impl SignalBridge {
    /// Activate `registry` with `callback` and start intercepting
    /// termination signals.
    ///
    /// The termination set is blocked on the calling thread; threads spawned
    /// afterwards inherit the mask, so no thread performs the default signal
    /// action while the bridge is alive. Fails with `HandlerAlreadyActive`
    /// if a bridge is already active, on this registry or anywhere else in
    /// the process.
    pub fn new(registry: Arc<CallbackRegistry>, callback: HandlerFn) -> SignalResult<Self> {
        registry.try_activate(callback)?;

        if INSTALLED.swap(true, Ordering::SeqCst) {
            registry.deactivate();
            return Err(SignalError::HandlerAlreadyActive);
        }

        // Past this point the registry lock is released; platform
        // installation never runs under it.
        if let Err(e) = pthread_sigmask(SigmaskHow::SIG_BLOCK, Some(&termination_sigset()), None) {
            fatal(&format!("failed to block termination signals: {}", e));
        }

        let stop = Arc::new(StopState {
            requested: AtomicBool::new(false),
            acknowledged: AtomicBool::new(false),
        });
        let (tid_tx, tid_rx) = flume::bounded(1);

        let worker = {
            let registry = registry.clone();
            let stop = stop.clone();
            thread::Builder::new()
                .name("sigbridge-worker".into())
                .spawn(move || worker_loop(registry, stop, tid_tx))
                .unwrap_or_else(|e| fatal(&format!("failed to spawn signal worker: {}", e)))
        };
        let worker_thread = tid_rx
            .recv()
            .unwrap_or_else(|_| fatal("signal worker exited before reporting its thread id"));

        info!("Signal bridge active, worker accepting {:?}", TERMINATION_SIGNALS);
        Ok(Self {
            registry,
            worker: Some(worker),
            worker_thread,
            stop,
        })
    }
}

impl Drop for SignalBridge {
    /// Request worker shutdown, wake it out of sigwait and join before
    /// clearing the active state. Must not be invoked from inside the
    /// callback itself, that would self-join the worker.
    fn drop(&mut self) {
        self.stop.requested.store(true, Ordering::Release);

        // SIGTERM directed at the worker thread; its sigwait consumes it at
        // the next wait boundary, after any callback in flight returns.
        if let Err(e) = pthread_kill(self.worker_thread, NixSignal::SIGTERM) {
            fatal(&format!("failed to wake signal worker: {}", e));
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                fatal("signal worker terminated abnormally");
            }
        }
        // The loop only exits through the stop request; anything else is a
        // bridge bug.
        if !self.stop.acknowledged.load(Ordering::Acquire) {
            fatal("signal worker exited without acknowledging the stop request");
        }

        INSTALLED.store(false, Ordering::SeqCst);
        self.registry.deactivate();
        info!("Signal bridge torn down");
    }
}

fn worker_loop(registry: Arc<CallbackRegistry>, stop: Arc<StopState>, tid_tx: flume::Sender<Pthread>) {
    if tid_tx.send(pthread_self()).is_err() {
        fatal("bridge constructor went away before the worker started");
    }

    let set = termination_sigset();
    loop {
        let signal = match set.wait() {
            Ok(signal) => signal,
            // Some sigwait implementations report EINTR when interrupted by
            // an unblocked caught signal; retry without dispatching.
            Err(Errno::EINTR) => continue,
            Err(e) => fatal(&format!("sigwait failed: {}", e)),
        };

        if stop.requested.load(Ordering::Acquire) {
            stop.acknowledged.store(true, Ordering::Release);
            break;
        }

        debug!("Worker accepted {}", signal);
        dispatch(&registry, signal as i32);
    }
}
