/*!
 * sigbridge demo
 * Installs the bridge and waits for the first termination signal
 */

use std::error::Error;
use std::sync::Arc;

use log::info;
use sigbridge::{CallbackRegistry, HandlerFn, Signal, SignalBridge};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let registry = Arc::new(CallbackRegistry::new());
    let (shutdown_tx, shutdown_rx) = flume::bounded(1);

    let callback: HandlerFn = Arc::new(move |code| {
        // Coalesce repeats; only the first signal matters here
        let _ = shutdown_tx.try_send(code);
    });
    let bridge = SignalBridge::new(registry.clone(), callback)?;

    info!("Waiting for a termination signal (Ctrl+C to stop)...");
    let code = shutdown_rx.recv()?;
    match Signal::from_number(code) {
        Some(signal) => info!("Received {}: {}", signal, signal.description()),
        None => info!("Received platform event code {}", code),
    }

    drop(bridge);
    info!("Bridge released, shutting down");
    Ok(())
}
