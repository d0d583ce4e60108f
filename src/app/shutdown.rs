//! Interrupt handling.

use log::warn;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Spawns a task that cancels `cancel` on the first Ctrl-C.
///
/// The pipeline observes the token, flushes its checkpoint, and returns
/// without writing final outputs.
pub fn spawn_interrupt_watcher(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => {
                        warn!("Interrupt received; saving checkpoint and stopping");
                        cancel.cancel();
                    }
                    Err(e) => warn!("Failed to listen for interrupt signal: {}", e),
                }
            }
            _ = cancel.cancelled() => {}
        }
    })
}

/// Stops the interrupt watcher once the run is over.
pub async fn shutdown_gracefully(watcher: Option<JoinHandle<()>>) {
    if let Some(watcher) = watcher {
        watcher.abort();
        let _ = watcher.await;
    }
}
