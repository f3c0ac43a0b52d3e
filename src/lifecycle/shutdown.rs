//! Shutdown coordination and OS signal handling.

use std::future::Future;
use tokio::sync::broadcast;

/// Coordinator for ending an interactive session.
///
/// Long-running loops subscribe and stop when the signal fires.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Run `fut` unless shutdown fires first. `None` means it was dropped.
    pub async fn run_until<F: Future>(&self, fut: F) -> Option<F::Output> {
        let mut stop = self.subscribe();
        tokio::select! {
            Ok(()) = stop.recv() => None,
            out = fut => Some(out),
        }
    }

    /// Trigger shutdown on ctrl-c. Must be called inside a runtime.
    pub fn listen_for_ctrl_c(&self) {
        let shutdown = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Interrupt received, shutting down");
                    shutdown.trigger();
                }
                Err(e) => tracing::error!(error = %e, "Failed to listen for ctrl-c"),
            }
        });
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.clone().subscribe();
        shutdown.trigger();
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_run_until_completes_without_trigger() {
        let shutdown = Shutdown::new();
        assert_eq!(shutdown.run_until(async { 7 }).await, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_drops_pending_work_on_trigger() {
        let shutdown = Shutdown::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.trigger();
        });
        let out = shutdown.run_until(std::future::pending::<()>()).await;
        assert_eq!(out, None);
    }
}
