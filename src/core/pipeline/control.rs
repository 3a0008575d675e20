//! Run/pause control
//!
//! The poll loop checks a pause flag between cycles and a shutdown flag at
//! every suspension point. Both travel over watch channels so flag writes
//! are visible across tasks and waiters wake without polling.

use tokio::sync::watch;

/// Control handle held by the process entry point
#[derive(Debug)]
pub struct ServiceControl {
    shutdown_tx: watch::Sender<bool>,
    pause_tx: watch::Sender<bool>,
}

impl ServiceControl {
    /// Request shutdown; observed at the next suspension point
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Set the pause flag
    pub fn set_paused(&self, paused: bool) {
        let _ = self.pause_tx.send(paused);
    }

    /// Flip the pause flag, returning the new state
    pub fn toggle_pause(&self) -> bool {
        let paused = !*self.pause_tx.borrow();
        let _ = self.pause_tx.send(paused);
        paused
    }
}

/// Flag receivers handed to processing units
#[derive(Debug, Clone)]
pub struct ServiceSignals {
    shutdown: watch::Receiver<bool>,
    pause: watch::Receiver<bool>,
}

impl ServiceSignals {
    /// Current shutdown flag
    pub fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Current pause flag
    pub fn is_paused(&self) -> bool {
        *self.pause.borrow()
    }

    /// Completes once shutdown is requested
    ///
    /// A dropped control handle counts as shutdown.
    pub async fn shutdown_requested(&mut self) {
        while !*self.shutdown.borrow() {
            if self.shutdown.changed().await.is_err() {
                return;
            }
        }
    }

    /// Completes when the service is unpaused or shutting down
    pub async fn resumed_or_shutdown(&mut self) {
        loop {
            if *self.shutdown.borrow() || !*self.pause.borrow() {
                return;
            }
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                changed = self.pause.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

/// Create a linked control handle and signal receiver pair
pub fn control_channel() -> (ServiceControl, ServiceSignals) {
    let (shutdown_tx, shutdown) = watch::channel(false);
    let (pause_tx, pause) = watch::channel(false);
    (
        ServiceControl {
            shutdown_tx,
            pause_tx,
        },
        ServiceSignals { shutdown, pause },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_flags_start_cleared() {
        let (_control, signals) = control_channel();
        assert!(!signals.is_shutdown());
        assert!(!signals.is_paused());
    }

    #[test]
    fn test_toggle_pause_flips_state() {
        let (control, signals) = control_channel();

        assert!(control.toggle_pause());
        assert!(signals.is_paused());

        assert!(!control.toggle_pause());
        assert!(!signals.is_paused());
    }

    #[tokio::test]
    async fn test_shutdown_wakes_waiter() {
        let (control, signals) = control_channel();
        let mut waiter = signals.clone();

        let handle = tokio::spawn(async move {
            waiter.shutdown_requested().await;
        });

        control.shutdown();
        timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(signals.is_shutdown());
    }

    #[tokio::test]
    async fn test_resume_wakes_paused_waiter() {
        let (control, signals) = control_channel();
        control.set_paused(true);

        let mut waiter = signals.clone();
        let handle = tokio::spawn(async move {
            waiter.resumed_or_shutdown().await;
        });

        control.set_paused(false);
        timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_releases_paused_waiter() {
        let (control, signals) = control_channel();
        control.set_paused(true);

        let mut waiter = signals.clone();
        let handle = tokio::spawn(async move {
            waiter.resumed_or_shutdown().await;
        });

        control.shutdown();
        timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropped_control_counts_as_shutdown() {
        let (control, signals) = control_channel();
        let mut waiter = signals;

        drop(control);
        timeout(Duration::from_secs(1), waiter.shutdown_requested())
            .await
            .unwrap();
    }
}
