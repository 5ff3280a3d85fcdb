//! Stop signal for the registry's background tasks.
//!
//! The sweep loop and the event intake each hold a receiver; one trigger
//! reaches all of them.

use tokio::sync::broadcast;

/// Broadcast stop signal.
///
/// Clones share the same channel, so a clone handed to a task can be
/// triggered from anywhere.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Signal with no listeners yet.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Listen for the stop signal. Subscribe before triggering,
    /// or the signal is missed.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Tell every current listener to stop. Returns how many were reached;
    /// zero is not an error.
    pub fn trigger(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }

    /// Number of tasks still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
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
        assert_eq!(shutdown.receiver_count(), 2);

        assert_eq!(shutdown.trigger(), 2);
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[test]
    fn test_trigger_without_subscribers() {
        assert_eq!(Shutdown::default().trigger(), 0);
    }

    #[test]
    fn test_dropped_receiver_is_not_counted() {
        let shutdown = Shutdown::new();
        let kept = shutdown.subscribe();
        drop(shutdown.subscribe());

        assert_eq!(shutdown.trigger(), 1);
        drop(kept);
    }
}
