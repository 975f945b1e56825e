//! Connection admission and graceful-shutdown draining.
//!
//! The registry enforces the server's connection cap with a counting
//! semaphore and tracks in-flight connections so the acceptor can wait for
//! them to finish during shutdown, mirroring the original thread pool's
//! "stop accepting, then join workers" drain sequence.

use std::sync::Arc;

use tokio::sync::Semaphore;

/// Tracks admitted connections against a configured maximum.
#[derive(Clone)]
pub struct ConnectionRegistry {
    semaphore: Arc<Semaphore>,
}

/// RAII handle held for the lifetime of one accepted connection.
///
/// Dropping it (normally, or via task cancellation) returns the slot to the
/// pool.
pub struct ConnectionSlot {
    _permit: tokio::sync::OwnedSemaphorePermit,
}

impl ConnectionRegistry {
    /// Create a registry that admits at most `max_connections` at a time.
    #[must_use]
    pub fn new(max_connections: usize) -> Self {
        Self { semaphore: Arc::new(Semaphore::new(max_connections)) }
    }

    /// Try to admit one more connection without blocking.
    ///
    /// Returns `None` if the server is already at its connection cap.
    #[must_use]
    pub fn try_admit(&self) -> Option<ConnectionSlot> {
        Arc::clone(&self.semaphore).try_acquire_owned().ok().map(|permit| ConnectionSlot { _permit: permit })
    }

    /// Number of connection slots currently free.
    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait until every admitted connection has released its slot, or
    /// `deadline` elapses first. Returns `true` if the drain completed.
    pub async fn drain(&self, total_capacity: usize, deadline: std::time::Duration) -> bool {
        let wait = async {
            // All slots free means no connection is in flight.
            while self.semaphore.available_permits() < total_capacity {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
        };
        tokio::time::timeout(deadline, wait).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn admits_up_to_the_cap() {
        let registry = ConnectionRegistry::new(2);
        let a = registry.try_admit().expect("first");
        let b = registry.try_admit().expect("second");
        assert!(registry.try_admit().is_none());
        drop(a);
        assert!(registry.try_admit().is_some());
        drop(b);
    }

    #[tokio::test]
    async fn drain_completes_once_slots_are_released() {
        let registry = ConnectionRegistry::new(1);
        let slot = registry.try_admit().expect("admit");
        let registry2 = registry.clone();

        let drain = tokio::spawn(async move { registry2.drain(1, Duration::from_secs(1)).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(slot);

        assert!(drain.await.expect("join"));
    }

    #[tokio::test]
    async fn drain_times_out_if_a_connection_never_finishes() {
        let registry = ConnectionRegistry::new(1);
        let _slot = registry.try_admit().expect("admit");
        assert!(!registry.drain(1, Duration::from_millis(50)).await);
    }
}
