// Single-flight admission
// One planning run at a time, a bounded FIFO line of waiting requests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::warn;

use crate::error::{MetaExchangeError, MetaExchangeResult};

/// Tokio's semaphore hands out permits in request order, which gives the
/// waiting requests their FIFO order.
#[derive(Debug)]
pub struct AdmissionGuard {
    permits: Arc<Semaphore>,
    waiting: Arc<AtomicUsize>,
    queue_limit: usize,
}

impl AdmissionGuard {
    pub fn new(queue_limit: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
            waiting: Arc::new(AtomicUsize::new(0)),
            queue_limit,
        }
    }

    /// Wait for the planning slot. Fails straight away when `queue_limit`
    /// requests are already waiting.
    pub async fn admit(&self) -> MetaExchangeResult<OwnedSemaphorePermit> {
        if let Ok(permit) = self.permits.clone().try_acquire_owned() {
            return Ok(permit);
        }

        let ticket = WaitTicket::take(&self.waiting, self.queue_limit)?;
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| MetaExchangeError::Internal("admission guard closed".to_string()))?;
        drop(ticket);
        Ok(permit)
    }

    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

/// A place in line. Released on drop, also when the waiting request is
/// cancelled or times out.
struct WaitTicket {
    waiting: Arc<AtomicUsize>,
}

impl WaitTicket {
    fn take(waiting: &Arc<AtomicUsize>, limit: usize) -> MetaExchangeResult<Self> {
        let ahead = waiting.fetch_add(1, Ordering::SeqCst);
        if ahead >= limit {
            waiting.fetch_sub(1, Ordering::SeqCst);
            warn!("🚦 Rejecting request, {} already waiting", ahead);
            return Err(MetaExchangeError::QueueFull(ahead));
        }
        Ok(Self {
            waiting: Arc::clone(waiting),
        })
    }
}

impl Drop for WaitTicket {
    fn drop(&mut self) {
        self.waiting.fetch_sub(1, Ordering::SeqCst);
    }
}
