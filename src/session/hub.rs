//! Quality event source and subscription handles

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::stats::QualityEvent;

/// Anything the governor can subscribe to for quality events
pub trait QualityEventSource: Send + Sync {
    fn subscribe(&self) -> Subscription;
}

/// Owned subscription to a quality event source
///
/// Unsubscribes exactly this subscriber when dropped or when
/// [`Subscription::unsubscribe`] is called.
pub struct Subscription {
    id: u64,
    events: mpsc::UnboundedReceiver<QualityEvent>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Build a subscription; `release` runs once on unsubscribe
    pub fn new(
        id: u64,
        events: mpsc::UnboundedReceiver<QualityEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            id,
            events,
            release: Some(Box::new(release)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next event, `None` once the source is gone
    pub async fn recv(&mut self) -> Option<QualityEvent> {
        self.events.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
        self.events.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Default)]
struct HubInner {
    subscribers: DashMap<u64, mpsc::UnboundedSender<QualityEvent>>,
    next_id: AtomicU64,
}

/// In-process fan-out of quality events
#[derive(Clone, Default)]
pub struct QualityEventHub {
    inner: Arc<HubInner>,
}

impl QualityEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to every live subscriber, returns how many got it
    pub fn publish(&self, event: QualityEvent) -> usize {
        let mut delivered = 0;
        self.inner.subscribers.retain(|_, tx| {
            let alive = tx.send(event.clone()).is_ok();
            if alive {
                delivered += 1;
            }
            alive
        });
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

impl QualityEventSource for QualityEventHub {
    fn subscribe(&self) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.subscribers.insert(id, tx);
        tracing::debug!("Quality subscriber {} added", id);

        let hub = Arc::downgrade(&self.inner);
        Subscription::new(id, rx, move || {
            if let Some(hub) = hub.upgrade() {
                hub.subscribers.remove(&id);
                tracing::debug!("Quality subscriber {} removed", id);
            }
        })
    }
}
