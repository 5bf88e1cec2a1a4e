//! In-process change notification bus.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use log::{debug, warn};

use super::{CatalogEvent, DomainEventSink};

type Handler = Arc<dyn Fn(&CatalogEvent) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(u64, Handler)>>,
}

/// Publish/subscribe bus scoped to one repository instance.
///
/// Handlers run synchronously, in subscription order, on the publisher's
/// turn. A panicking handler is logged and skipped; the remaining handlers
/// still run. Cloning the bus yields another handle to the same subscriber
/// list.
#[derive(Clone, Default)]
pub struct ChangeBus {
    inner: Arc<BusInner>,
}

/// Outcome of one [`ChangeBus::publish`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Handle returned by [`ChangeBus::subscribe`].
///
/// Dropping the handle leaves the handler subscribed; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Subscription {
    /// Removes the handler. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(inner) = self.bus.upgrade() else {
            return false;
        };
        let mut subscribers = inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(id, _)| *id != self.id);
        subscribers.len() != before
    }
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for every subsequent event.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&CatalogEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(handler)));
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers `event` to every current subscriber.
    ///
    /// The subscriber list is snapshotted first, so handlers may subscribe
    /// or unsubscribe while being called; such changes apply from the next
    /// publish on.
    pub fn publish(&self, event: &CatalogEvent) -> PublishReport {
        let handlers: Vec<Handler> = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        let mut report = PublishReport {
            delivered: 0,
            failed: 0,
        };
        for handler in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(()) => report.delivered += 1,
                Err(_) => {
                    warn!("Catalog subscriber panicked while handling {:?}", event.kind);
                    report.failed += 1;
                }
            }
        }
        debug!(
            "Published {:?} event to {} subscriber(s), {} failed",
            event.kind, report.delivered, report.failed
        );
        report
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl DomainEventSink for ChangeBus {
    fn emit(&self, event: CatalogEvent) {
        self.publish(&event);
    }
}
