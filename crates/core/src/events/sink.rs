//! Where the repository sends its change events.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::CatalogEvent;

/// Receiver of catalog change events.
///
/// The repository calls [`emit`](Self::emit) once per committed mutation, on
/// the caller's thread, after its write lock is released. A sink may read the
/// repository back but must not block on another mutation's completion.
/// Whatever happens inside `emit`, the mutation stays committed.
pub trait DomainEventSink: Send + Sync {
    fn emit(&self, event: CatalogEvent);
}

/// Discards every event.
#[derive(Clone, Default)]
pub struct NoOpDomainEventSink;

impl DomainEventSink for NoOpDomainEventSink {
    fn emit(&self, _event: CatalogEvent) {}
}

/// Records events in emission order, for tests.
#[derive(Clone, Default)]
pub struct MockDomainEventSink {
    events: Arc<Mutex<Vec<CatalogEvent>>>,
}

impl MockDomainEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<CatalogEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<CatalogEvent> {
        self.recorded().clone()
    }

    pub fn clear(&self) {
        self.recorded().clear();
    }

    pub fn len(&self) -> usize {
        self.recorded().len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded().is_empty()
    }
}

impl DomainEventSink for MockDomainEventSink {
    fn emit(&self, event: CatalogEvent) {
        self.recorded().push(event);
    }
}
