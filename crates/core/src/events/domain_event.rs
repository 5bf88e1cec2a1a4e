//! Domain event types.

use serde::{Deserialize, Serialize};

/// Entity collection touched by a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Platforms,
    Services,
}

/// Emitted once per successful catalog mutation, after the write is durable.
///
/// Platform mutations that also remove services (cascading delete, reset,
/// seeding) are tagged [`EntityKind::Platforms`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEvent {
    pub kind: EntityKind,
    /// Ids of the records created, updated or removed by the mutation.
    pub ids: Vec<String>,
}

impl CatalogEvent {
    pub fn platforms_changed(ids: Vec<String>) -> Self {
        Self {
            kind: EntityKind::Platforms,
            ids,
        }
    }

    pub fn services_changed(ids: Vec<String>) -> Self {
        Self {
            kind: EntityKind::Services,
            ids,
        }
    }

    /// True when platform projections need recomputing.
    pub fn affects_platforms(&self) -> bool {
        self.kind == EntityKind::Platforms
    }

    /// True when service projections need recomputing.
    ///
    /// Always true: service display eligibility depends on the platform's
    /// status as well.
    pub fn affects_services(&self) -> bool {
        true
    }
}
