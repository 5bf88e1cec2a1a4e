//! Catalog result and view models.

use serde::{Deserialize, Serialize};

use crate::platforms::Platform;
use crate::services::Service;

/// Outcome of a cascading platform delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDeletion {
    pub removed_platform: usize,
    pub removed_services: usize,
}

/// Records added by one seeding pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedOutcome {
    pub platforms_added: usize,
    pub services_added: usize,
}

impl SeedOutcome {
    pub fn is_noop(&self) -> bool {
        self.platforms_added == 0 && self.services_added == 0
    }
}

/// A display platform together with its display services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPlatform {
    pub platform: Platform,
    pub services: Vec<Service>,
}

/// Storefront view of the catalog: active platforms, each with its active
/// services, in stored order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayCatalog {
    pub platforms: Vec<DisplayPlatform>,
}

impl DisplayCatalog {
    pub fn service_count(&self) -> usize {
        self.platforms.iter().map(|p| p.services.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}
