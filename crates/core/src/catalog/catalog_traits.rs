//! Catalog repository trait.
//!
//! The contract is storage-agnostic: implementations persist through a
//! [`KeyValueStore`](crate::storage::KeyValueStore) and announce changes
//! through a [`DomainEventSink`](crate::events::DomainEventSink).

use super::catalog_model::{DisplayCatalog, PlatformDeletion, SeedOutcome};
use crate::errors::Result;
use crate::platforms::{NewPlatform, Platform, PlatformUpdate};
use crate::pricing::PriceQuote;
use crate::services::{NewService, Service, ServiceUpdate};

/// Trait defining the contract for catalog operations.
///
/// Reads never fail: an unreadable collection is reported as empty.
/// Every successful mutation emits exactly one event; a failed one emits
/// nothing and leaves storage untouched.
pub trait CatalogRepositoryTrait: Send + Sync {
    // Platforms

    /// Lists every platform, active or not, in stored order.
    fn list_platforms(&self) -> Vec<Platform>;

    fn get_platform(&self, platform_id: &str) -> Option<Platform>;

    /// Creates a platform with a fresh `platform-<n>` id.
    fn create_platform(&self, new_platform: NewPlatform) -> Result<Platform>;

    /// Merges `update` into the stored platform. The id is immutable.
    fn update_platform(&self, platform_id: &str, update: PlatformUpdate) -> Result<Platform>;

    /// Deletes a platform together with all of its services.
    fn delete_platform(&self, platform_id: &str) -> Result<PlatformDeletion>;

    /// Replaces the whole platform collection.
    fn save_platforms(&self, platforms: &[Platform]) -> Result<()>;

    // Services

    fn list_services(&self) -> Vec<Service>;

    fn get_service(&self, service_id: &str) -> Option<Service>;

    /// Every service of one platform regardless of status.
    fn list_services_for_platform(&self, platform_id: &str) -> Vec<Service>;

    /// Creates a service with a fresh `service-<n>` id under an existing platform.
    fn create_service(&self, new_service: NewService) -> Result<Service>;

    fn update_service(&self, service_id: &str, update: ServiceUpdate) -> Result<Service>;

    fn delete_service(&self, service_id: &str) -> Result<()>;

    /// Replaces the whole service collection.
    fn save_services(&self, services: &[Service]) -> Result<()>;

    // Display projections

    fn get_display_platforms(&self) -> Vec<Platform>;

    fn get_platform_services(&self, platform_id: &str) -> Vec<Service>;

    fn get_display_services(&self) -> Vec<Service>;

    fn display_catalog(&self) -> DisplayCatalog;

    /// Prices `quantity` units of a displayable service.
    fn quote(&self, service_id: &str, quantity: i64) -> Result<PriceQuote>;

    // Maintenance

    /// Seeds the default catalog into empty collections. Idempotent.
    fn ensure_seeded(&self) -> Result<SeedOutcome>;

    /// Replaces the catalog with the defaults.
    fn reset_to_defaults(&self) -> Result<SeedOutcome>;

    /// Empties both collections.
    fn clear_all(&self) -> Result<()>;

    /// Removes services whose platform no longer exists. Returns how many
    /// were removed.
    fn prune_orphan_services(&self) -> Result<usize>;
}
