//! Catalog module - the platform/service repository and its projections.

mod catalog_ids;
mod catalog_model;
mod catalog_projections;
mod catalog_repository;
mod catalog_seed;
mod catalog_traits;

#[cfg(test)]
mod catalog_repository_tests;

// Re-export the public interface
pub use catalog_model::{DisplayCatalog, DisplayPlatform, PlatformDeletion, SeedOutcome};
pub use catalog_projections::{
    display_platforms, display_services, platform_services, services_for_platform,
};
pub use catalog_repository::CatalogRepository;
pub use catalog_seed::{default_platforms, default_services, DefaultService};
pub use catalog_traits::CatalogRepositoryTrait;
