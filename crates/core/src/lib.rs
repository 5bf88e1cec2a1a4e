//! SocialBoost Core - Catalog entities, repository, and traits.
//!
//! This crate contains the platform/service catalog: its domain models, the
//! repository enforcing referential integrity between them, the change bus
//! display widgets subscribe to, and the read-only display projections.
//! It is storage-agnostic; durable key-value backends are provided by the
//! `storage-sqlite` crate.

pub mod catalog;
pub mod errors;
pub mod events;
pub mod platforms;
pub mod pricing;
pub mod services;
pub mod settings;
pub mod storage;
pub mod utils;

// Re-export the repository surface
pub use catalog::{CatalogRepository, CatalogRepositoryTrait};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
