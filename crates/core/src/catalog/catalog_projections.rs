//! Read-only projections over the catalog collections.
//!
//! These are pure functions of the two collections; the repository feeds them
//! freshly loaded data on every call.

use std::collections::HashSet;

use super::catalog_model::{DisplayCatalog, DisplayPlatform};
use crate::platforms::Platform;
use crate::services::Service;

/// Active platforms, in stored order.
pub fn display_platforms(platforms: &[Platform]) -> Vec<Platform> {
    platforms.iter().filter(|p| p.active).cloned().collect()
}

/// Every service of a platform regardless of status (admin view).
pub fn services_for_platform(services: &[Service], platform_id: &str) -> Vec<Service> {
    services
        .iter()
        .filter(|s| s.platform_id == platform_id)
        .cloned()
        .collect()
}

/// Active services of `platform_id`, or nothing when the platform is missing
/// or inactive.
pub fn platform_services(
    platforms: &[Platform],
    services: &[Service],
    platform_id: &str,
) -> Vec<Service> {
    let visible = platforms.iter().any(|p| p.id == platform_id && p.active);
    if !visible {
        return Vec::new();
    }
    services
        .iter()
        .filter(|s| s.platform_id == platform_id && s.active)
        .cloned()
        .collect()
}

/// Active services whose platform is also active.
pub fn display_services(platforms: &[Platform], services: &[Service]) -> Vec<Service> {
    let active_platforms: HashSet<&str> = platforms
        .iter()
        .filter(|p| p.active)
        .map(|p| p.id.as_str())
        .collect();
    services
        .iter()
        .filter(|s| s.active)
        .filter(|s| active_platforms.contains(s.platform_id.as_str()))
        .cloned()
        .collect()
}

impl DisplayCatalog {
    /// Groups the display services under their display platforms.
    pub fn build(platforms: &[Platform], services: &[Service]) -> Self {
        let platforms = platforms
            .iter()
            .filter(|p| p.active)
            .map(|p| DisplayPlatform {
                platform: p.clone(),
                services: services
                    .iter()
                    .filter(|s| s.active && s.platform_id == p.id)
                    .cloned()
                    .collect(),
            })
            .collect();
        DisplayCatalog { platforms }
    }
}
