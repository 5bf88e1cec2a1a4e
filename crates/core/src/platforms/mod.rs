//! Platforms module - domain models, defaults and normalization.

mod platforms_constants;
mod platforms_model;


// Re-export the public interface
pub use platforms_constants::*;
pub use platforms_model::{NewPlatform, Platform, PlatformType, PlatformUpdate};
