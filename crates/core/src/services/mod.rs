//! Services module - purchasable engagement units tied to a platform.

mod services_constants;
mod services_model;


// Re-export the public interface
pub use services_constants::*;
pub use services_model::{NewService, Service, ServiceUpdate};
