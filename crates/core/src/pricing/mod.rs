//! Pricing module - order quotes for catalog services.

mod pricing_model;
mod pricing_service;

pub use pricing_model::{PriceQuote, PriceUnit};
pub use pricing_service::quote_price;
