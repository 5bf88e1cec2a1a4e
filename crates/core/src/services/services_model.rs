//! Service domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::services_constants::{DEFAULT_MAX_QUANTITY, DEFAULT_MIN_QUANTITY};
use crate::errors::{Error, Result};

fn default_active() -> bool {
    true
}

/// Domain model representing a purchasable service.
///
/// `price` is expressed in the catalog's configured price unit
/// (per 1000 units by default, see [`crate::pricing::PriceUnit`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub platform_id: String,
    pub price: Decimal,
    pub min_quantity: i64,
    pub max_quantity: i64,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Checks every field constraint of the record.
    ///
    /// Referential integrity is checked by the repository, which knows the
    /// platform collection.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::invalid_input("Service id cannot be empty"));
        }
        validate_fields(&self.name, self.price, self.min_quantity, self.max_quantity)
    }

    /// True when `quantity` lies within the service's order bounds.
    pub fn accepts_quantity(&self, quantity: i64) -> bool {
        (self.min_quantity..=self.max_quantity).contains(&quantity)
    }
}

/// Input model for creating a new service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub name: String,
    pub platform_id: String,
    pub price: Decimal,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
    pub active: Option<bool>,
    pub description: Option<String>,
}

impl NewService {
    pub fn new(name: impl Into<String>, platform_id: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            platform_id: platform_id.into(),
            price,
            min_quantity: None,
            max_quantity: None,
            active: None,
            description: None,
        }
    }

    pub fn with_quantities(mut self, min_quantity: i64, max_quantity: i64) -> Self {
        self.min_quantity = Some(min_quantity);
        self.max_quantity = Some(max_quantity);
        self
    }

    /// Validates the new service data (without the platform reference).
    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.name,
            self.price,
            self.min_quantity.unwrap_or(DEFAULT_MIN_QUANTITY),
            self.max_quantity.unwrap_or(DEFAULT_MAX_QUANTITY),
        )
    }

    pub fn into_service(self, id: String, now: DateTime<Utc>) -> Service {
        Service {
            id,
            name: self.name.trim().to_string(),
            platform_id: self.platform_id,
            price: self.price,
            min_quantity: self.min_quantity.unwrap_or(DEFAULT_MIN_QUANTITY),
            max_quantity: self.max_quantity.unwrap_or(DEFAULT_MAX_QUANTITY),
            active: self.active.unwrap_or(true),
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input model for updating an existing service.
///
/// Absent fields keep their stored value; `description` can be cleared with
/// an explicit `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub platform_id: Option<String>,
    pub price: Option<Decimal>,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
    pub active: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub description: Option<Option<String>>,
}

impl ServiceUpdate {
    /// Merges the update onto `service`. The id never changes.
    ///
    /// The merged record must be validated afterwards, since a single field
    /// can only be judged against the stored values of the others.
    pub fn apply_to(&self, service: &mut Service, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            service.name = name.trim().to_string();
        }
        if let Some(platform_id) = &self.platform_id {
            service.platform_id = platform_id.clone();
        }
        if let Some(price) = self.price {
            service.price = price;
        }
        if let Some(min_quantity) = self.min_quantity {
            service.min_quantity = min_quantity;
        }
        if let Some(max_quantity) = self.max_quantity {
            service.max_quantity = max_quantity;
        }
        if let Some(active) = self.active {
            service.active = active;
        }
        if let Some(description) = &self.description {
            service.description = description.clone();
        }
        service.updated_at = now;
    }
}

fn validate_fields(name: &str, price: Decimal, min_quantity: i64, max_quantity: i64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_input("Service name cannot be empty"));
    }
    if price < Decimal::ZERO {
        return Err(Error::invalid_input(format!(
            "Service price cannot be negative (got {})",
            price
        )));
    }
    if min_quantity < 1 || max_quantity < 1 {
        return Err(Error::invalid_input(format!(
            "Quantities must be positive (min {}, max {})",
            min_quantity, max_quantity
        )));
    }
    if min_quantity > max_quantity {
        return Err(Error::invalid_input(format!(
            "Minimum quantity {} exceeds maximum quantity {}",
            min_quantity, max_quantity
        )));
    }
    Ok(())
}
