use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Quantity a service price refers to.
///
/// One convention is applied to the whole catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceUnit {
    /// `price` is the cost of 1000 units.
    #[default]
    PerThousand,
    /// `price` is the cost of a single unit.
    PerUnit,
}

impl PriceUnit {
    /// Number of units the stored price covers.
    pub fn units(&self) -> Decimal {
        match self {
            PriceUnit::PerThousand => Decimal::ONE_THOUSAND,
            PriceUnit::PerUnit => Decimal::ONE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceUnit::PerThousand => "per_thousand",
            PriceUnit::PerUnit => "per_unit",
        }
    }
}

impl FromStr for PriceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per_thousand" | "per-thousand" | "1000" => Ok(PriceUnit::PerThousand),
            "per_unit" | "per-unit" | "1" => Ok(PriceUnit::PerUnit),
            other => Err(format!("unknown price unit '{}'", other)),
        }
    }
}

/// Price of an order for one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub service_id: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub price_unit: PriceUnit,
    /// Total rounded to cents.
    pub total: Decimal,
}
