use rust_decimal::{Decimal, RoundingStrategy};

use super::pricing_model::{PriceQuote, PriceUnit};
use crate::errors::{Error, Result};
use crate::services::Service;

/// Prices `quantity` units of `service`.
///
/// The quantity must lie within the service's order bounds. The total is
/// rounded to two decimal places, midpoint away from zero.
pub fn quote_price(service: &Service, quantity: i64, unit: PriceUnit) -> Result<PriceQuote> {
    if !service.accepts_quantity(quantity) {
        return Err(Error::invalid_input(format!(
            "Quantity {} is outside {}..={} for service '{}'",
            quantity, service.min_quantity, service.max_quantity, service.id
        )));
    }

    let total = (service.price * Decimal::from(quantity) / unit.units())
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Ok(PriceQuote {
        service_id: service.id.clone(),
        quantity,
        unit_price: service.price,
        price_unit: unit,
        total,
    })
}
