//! Reversionary value of the property, deferred to the end of the lease.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LeaseholdError;
use crate::types::{Money, Rate};
use crate::LeaseholdResult;

/// Present value of the freeholder's reversion: the full property value,
/// deferred at `deferment_rate` (percent) over the years between the
/// renewal year and the end of the lease.
///
/// A renewal year at or after the lease end means the reversion has
/// already fallen in; the value is returned undeferred rather than
/// treated as an error.
pub fn calculate_property_value_premium(
    property_value: Money,
    deferment_rate: Rate,
    lease_end_year: i32,
    renew_year: i32,
) -> LeaseholdResult<Money> {
    if property_value < Decimal::ZERO {
        return Err(LeaseholdError::InvalidInput {
            field: "property_value".into(),
            reason: "Property value cannot be negative".into(),
        });
    }
    if deferment_rate <= dec!(-100) {
        return Err(LeaseholdError::InvalidInput {
            field: "deferment_rate".into(),
            reason: "Deferment rate must be greater than -100%".into(),
        });
    }

    let years_to_defer = i64::from(lease_end_year - renew_year);
    if years_to_defer < 0 {
        return Ok(property_value);
    }

    let one_plus_rate = Decimal::ONE + deferment_rate / dec!(100);
    Ok(property_value / one_plus_rate.powi(years_to_defer))
}
