//! Cumulative ground rent actually paid over a span of years.

use rust_decimal::Decimal;

use crate::error::LeaseholdError;
use crate::escalation::LeaseConfig;
use crate::types::Money;
use crate::LeaseholdResult;

/// Total ground rent payable over the half-open range
/// `[start_year, end_year)`.
///
/// A nominal sum: each year's rent comes from the review schedule
/// anchored to the start of the lease, with no discounting. Empty and
/// inverted ranges total zero.
pub fn calculate_ground_rent_paid(
    config: &LeaseConfig,
    start_year: i32,
    end_year: i32,
) -> LeaseholdResult<Money> {
    config.validate()?;
    let schedule = config.review_schedule()?;

    let mut total = Decimal::ZERO;
    for year in start_year..end_year {
        let years_from_lease_start = i64::from(year - config.lease_start_year);
        let rent = schedule.rent_for_year(config.ground_rent, years_from_lease_start)?;
        total = total
            .checked_add(rent)
            .ok_or_else(|| LeaseholdError::Overflow {
                context: format!("ground rent total in year {year}"),
            })?;
    }

    Ok(total)
}
