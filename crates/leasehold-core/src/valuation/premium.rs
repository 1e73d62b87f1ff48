//! Lease-extension premium: the present value of the ground rent the
//! freeholder would have collected over the remainder of the term.
//!
//! Each year's rent is priced by the lease's review schedule and
//! discounted back to the renewal year at the capitalisation rate; the
//! renewal year itself carries no discount.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LeaseholdError;
use crate::escalation::LeaseConfig;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::LeaseholdResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One year of the premium calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyBreakdownEntry {
    /// Calendar year.
    pub year: i32,
    /// Ground rent payable that year under the review schedule.
    pub ground_rent: Money,
    /// Present value of that year's rent at the capitalisation rate.
    pub premium_contribution: Money,
}

/// Capitalised ground rent over the remaining term.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumResult {
    /// Sum of every entry's `premium_contribution`, accumulated exactly.
    pub total_cost: Money,
    /// Year-by-year breakdown in chronological order, from the renewal
    /// year through the final year of the term inclusive.
    pub yearly_breakdown: Vec<YearlyBreakdownEntry>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Capitalise the remaining ground rent into a lease-extension premium.
///
/// `renew_year` anchors the discounting and may fall before the start of
/// the lease (the review schedule extrapolates backwards, with a warning)
/// or after its end (empty breakdown, zero premium).
pub fn calculate_premium(
    config: &LeaseConfig,
    renew_year: i32,
) -> LeaseholdResult<ComputationOutput<PremiumResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    config.validate()?;
    let schedule = config.review_schedule()?;

    let lease_end_year = config.lease_end_year();
    if renew_year > lease_end_year {
        warnings.push(format!(
            "Renewal year {renew_year} falls after the end of the lease ({lease_end_year}); no rent left to capitalise"
        ));
    }
    if renew_year < config.lease_start_year {
        warnings.push(format!(
            "Renewal year {renew_year} precedes the start of the lease ({}); the review schedule is extrapolated backwards",
            config.lease_start_year
        ));
    }

    let one_plus_rate = Decimal::ONE + config.capitalisation_rate / dec!(100);
    let mut total_cost = Decimal::ZERO;
    let mut yearly_breakdown = Vec::new();
    let mut discount = Decimal::ONE;

    for year in renew_year..=lease_end_year {
        if year > renew_year {
            discount = discount.checked_mul(one_plus_rate).ok_or_else(|| {
                LeaseholdError::Overflow {
                    context: format!("premium discount factor in year {year}"),
                }
            })?;
        }
        if discount.is_zero() {
            return Err(LeaseholdError::DivisionByZero {
                context: format!("premium discount factor in year {year}"),
            });
        }

        let years_from_lease_start = i64::from(year - config.lease_start_year);
        let ground_rent = schedule.rent_for_year(config.ground_rent, years_from_lease_start)?;
        let premium_contribution = ground_rent / discount;

        total_cost = total_cost.checked_add(premium_contribution).ok_or_else(|| {
            LeaseholdError::Overflow {
                context: format!("premium total in year {year}"),
            }
        })?;
        yearly_breakdown.push(YearlyBreakdownEntry {
            year,
            ground_rent,
            premium_contribution,
        });
    }

    let output = PremiumResult {
        total_cost,
        yearly_breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Capitalised ground rent (term value)",
        config,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
