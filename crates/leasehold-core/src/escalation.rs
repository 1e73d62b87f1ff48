//! Ground-rent escalation schedule.
//!
//! The rent review mechanism written into a lease determines the ground
//! rent payable in any given year of the term. Both the premium and the
//! ground-rent-paid calculations price rent through the same resolved
//! [`ReviewSchedule`], so the two can never disagree for one config.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LeaseholdError;
use crate::types::{Money, Rate};
use crate::LeaseholdResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Rent review mechanism written into the lease.
///
/// Deserialization is permissive: a mechanism string this engine does
/// not recognise prices as a flat rent rather than failing, so a newer
/// caller never crashes an older engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RentIncrease {
    /// Rent stays flat for the whole term.
    #[default]
    None,
    /// Rent doubles every `doubling_years` years.
    Doubling,
    /// Rent doubles every 10 years.
    Doubling10,
    /// Rent doubles every 25 years.
    Doubling25,
    /// Rent compounds annually at `rent_increase_percentage`.
    Percentage,
    /// Rent steps up by `rent_increase_amount` every `rent_increase_years`.
    Amount,
}

impl<'de> Deserialize<'de> for RentIncrease {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "doubling" => RentIncrease::Doubling,
            "doubling10" => RentIncrease::Doubling10,
            "doubling25" => RentIncrease::Doubling25,
            "percentage" => RentIncrease::Percentage,
            "amount" => RentIncrease::Amount,
            _ => RentIncrease::None,
        })
    }
}

/// Terms of the existing lease, as supplied by the caller.
///
/// Mode-specific parameters are only read for the selected
/// `rent_increase`; [`LeaseConfig::validate`] checks they are present
/// and in range before any calculation runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseConfig {
    /// Calendar year the lease was granted.
    pub lease_start_year: i32,
    /// Total term of the lease in years.
    pub lease_length: u32,
    /// Annual ground rent at the start of the lease.
    pub ground_rent: Money,
    /// Capitalisation rate applied to future ground rent, quoted as a
    /// percentage (5 = 5%). Must be greater than -100.
    pub capitalisation_rate: Rate,
    /// Rent review mechanism. Defaults to a flat rent when absent.
    #[serde(default)]
    pub rent_increase: RentIncrease,
    /// Review period in years for the generic `doubling` mechanism.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doubling_years: Option<u32>,
    /// Annual increase for the `percentage` mechanism, quoted as a
    /// percentage (3 = 3%).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_increase_percentage: Option<Rate>,
    /// Fixed step for the `amount` mechanism.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_increase_amount: Option<Money>,
    /// Step period in years for the `amount` mechanism.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_increase_years: Option<u32>,
}

/// A review mechanism with its parameters resolved and checked.
///
/// `Doubling10` and `Doubling25` collapse into [`ReviewSchedule::DoublingEvery`],
/// so every doubling lease is priced by the same arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSchedule {
    /// Flat rent.
    Flat,
    /// Doubles every `n` years.
    DoublingEvery(i64),
    /// Compounds annually at a percentage rate.
    AnnualPercentage(Rate),
    /// Steps up by a fixed amount every `every` years.
    FixedStep { amount: Money, every: i64 },
}

// ---------------------------------------------------------------------------
// Implementation
// ---------------------------------------------------------------------------

impl LeaseConfig {
    /// Final year of the current term.
    pub fn lease_end_year(&self) -> i32 {
        self.lease_start_year + self.lease_length as i32
    }

    /// Check that the lease terms are well-formed, including the
    /// parameters required by the selected review mechanism.
    pub fn validate(&self) -> LeaseholdResult<()> {
        if self.lease_length == 0 {
            return Err(LeaseholdError::InvalidInput {
                field: "lease_length".into(),
                reason: "Lease term must be at least one year".into(),
            });
        }
        if self.ground_rent < Decimal::ZERO {
            return Err(LeaseholdError::InvalidInput {
                field: "ground_rent".into(),
                reason: "Ground rent cannot be negative".into(),
            });
        }
        if self.capitalisation_rate <= dec!(-100) {
            return Err(LeaseholdError::InvalidInput {
                field: "capitalisation_rate".into(),
                reason: "Capitalisation rate must be greater than -100%".into(),
            });
        }
        self.review_schedule().map(|_| ())
    }

    /// Resolve the selected review mechanism into a [`ReviewSchedule`].
    pub fn review_schedule(&self) -> LeaseholdResult<ReviewSchedule> {
        match self.rent_increase {
            RentIncrease::None => Ok(ReviewSchedule::Flat),
            RentIncrease::Doubling => {
                let every = self.doubling_years.ok_or_else(|| {
                    LeaseholdError::InvalidInput {
                        field: "doubling_years".into(),
                        reason: "Required for the doubling review mechanism".into(),
                    }
                })?;
                if every == 0 {
                    return Err(LeaseholdError::InvalidInput {
                        field: "doubling_years".into(),
                        reason: "Review period must be at least one year".into(),
                    });
                }
                Ok(ReviewSchedule::DoublingEvery(i64::from(every)))
            }
            RentIncrease::Doubling10 => Ok(ReviewSchedule::DoublingEvery(10)),
            RentIncrease::Doubling25 => Ok(ReviewSchedule::DoublingEvery(25)),
            RentIncrease::Percentage => {
                let rate = self.rent_increase_percentage.ok_or_else(|| {
                    LeaseholdError::InvalidInput {
                        field: "rent_increase_percentage".into(),
                        reason: "Required for the percentage review mechanism".into(),
                    }
                })?;
                if rate <= dec!(-100) {
                    return Err(LeaseholdError::InvalidInput {
                        field: "rent_increase_percentage".into(),
                        reason: "Annual increase must be greater than -100%".into(),
                    });
                }
                Ok(ReviewSchedule::AnnualPercentage(rate))
            }
            RentIncrease::Amount => {
                let amount = self.rent_increase_amount.ok_or_else(|| {
                    LeaseholdError::InvalidInput {
                        field: "rent_increase_amount".into(),
                        reason: "Required for the fixed-amount review mechanism".into(),
                    }
                })?;
                if amount < Decimal::ZERO {
                    return Err(LeaseholdError::InvalidInput {
                        field: "rent_increase_amount".into(),
                        reason: "Rent step cannot be negative".into(),
                    });
                }
                let every = self.rent_increase_years.ok_or_else(|| {
                    LeaseholdError::InvalidInput {
                        field: "rent_increase_years".into(),
                        reason: "Required for the fixed-amount review mechanism".into(),
                    }
                })?;
                if every == 0 {
                    return Err(LeaseholdError::InvalidInput {
                        field: "rent_increase_years".into(),
                        reason: "Step period must be at least one year".into(),
                    });
                }
                Ok(ReviewSchedule::FixedStep {
                    amount,
                    every: i64::from(every),
                })
            }
        }
    }
}

impl ReviewSchedule {
    /// Ground rent payable `years_from_lease_start` years into the term.
    ///
    /// The offset may be negative when a valuation year precedes the
    /// start of the lease; mechanisms then extrapolate backwards (a rent
    /// that doubles every 10 years was half its base 10 years earlier).
    /// `div_euclid` keeps the review-period floor correct for negative
    /// offsets.
    ///
    /// Doubling and compounding schedules can outgrow decimal range on
    /// multi-century terms with short review periods; that surfaces as
    /// [`LeaseholdError::Overflow`], never a panic.
    pub fn rent_for_year(
        &self,
        base_rent: Money,
        years_from_lease_start: i64,
    ) -> LeaseholdResult<Money> {
        match *self {
            ReviewSchedule::Flat => Ok(base_rent),
            ReviewSchedule::DoublingEvery(every) => {
                let reviews = years_from_lease_start.div_euclid(every);
                Decimal::TWO
                    .checked_powi(reviews)
                    .and_then(|factor| base_rent.checked_mul(factor))
                    .ok_or_else(|| rent_overflow(years_from_lease_start))
            }
            ReviewSchedule::AnnualPercentage(rate) => {
                let growth = Decimal::ONE + rate / dec!(100);
                growth
                    .checked_powi(years_from_lease_start)
                    .and_then(|factor| base_rent.checked_mul(factor))
                    .ok_or_else(|| rent_overflow(years_from_lease_start))
            }
            ReviewSchedule::FixedStep { amount, every } => {
                let steps = years_from_lease_start.div_euclid(every);
                amount
                    .checked_mul(Decimal::from(steps))
                    .and_then(|uplift| base_rent.checked_add(uplift))
                    .ok_or_else(|| rent_overflow(years_from_lease_start))
            }
        }
    }
}

fn rent_overflow(years_from_lease_start: i64) -> LeaseholdError {
    LeaseholdError::Overflow {
        context: format!("ground rent {years_from_lease_start} years into the term"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn flat_config() -> LeaseConfig {
        LeaseConfig {
            lease_start_year: 2000,
            lease_length: 99,
            ground_rent: dec!(100),
            capitalisation_rate: dec!(5),
            rent_increase: RentIncrease::None,
            doubling_years: None,
            rent_increase_percentage: None,
            rent_increase_amount: None,
            rent_increase_years: None,
        }
    }

    #[test]
    fn test_flat_rent_never_changes() {
        let schedule = ReviewSchedule::Flat;
        assert_eq!(schedule.rent_for_year(dec!(250), 0).unwrap(), dec!(250));
        assert_eq!(schedule.rent_for_year(dec!(250), 98).unwrap(), dec!(250));
    }

    #[test]
    fn test_doubling_every_10_at_year_25() {
        // 100 * 2^floor(25/10) = 100 * 4 = 400
        let schedule = ReviewSchedule::DoublingEvery(10);
        assert_eq!(schedule.rent_for_year(dec!(100), 25).unwrap(), dec!(400));
    }

    #[test]
    fn test_doubling_review_boundaries() {
        let schedule = ReviewSchedule::DoublingEvery(25);
        assert_eq!(schedule.rent_for_year(dec!(100), 24).unwrap(), dec!(100));
        assert_eq!(schedule.rent_for_year(dec!(100), 25).unwrap(), dec!(200));
        assert_eq!(schedule.rent_for_year(dec!(100), 50).unwrap(), dec!(400));
    }

    #[test]
    fn test_doubling_backward_extrapolation() {
        // Five years before the lease starts, a 10-year doubling rent
        // sits one review earlier: 100 * 2^floor(-5/10) = 100 * 2^-1 = 50.
        let schedule = ReviewSchedule::DoublingEvery(10);
        assert_eq!(schedule.rent_for_year(dec!(100), -5).unwrap(), dec!(50));
    }

    #[test]
    fn test_doubling_overflow_surfaces_as_error() {
        // An annual doubling outgrows decimal range within a century;
        // that must come back as an error, not a panic.
        let schedule = ReviewSchedule::DoublingEvery(1);
        assert!(schedule.rent_for_year(dec!(100), 50).is_ok());
        assert!(schedule.rent_for_year(dec!(100), 99).is_err());
    }

    #[test]
    fn test_percentage_compounds_annually() {
        let schedule = ReviewSchedule::AnnualPercentage(dec!(5));
        assert_eq!(schedule.rent_for_year(dec!(100), 0).unwrap(), dec!(100));
        assert_eq!(schedule.rent_for_year(dec!(100), 2).unwrap(), dec!(110.25));
    }

    #[test]
    fn test_fixed_step_floors_partial_periods() {
        let schedule = ReviewSchedule::FixedStep {
            amount: dec!(50),
            every: 5,
        };
        assert_eq!(schedule.rent_for_year(dec!(100), 4).unwrap(), dec!(100));
        assert_eq!(schedule.rent_for_year(dec!(100), 5).unwrap(), dec!(150));
        assert_eq!(schedule.rent_for_year(dec!(100), 12).unwrap(), dec!(200));
    }

    #[test]
    fn test_doubling10_and_generic_doubling_agree() {
        let mut fixed = flat_config();
        fixed.rent_increase = RentIncrease::Doubling10;
        let mut generic = flat_config();
        generic.rent_increase = RentIncrease::Doubling;
        generic.doubling_years = Some(10);

        assert_eq!(
            fixed.review_schedule().unwrap(),
            generic.review_schedule().unwrap()
        );
    }

    #[test]
    fn test_lease_end_year() {
        let config = flat_config();
        assert_eq!(config.lease_end_year(), 2099);
    }

    #[test]
    fn test_validate_accepts_flat_config() {
        assert!(flat_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_lease_length() {
        let mut config = flat_config();
        config.lease_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_ground_rent() {
        let mut config = flat_config();
        config.ground_rent = dec!(-1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_capitalisation_rate_floor() {
        let mut config = flat_config();
        config.capitalisation_rate = dec!(-100);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_doubling_without_period() {
        let mut config = flat_config();
        config.rent_increase = RentIncrease::Doubling;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_amount_without_step_period() {
        let mut config = flat_config();
        config.rent_increase = RentIncrease::Amount;
        config.rent_increase_amount = Some(dec!(50));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_rent_increase_deserializes_to_flat() {
        let json = r#"{
            "leaseStartYear": 2000,
            "leaseLength": 99,
            "groundRent": "100",
            "capitalisationRate": "5"
        }"#;
        let config: LeaseConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.rent_increase, RentIncrease::None);
    }

    #[test]
    fn test_unknown_rent_increase_deserializes_to_flat() {
        let json = r#"{
            "leaseStartYear": 2000,
            "leaseLength": 99,
            "groundRent": "100",
            "capitalisationRate": "5",
            "rentIncrease": "tripling"
        }"#;
        let config: LeaseConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.rent_increase, RentIncrease::None);
        assert_eq!(config.review_schedule().unwrap(), ReviewSchedule::Flat);
    }
}
