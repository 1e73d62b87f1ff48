//! Lease-extension valuation operations.

pub mod ground_rent;
pub mod premium;
pub mod reversion;

pub use ground_rent::calculate_ground_rent_paid;
pub use premium::{calculate_premium, PremiumResult, YearlyBreakdownEntry};
pub use reversion::calculate_property_value_premium;
