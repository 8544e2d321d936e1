//! Green-finance eligibility for the ESG registry.
//!
//! A holder's token balance maps to an eligibility level for five finance
//! products. Thresholds are fixed; [`tiers`] is pure and total.

pub mod balance;
pub mod tiers;

pub use balance::{co2_reduction_tons, BalanceReport};
pub use tiers::{carbon_credits, tiers, CarbonCredits, Eligibility, FinanceTiers, Tier};
