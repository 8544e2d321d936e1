use serde::{Deserialize, Serialize};

use esg_types::{Address, TokenAmount};

use crate::tiers::{round_to, tiers, FinanceTiers, CREDITS_PER_TOKEN};

/// Tons of CO2 reduction attributed to a balance, one decimal.
pub fn co2_reduction_tons(balance: f64) -> f64 {
    round_to(balance * CREDITS_PER_TOKEN, 1)
}

/// Everything the balance panel shows for one holder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    /// `None` for the reset view.
    pub holder: Option<Address>,
    pub raw: TokenAmount,
    /// `raw` scaled by 10^18, as decimal text.
    pub display: String,
    pub balance: f64,
    pub co2_reduction_tons: f64,
    pub tiers: FinanceTiers,
}

impl BalanceReport {
    pub fn new(holder: Address, raw: TokenAmount) -> Self {
        let balance = raw.to_f64();
        Self {
            holder: Some(holder),
            raw,
            display: raw.format_units(),
            balance,
            co2_reduction_tons: co2_reduction_tons(balance),
            tiers: tiers(balance),
        }
    }

    /// The view after a reset: zero balance, nothing eligible.
    pub fn zero() -> Self {
        Self {
            holder: None,
            raw: TokenAmount::default(),
            display: TokenAmount::default().format_units(),
            balance: 0.0,
            co2_reduction_tons: 0.0,
            tiers: tiers(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::Eligibility;

    #[test]
    fn report_scales_and_classifies() {
        let holder = Address::new([1; 20]);
        let report = BalanceReport::new(holder, TokenAmount::from_tokens(120));
        assert_eq!(report.holder, Some(holder));
        assert_eq!(report.display, "120");
        assert_eq!(report.balance, 120.0);
        assert_eq!(report.co2_reduction_tons, 24.0);
        assert_eq!(report.tiers.bond.level, Eligibility::Pilot);
    }

    #[test]
    fn fractional_balance() {
        let report = BalanceReport::new(
            Address::zero(),
            TokenAmount::from_base_units(75_500_000_000_000_000_000),
        );
        assert_eq!(report.display, "75.5");
        assert_eq!(report.co2_reduction_tons, 15.1);
        assert_eq!(report.tiers.loan.level, Eligibility::Pilot);
    }

    #[test]
    fn co2_follows_credit_rounding() {
        assert_eq!(co2_reduction_tons(10.75), 2.1);
    }

    #[test]
    fn zero_report_matches_reset_view() {
        let z = BalanceReport::zero();
        assert!(z.holder.is_none());
        assert_eq!(z.display, "0");
        assert_eq!(z.display, BalanceReport::new(Address::zero(), TokenAmount::default()).display);
        assert_eq!(z.co2_reduction_tons, 0.0);
        assert_eq!(z.tiers, tiers(0.0));
    }
}
