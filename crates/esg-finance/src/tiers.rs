use std::fmt;

use serde::{Deserialize, Serialize};

/// Credits issued per token held.
pub const CREDITS_PER_TOKEN: f64 = 0.2;
/// Illustrative USD value of one carbon credit.
pub const USD_PER_CREDIT: f64 = 5.0;

const NOT_ELIGIBLE: &str = "Not eligible";

/// Eligibility level for one finance product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    Ineligible,
    Pilot,
    Eligible,
}

impl Eligibility {
    /// Status mark used on the dashboard.
    pub fn mark(&self) -> &'static str {
        match self {
            Self::Ineligible => "❌",
            Self::Pilot => "⚡",
            Self::Eligible => "✅",
        }
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ineligible => write!(f, "ineligible"),
            Self::Pilot => write!(f, "pilot"),
            Self::Eligible => write!(f, "eligible"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub level: Eligibility,
    pub detail: String,
}

impl Tier {
    fn new(level: Eligibility, detail: impl Into<String>) -> Self {
        Self {
            level,
            detail: detail.into(),
        }
    }

    fn ineligible() -> Self {
        Self::new(Eligibility::Ineligible, NOT_ELIGIBLE)
    }
}

/// Eligibility across every finance product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceTiers {
    pub loan: Tier,
    pub bond: Tier,
    pub carbon_credit: Tier,
    pub insurance: Tier,
    pub supply_chain_finance: Tier,
}

impl FinanceTiers {
    /// `(product name, tier)` pairs in display order.
    pub fn products(&self) -> [(&'static str, &Tier); 5] {
        [
            ("Green loan", &self.loan),
            ("Sustainability bond", &self.bond),
            ("Carbon credits", &self.carbon_credit),
            ("Insurance", &self.insurance),
            ("Supply-chain finance", &self.supply_chain_finance),
        ]
    }
}

/// Carbon credits earned by a balance and their illustrative value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarbonCredits {
    /// Rounded to one decimal.
    pub credits: f64,
    /// Rounded to whole dollars from the rounded credits.
    pub usd_value: f64,
}

/// Round to `digits` decimals (at most 20), halves away from zero.
///
/// Works on the exact binary value of `value` rather than on `value * 10^n`,
/// which is itself rounded: `2.1499999999999999` (the float nearest
/// `10.75 * 0.2`) rounds to `2.1`, not `2.2`. This is how the dashboards'
/// `toFixed` behaves, so detail strings match.
pub(crate) fn round_to(value: f64, digits: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let bits = value.abs().to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    // |value| = mantissa * 2^exp
    let (mantissa, exp) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };
    if exp >= 0 {
        return value;
    }

    let scale = 10u128.pow(digits);
    let scaled = u128::from(mantissa) * scale;
    let shift = exp.unsigned_abs();
    let rounded = if shift >= 128 {
        0
    } else {
        let quotient = scaled >> shift;
        let remainder = scaled - (quotient << shift);
        if remainder >= 1u128 << (shift - 1) {
            quotient + 1
        } else {
            quotient
        }
    };
    let magnitude = rounded as f64 / scale as f64;
    if value.is_sign_negative() {
        -magnitude
    } else {
        magnitude
    }
}

pub fn carbon_credits(balance: f64) -> CarbonCredits {
    let credits = round_to(balance * CREDITS_PER_TOKEN, 1);
    CarbonCredits {
        credits,
        usd_value: round_to(credits * USD_PER_CREDIT, 0),
    }
}

/// Eligibility for every product at `balance` tokens.
///
/// Negative and NaN balances are ineligible everywhere.
pub fn tiers(balance: f64) -> FinanceTiers {
    use Eligibility::{Eligible, Pilot};

    let loan = if balance >= 200.0 {
        Tier::new(Eligible, "Up to S$5M, -0.3% rate")
    } else if balance >= 100.0 {
        Tier::new(Eligible, "Up to S$2M, -0.2% rate")
    } else if balance >= 50.0 {
        Tier::new(Pilot, "Up to S$1M, -0.1% rate")
    } else {
        Tier::ineligible()
    };

    let bond = if balance >= 200.0 {
        Tier::new(Eligible, "Coupon reduced by 0.2%")
    } else if balance >= 100.0 {
        Tier::new(Pilot, "Pilot eligible, coupon -0.1%")
    } else {
        Tier::ineligible()
    };

    let carbon_credit = if balance >= 1.0 {
        let c = carbon_credits(balance);
        Tier::new(Eligible, format!("{:.1} credits (~USD {:.0})", c.credits, c.usd_value))
    } else {
        Tier::ineligible()
    };

    let insurance = if balance >= 200.0 {
        Tier::new(Eligible, "Premium discount 8%")
    } else if balance >= 100.0 {
        Tier::new(Eligible, "Premium discount 5%")
    } else {
        Tier::ineligible()
    };

    let supply_chain_finance = if balance >= 200.0 {
        Tier::new(Eligible, "Discount rate -0.3%")
    } else if balance >= 50.0 {
        Tier::new(Eligible, "Discount rate -0.2%")
    } else {
        Tier::ineligible()
    };

    FinanceTiers {
        loan,
        bond,
        carbon_credit,
        insurance,
        supply_chain_finance,
    }
}
