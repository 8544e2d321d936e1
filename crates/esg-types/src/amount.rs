use std::fmt;

use serde::{Deserialize, Serialize};

/// Decimal places of the governance token.
pub const TOKEN_DECIMALS: u32 = 18;

/// A token balance in base units (`balance / 10^18` tokens).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const fn from_base_units(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole tokens, for tests and simulations.
    pub fn from_tokens(tokens: u64) -> Self {
        Self(u128::from(tokens) * Self::scale())
    }

    pub const fn base_units(&self) -> u128 {
        self.0
    }

    const fn scale() -> u128 {
        10u128.pow(TOKEN_DECIMALS)
    }

    /// Decimal rendering with trailing zeros trimmed, and the point too for
    /// whole amounts: `200`, `0`, `0.5`, `1.000000000000000001`.
    pub fn format_units(&self) -> String {
        let whole = self.0 / Self::scale();
        let frac = self.0 % Self::scale();
        let frac = format!("{:0width$}", frac, width = TOKEN_DECIMALS as usize);
        let frac = frac.trim_end_matches('0');
        if frac.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{frac}")
        }
    }

    /// Human balance as a float, for threshold checks.
    pub fn to_f64(&self) -> f64 {
        self.format_units().parse().unwrap_or_default()
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_units())
    }
}
