//! Account profile: capital and per-trade risk settings.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::numeric::deserialize_coerced;

/// Trader capital and risk settings used for position sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    /// Account balance in account currency
    #[serde(deserialize_with = "deserialize_coerced")]
    pub balance: Decimal,

    /// Percentage of the balance risked per trade (1.0 = 1%)
    #[serde(deserialize_with = "deserialize_coerced")]
    pub risk_percent: Decimal,

    /// Default instrument
    pub pair: String,

    /// Value of one point per lot
    #[serde(default = "default_tick_value", deserialize_with = "deserialize_coerced")]
    pub tick_value: Decimal,

    /// Price distance of one point
    #[serde(default = "default_point_size", deserialize_with = "deserialize_coerced")]
    pub point_size: Decimal,
}

fn default_tick_value() -> Decimal {
    Decimal::ONE
}

fn default_point_size() -> Decimal {
    dec!(0.1)
}

impl Default for AccountProfile {
    fn default() -> Self {
        Self {
            balance: dec!(10000),
            risk_percent: dec!(1.0),
            pair: "XAUUSD".to_string(),
            tick_value: default_tick_value(),
            point_size: default_point_size(),
        }
    }
}

impl AccountProfile {
    /// Money put at risk on a single trade.
    pub fn risk_money(&self) -> Decimal {
        self.balance
            .checked_mul(self.risk_percent)
            .and_then(|v| v.checked_div(dec!(100)))
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO)
    }
}
