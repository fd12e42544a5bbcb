//! Risk-based position sizing: how many lots to trade so that hitting the
//! stop loses exactly the configured share of the account.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::numeric::coerce;
use crate::models::AccountProfile;

/// Point size used when the account has none configured.
const FALLBACK_POINT_SIZE: Decimal = dec!(0.01);

/// Output of the sizing calculation. All fields are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionSize {
    /// Money at risk if the stop is hit
    pub risk_money: Decimal,

    /// Absolute price distance between entry and stop
    pub stop_distance: Decimal,

    /// Stop distance expressed in points
    pub points: Decimal,

    /// Position size in lots
    pub lot_size: Decimal,
}

/// Calculator for lot sizes from an account profile.
pub struct PositionSizer<'a> {
    account: &'a AccountProfile,
}

impl<'a> PositionSizer<'a> {
    /// Create a sizer over the given account settings.
    pub fn new(account: &'a AccountProfile) -> Self {
        Self { account }
    }

    /// Size a position from the raw entry and stop fields.
    ///
    /// Blank prices count as zero. A price that is not a number makes the
    /// stop distance (and everything derived from it) zero.
    pub fn calculate(&self, entry: &str, stop_loss: &str) -> PositionSize {
        let risk_money = self.account.risk_money();

        let stop_distance = match (coerce(entry), coerce(stop_loss)) {
            (Some(e), Some(s)) => e.checked_sub(s).map(|d| d.abs()).unwrap_or(Decimal::ZERO),
            _ => Decimal::ZERO,
        };

        let points = stop_distance
            .checked_div(self.effective_point_size())
            .unwrap_or(Decimal::ZERO);

        let lot_size = if points > Decimal::ZERO {
            points
                .checked_mul(self.value_per_point())
                .and_then(|per_lot| risk_money.checked_div(per_lot))
                .unwrap_or(Decimal::ZERO)
                .max(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        PositionSize {
            risk_money,
            stop_distance,
            points,
            lot_size,
        }
    }

    fn effective_point_size(&self) -> Decimal {
        if self.account.point_size > Decimal::ZERO {
            self.account.point_size
        } else {
            FALLBACK_POINT_SIZE
        }
    }

    fn value_per_point(&self) -> Decimal {
        if self.account.tick_value.is_zero() {
            Decimal::ONE
        } else {
            self.account.tick_value
        }
    }
}
