//! Reward:risk ratio of a planned trade.

use rust_decimal::Decimal;

use crate::models::numeric::coerce;

/// Distance to target divided by distance to stop.
///
/// Returns zero when the stop sits on the entry or any price is not a
/// number.
pub fn reward_risk(entry: &str, stop_loss: &str, take_profit: &str) -> Decimal {
    let (Some(entry), Some(stop), Some(target)) =
        (coerce(entry), coerce(stop_loss), coerce(take_profit))
    else {
        return Decimal::ZERO;
    };

    let risk = entry.checked_sub(stop).map(|d| d.abs());
    let reward = target.checked_sub(entry).map(|d| d.abs());

    match (reward, risk) {
        (Some(reward), Some(risk)) if risk > Decimal::ZERO => {
            reward.checked_div(risk).unwrap_or(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    }
}
