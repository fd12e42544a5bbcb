//! Trade arithmetic: position sizing and reward:risk.

mod position_sizer;
mod reward_risk;

pub use position_sizer::{PositionSize, PositionSizer};
pub use reward_risk::reward_risk;

use rust_decimal::Decimal;

use crate::models::{AccountProfile, IdeaDraft};

/// Everything derived from the current account and draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdeaMetrics {
    pub sizing: PositionSize,
    pub reward_risk: Decimal,
}

impl IdeaMetrics {
    /// Derive the metrics for a draft under the given account settings.
    pub fn compute(account: &AccountProfile, draft: &IdeaDraft) -> Self {
        Self {
            sizing: PositionSizer::new(account).calculate(&draft.entry, &draft.stop_loss),
            reward_risk: reward_risk(&draft.entry, &draft.stop_loss, &draft.take_profit),
        }
    }
}
