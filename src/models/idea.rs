//! Trade ideas: the editable draft and the immutable journal record.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// News proximity flags. Informational only, nothing enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsGuard {
    /// High-impact news scheduled today
    #[serde(default)]
    pub high_impact_today: bool,

    /// High-impact news within 30 minutes
    #[serde(default, rename = "within30m")]
    pub within_30m: bool,

    /// Trader intends to stay flat around news
    #[serde(default = "default_true")]
    pub avoid_news: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NewsGuard {
    fn default() -> Self {
        Self {
            high_impact_today: false,
            within_30m: false,
            avoid_news: true,
        }
    }
}

impl NewsGuard {
    /// News is close and the trader wants to avoid it.
    pub fn should_wait(&self) -> bool {
        self.within_30m && self.avoid_news
    }
}

/// Working copy of the idea form. Price fields hold the raw text typed by
/// the trader and are only interpreted through `numeric::coerce`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaDraft {
    pub date: NaiveDate,

    #[serde(default)]
    pub pair: String,

    /// Higher-timeframe bias, e.g. "D1/H4 Uptrend"
    #[serde(default, rename = "biasTF")]
    pub bias_timeframe: String,

    /// Supply/demand zones and fib levels
    #[serde(default)]
    pub zones: String,

    #[serde(default)]
    pub entry: String,

    #[serde(default, rename = "sl")]
    pub stop_loss: String,

    #[serde(default, rename = "tp")]
    pub take_profit: String,

    #[serde(default)]
    pub notes: String,

    #[serde(default, rename = "news")]
    pub news_guard: NewsGuard,

    /// Average true range, optional
    #[serde(default)]
    pub atr: String,
}

impl IdeaDraft {
    /// Empty draft for the given day, keeping only pair and news defaults.
    pub fn blank(date: NaiveDate, pair: impl Into<String>) -> Self {
        Self {
            date,
            pair: pair.into(),
            bias_timeframe: String::new(),
            zones: String::new(),
            entry: String::new(),
            stop_loss: String::new(),
            take_profit: String::new(),
            notes: String::new(),
            news_guard: NewsGuard::default(),
            atr: String::new(),
        }
    }

    /// Names of the required price fields that are still blank.
    pub fn missing_prices(&self) -> Vec<&'static str> {
        [
            ("entry", &self.entry),
            ("stopLoss", &self.stop_loss),
            ("takeProfit", &self.take_profit),
        ]
        .into_iter()
        .filter(|(_, value)| super::numeric::is_blank(value))
        .map(|(name, _)| name)
        .collect()
    }
}

/// A committed idea. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaRecord {
    pub id: Uuid,

    #[serde(flatten)]
    pub idea: IdeaDraft,

    /// Reward:risk at commit time; `None` for stored rows without a usable number
    #[serde(default, rename = "rr", deserialize_with = "lenient_decimal")]
    pub reward_risk_ratio: Option<Decimal>,

    /// Lot size at commit time
    #[serde(default, rename = "lot", deserialize_with = "lenient_decimal")]
    pub lot_size: Option<Decimal>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Accept a number, a numeric string, `null` or anything else (as `None`).
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => super::numeric::coerce(&n.to_string()),
        serde_json::Value::String(s) if !s.trim().is_empty() => super::numeric::coerce(&s),
        _ => None,
    })
}
