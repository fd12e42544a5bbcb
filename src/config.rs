//! Journal configuration: defaults for the account profile and the idea
//! template used when no saved draft exists.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{AccountProfile, IdeaDraft, NewsGuard};

/// Defaults applied on first start and whenever a stored slot is unusable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Initial account profile
    pub account: AccountProfile,

    /// Instrument pre-filled in a new idea
    pub idea_pair: String,

    /// Bias pre-filled in a new idea
    pub idea_bias: String,

    /// Zones pre-filled in a new idea
    pub idea_zones: String,

    /// News flags pre-filled in a new idea
    pub news_guard: NewsGuard,

    /// Export file name prefix, the date and `.csv` are appended
    pub export_prefix: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            account: AccountProfile::default(),
            idea_pair: "XAUUSD".to_string(),
            idea_bias: "D1/H4 Uptrend".to_string(),
            idea_zones: "Demand: 2368–2372 | Supply: 2410–2415".to_string(),
            news_guard: NewsGuard::default(),
            export_prefix: "idea-trade".to_string(),
        }
    }
}

impl JournalConfig {
    /// Template draft for the given day.
    pub fn draft_template(&self, date: NaiveDate) -> IdeaDraft {
        IdeaDraft {
            bias_timeframe: self.idea_bias.clone(),
            zones: self.idea_zones.clone(),
            news_guard: self.news_guard,
            ..IdeaDraft::blank(date, self.idea_pair.clone())
        }
    }

    /// File name for an export made on the given day.
    pub fn export_file_name(&self, date: NaiveDate) -> String {
        format!("{}-{}.csv", self.export_prefix, date.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_template() {
        let config = JournalConfig::default();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let draft = config.draft_template(date);

        assert_eq!(draft.date, date);
        assert_eq!(draft.pair, "XAUUSD");
        assert_eq!(draft.bias_timeframe, "D1/H4 Uptrend");
        assert!(draft.entry.is_empty());
        assert!(draft.news_guard.avoid_news);
        assert_eq!(draft.missing_prices().len(), 3);
    }

    #[test]
    fn test_export_file_name() {
        let config = JournalConfig::default();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(config.export_file_name(date), "idea-trade-2024-03-01.csv");
    }
}
