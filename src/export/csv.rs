//! CSV serialization of the journal.
//!
//! The quoting rule is intentionally narrow: a field is quoted only when it
//! contains a comma, a double quote or a line feed. Files produced by older
//! versions of the journal are read by spreadsheets and scripts that rely on
//! this exact layout.

use crate::models::numeric::fmt2;
use crate::models::IdeaRecord;

/// Column headers, in output order.
pub const HEADERS: [&str; 14] = [
    "Date",
    "Pair",
    "Bias",
    "Zones",
    "Entry",
    "StopLoss",
    "TakeProfit",
    "RewardRiskRatio",
    "LotSize",
    "ATR",
    "HighImpactToday",
    "Within30m",
    "AvoidNews",
    "Notes",
];

/// Quote a single field if it needs it, doubling embedded quotes.
pub fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn flag(on: bool) -> &'static str {
    if on {
        "Y"
    } else {
        "N"
    }
}

/// Fields of one record in column order, unquoted.
pub fn record_fields(record: &IdeaRecord) -> [String; 14] {
    let idea = &record.idea;
    [
        idea.date.format("%Y-%m-%d").to_string(),
        idea.pair.clone(),
        idea.bias_timeframe.clone(),
        idea.zones.clone(),
        idea.entry.clone(),
        idea.stop_loss.clone(),
        idea.take_profit.clone(),
        fmt2(record.reward_risk_ratio),
        fmt2(record.lot_size),
        idea.atr.clone(),
        flag(idea.news_guard.high_impact_today).to_string(),
        flag(idea.news_guard.within_30m).to_string(),
        flag(idea.news_guard.avoid_news).to_string(),
        idea.notes.clone(),
    ]
}

fn row(record: &IdeaRecord) -> String {
    record_fields(record)
        .iter()
        .map(|f| quote_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Serialize records to CSV text: header first, rows joined by `\n`, no
/// trailing newline.
pub fn to_csv<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a IdeaRecord>,
{
    std::iter::once(HEADERS.join(","))
        .chain(records.into_iter().map(row))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::models::{IdeaDraft, NewsGuard};

    fn record(notes: &str) -> IdeaRecord {
        IdeaRecord {
            id: Uuid::new_v4(),
            idea: IdeaDraft {
                bias_timeframe: "D1/H4 Uptrend".to_string(),
                zones: "Demand: 2368–2372 | Supply: 2410–2415".to_string(),
                entry: "2400".to_string(),
                stop_loss: "2390".to_string(),
                take_profit: "2420".to_string(),
                notes: notes.to_string(),
                atr: "12.5".to_string(),
                news_guard: NewsGuard {
                    high_impact_today: true,
                    within_30m: false,
                    avoid_news: true,
                },
                ..IdeaDraft::blank(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), "XAUUSD")
            },
            reward_risk_ratio: Some(dec!(2)),
            lot_size: Some(dec!(1)),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_quote_field() {
        assert_eq!(quote_field("plain"), "plain");
        assert_eq!(quote_field("a, b"), "\"a, b\"");
        assert_eq!(quote_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_quote_field_keeps_legacy_gaps() {
        assert_eq!(quote_field(" padded "), " padded ");
        assert_eq!(quote_field("carriage\rreturn"), "carriage\rreturn");
        assert_eq!(quote_field(""), "");
    }

    #[test]
    fn test_header_only_for_empty_journal() {
        let records: Vec<IdeaRecord> = Vec::new();
        let csv = to_csv(&records);
        assert_eq!(
            csv,
            "Date,Pair,Bias,Zones,Entry,StopLoss,TakeProfit,RewardRiskRatio,LotSize,ATR,HighImpactToday,Within30m,AvoidNews,Notes"
        );
    }

    #[test]
    fn test_row_layout() {
        let csv = to_csv(&[record("clean setup")]);
        let lines: Vec<&str> = csv.split('\n').collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "2024-01-05,XAUUSD,D1/H4 Uptrend,Demand: 2368–2372 | Supply: 2410–2415,2400,2390,2420,2.00,1.00,12.5,Y,N,Y,clean setup"
        );
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_notes_with_comma_and_quotes() {
        let csv = to_csv(&[record("a, b")]);
        assert!(csv.ends_with(",\"a, b\""));

        let csv = to_csv(&[record("say \"hi\"")]);
        assert!(csv.ends_with(",\"say \"\"hi\"\"\""));
    }

    #[test]
    fn test_missing_metrics_render_empty() {
        let mut r = record("");
        r.reward_risk_ratio = None;
        r.lot_size = None;

        let fields = record_fields(&r);
        assert_eq!(fields[7], "");
        assert_eq!(fields[8], "");
    }

    #[test]
    fn test_rows_follow_journal_order() {
        let first = record("first");
        let second = record("second");
        let csv = to_csv([&first, &second]);

        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines[1].ends_with("first"));
        assert!(lines[2].ends_with("second"));
    }
}
