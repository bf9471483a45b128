use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PeriodToken {
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "3y")]
    ThreeYears,
}

/// Lookback length of a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodOffset {
    Days(i64),
    Months(u32),
}

impl PeriodToken {
    pub const ALL: [PeriodToken; 7] = [
        PeriodToken::SevenDays,
        PeriodToken::OneMonth,
        PeriodToken::ThreeMonths,
        PeriodToken::SixMonths,
        PeriodToken::OneYear,
        PeriodToken::TwoYears,
        PeriodToken::ThreeYears,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodToken::SevenDays => "7d",
            PeriodToken::OneMonth => "1mo",
            PeriodToken::ThreeMonths => "3mo",
            PeriodToken::SixMonths => "6mo",
            PeriodToken::OneYear => "1y",
            PeriodToken::TwoYears => "2y",
            PeriodToken::ThreeYears => "3y",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PeriodToken::SevenDays => "Last 7 days",
            PeriodToken::OneMonth => "Last 1 month",
            PeriodToken::ThreeMonths => "Last 3 months",
            PeriodToken::SixMonths => "Last 6 months",
            PeriodToken::OneYear => "Last 1 year",
            PeriodToken::TwoYears => "Last 2 years",
            PeriodToken::ThreeYears => "Last 3 years",
        }
    }

    pub fn offset(&self) -> PeriodOffset {
        match self {
            PeriodToken::SevenDays => PeriodOffset::Days(7),
            PeriodToken::OneMonth => PeriodOffset::Months(1),
            PeriodToken::ThreeMonths => PeriodOffset::Months(3),
            PeriodToken::SixMonths => PeriodOffset::Months(6),
            PeriodToken::OneYear => PeriodOffset::Months(12),
            PeriodToken::TwoYears => PeriodOffset::Months(24),
            PeriodToken::ThreeYears => PeriodOffset::Months(36),
        }
    }

    /// Start of the lookback window ending at `now`. Month arithmetic clamps
    /// the day of month, so Mar 31 minus one month is the last day of February.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.offset() {
            PeriodOffset::Days(days) => now - Duration::days(days),
            PeriodOffset::Months(months) => now
                .checked_sub_months(Months::new(months))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }

    pub fn window(&self, now: DateTime<Utc>) -> DateWindow {
        DateWindow {
            from: self.window_start(now),
            to: now,
        }
    }
}

impl Default for PeriodToken {
    fn default() -> Self {
        PeriodToken::OneYear
    }
}

impl fmt::Display for PeriodToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodToken {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        PeriodToken::ALL
            .iter()
            .copied()
            .find(|token| token.as_str() == normalized)
            .ok_or_else(|| AppError::validation(format!("unknown period token: {normalized}")))
    }
}

pub const CUSTOM_PERIOD_LABEL: &str = "Custom Range";

/// A fully determined reporting period. Custom ranges always satisfy
/// `from <= to`; incomplete picks never become a `PeriodSelection`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PeriodSelection {
    Preset { token: PeriodToken },
    Custom { from: NaiveDate, to: NaiveDate },
}

impl PeriodSelection {
    pub fn preset(token: PeriodToken) -> Self {
        PeriodSelection::Preset { token }
    }

    /// Orders the bounds so the `from <= to` invariant holds for any pair of
    /// picked days.
    pub fn custom(first: NaiveDate, second: NaiveDate) -> Self {
        if first <= second {
            PeriodSelection::Custom {
                from: first,
                to: second,
            }
        } else {
            PeriodSelection::Custom {
                from: second,
                to: first,
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PeriodSelection::Preset { token } => token.label(),
            PeriodSelection::Custom { .. } => CUSTOM_PERIOD_LABEL,
        }
    }

    /// Concrete query window. Custom ranges span whole UTC days; a payload
    /// that arrives with inverted bounds is read in calendar order.
    pub fn resolve(&self, now: DateTime<Utc>) -> DateWindow {
        match self {
            PeriodSelection::Preset { token } => token.window(now),
            PeriodSelection::Custom { from, to } => DateWindow {
                from: start_of_day(*from.min(to)),
                to: end_of_day(*from.max(to)),
            },
        }
    }
}

impl Default for PeriodSelection {
    fn default() -> Self {
        PeriodSelection::Preset {
            token: PeriodToken::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant <= self.to
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        let start = start_of_day(date);
        let end = end_of_day(date);
        start <= self.to && end >= self.from
    }

    pub fn from_date(&self) -> NaiveDate {
        self.from.date_naive()
    }

    pub fn to_date(&self) -> NaiveDate {
        self.to.date_naive()
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    at_time(date, 0, 0, 0)
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    at_time(date, 23, 59, 59)
}

fn at_time(date: NaiveDate, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    NaiveTime::from_hms_opt(hour, minute, second)
        .map(|time| Utc.from_utc_datetime(&date.and_time(time)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn tokens_parse_and_print() {
        for token in PeriodToken::ALL {
            assert_eq!(token.as_str().parse::<PeriodToken>().unwrap(), token);
        }
        assert!("5d".parse::<PeriodToken>().is_err());
    }

    #[test]
    fn month_offsets_clamp_day_of_month() {
        let now = at(2024, 3, 31);
        assert_eq!(
            PeriodToken::OneMonth.window_start(now),
            Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()
        );
        assert_eq!(
            PeriodToken::OneYear.window_start(at(2024, 2, 29)),
            Utc.with_ymd_and_hms(2023, 2, 28, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn selection_serializes_as_tagged_union() {
        let preset = PeriodSelection::preset(PeriodToken::ThreeMonths);
        let json = serde_json::to_value(preset).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "preset", "token": "3mo"}));

        let custom: PeriodSelection = serde_json::from_value(serde_json::json!({
            "kind": "custom",
            "from": "2025-01-01",
            "to": "2025-02-01"
        }))
        .unwrap();
        assert_eq!(
            custom,
            PeriodSelection::Custom {
                from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                to: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            }
        );
    }

    #[test]
    fn custom_window_spans_whole_days() {
        let day = NaiveDate::from_ymd_opt(2025, 4, 9).unwrap();
        let window = PeriodSelection::custom(day, day).resolve(Utc::now());
        assert_eq!(window.from, Utc.with_ymd_and_hms(2025, 4, 9, 0, 0, 0).unwrap());
        assert_eq!(window.to, Utc.with_ymd_and_hms(2025, 4, 9, 23, 59, 59).unwrap());
        assert!(window.contains_date(day));
    }
}
