use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Report window granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Day,
    Week,
    Month,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Day => "day",
            ReportPeriod::Week => "week",
            ReportPeriod::Month => "month",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub minutes: i64,
    pub count: usize,
}

/// Aggregated view of the pomodoros started inside a window.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub period: ReportPeriod,
    pub total_minutes: i64,
    pub total_pomodoros: usize,
    pub by_type: BTreeMap<String, i64>,
    pub daily_totals: Vec<DailyTotal>,
}
