//! Report aggregation over the pomodoros started inside a window.

use crate::errors::{AppError, AppResult};
use crate::models::entry::{Entry, TimeRange};
use crate::models::report::{DailyTotal, Report, ReportPeriod};
use crate::utils::date::{days_between, month_start, next_month_start, week_start};
use crate::utils::time::day_start;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Whole days `[start, end)` covered by a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    /// Window of `period` containing `date`. Weeks start on Monday.
    pub fn for_period(period: ReportPeriod, date: NaiveDate) -> Self {
        match period {
            ReportPeriod::Day => Self {
                start: date,
                end: date + Duration::days(1),
            },
            ReportPeriod::Week => {
                let start = week_start(date);
                Self {
                    start,
                    end: start + Duration::days(7),
                }
            }
            ReportPeriod::Month => Self {
                start: month_start(date),
                end: next_month_start(date),
            },
        }
    }

    /// Explicit window; an empty one still reports its first day.
    pub fn between(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if end < start {
            return Err(AppError::InvalidPeriod(format!(
                "report window ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(Some(day_start(self.start)), Some(day_start(self.end)))
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        let days = days_between(self.start, self.end);
        if days.is_empty() {
            vec![self.start]
        } else {
            days
        }
    }
}

/// Aggregate `entries` (already filtered to the window) using their stored
/// durations. Entries are bucketed by the UTC day of their start time.
pub fn build_report(period: ReportPeriod, window: &ReportWindow, entries: &[Entry]) -> Report {
    let mut by_type: BTreeMap<String, i64> = BTreeMap::new();
    let mut by_day: BTreeMap<NaiveDate, (i64, usize)> = BTreeMap::new();

    for e in entries {
        *by_type.entry(e.category.clone()).or_insert(0) += e.duration_minutes;

        let slot = by_day.entry(e.start_time.date_naive()).or_insert((0, 0));
        slot.0 += e.duration_minutes;
        slot.1 += 1;
    }

    let daily_totals = window
        .days()
        .into_iter()
        .map(|date| {
            let (minutes, count) = by_day.get(&date).copied().unwrap_or((0, 0));
            DailyTotal {
                date,
                minutes,
                count,
            }
        })
        .collect();

    Report {
        period,
        total_minutes: entries.iter().map(|e| e.duration_minutes).sum(),
        total_pomodoros: entries.len(),
        by_type,
        daily_totals,
    }
}
