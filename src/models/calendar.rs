//! Planning horizon and calendar output models.
//!
//! # Time Model
//! The horizon is a sequence of week slots. Slot 0 starts on the Monday of
//! the ISO week that contains the reference date; each later slot starts 7
//! days after the previous one. A slot is labelled twice:
//! - `week_bucket`: ISO year-week, e.g. `2024-W01`
//! - `month_bucket`: calendar month of the slot's Monday, e.g. `2024-01`
//!
//! Both labels sort lexicographically in time order, which the output
//! tables rely on.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::ReasonCode;

/// One week of the planning horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSlot {
    /// Position in the horizon (0-indexed).
    pub index: usize,
    /// Monday starting this week.
    pub start_date: NaiveDate,
    /// ISO year-week label.
    pub week_bucket: String,
    /// Year-month label of `start_date`.
    pub month_bucket: String,
}

impl WeekSlot {
    /// Builds the slot starting on `start_date`.
    pub fn new(index: usize, start_date: NaiveDate) -> Self {
        Self {
            index,
            start_date,
            week_bucket: week_bucket(start_date),
            month_bucket: month_bucket(start_date),
        }
    }
}

/// ISO year-week label (`YYYY-Www`).
pub fn week_bucket(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// Year-month label (`YYYY-MM`).
pub fn month_bucket(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Builds the week slots of a planning horizon.
///
/// Stops early only if the calendar runs past the last representable date.
pub fn planning_weeks(reference_date: NaiveDate, horizon_weeks: usize) -> Vec<WeekSlot> {
    let first = week_start(reference_date);
    (0..horizon_weeks)
        .map_while(|i| {
            first
                .checked_add_days(Days::new(7 * i as u64))
                .map(|d| WeekSlot::new(i, d))
        })
        .collect()
}

/// A committed (customer, week) assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    /// Customer receiving the activity.
    pub customer_id: String,
    /// ISO year-week of the slot.
    pub week_bucket: String,
    /// Month of the slot.
    pub month_bucket: String,
    /// Scheduled activity.
    pub activity_id: String,
    /// Activity category.
    pub category: String,
    /// Activity sub-category.
    pub sub_category: String,
    /// Delivery channel.
    pub channel: String,
    /// Owner of the delivery (derived from the channel).
    pub owner_type: String,
    /// Audit trail for this placement, in evaluation order.
    pub reason_codes: Vec<ReasonCode>,
}

impl CalendarEntry {
    /// Reason codes as a pipe-joined string.
    pub fn reason_codes_joined(&self) -> String {
        self.reason_codes
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-01-03 is a Wednesday
        assert_eq!(week_start(date(2024, 1, 3)), date(2024, 1, 1));
        assert_eq!(week_start(date(2024, 1, 1)), date(2024, 1, 1));
        assert_eq!(week_start(date(2024, 1, 7)), date(2024, 1, 1));
    }

    #[test]
    fn test_buckets() {
        assert_eq!(week_bucket(date(2024, 1, 1)), "2024-W01");
        assert_eq!(week_bucket(date(2024, 12, 30)), "2025-W01"); // ISO year rollover
        assert_eq!(month_bucket(date(2024, 3, 4)), "2024-03");
    }

    #[test]
    fn test_planning_weeks() {
        let weeks = planning_weeks(date(2024, 1, 3), 5);
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0].start_date, date(2024, 1, 1));
        assert_eq!(weeks[4].start_date, date(2024, 1, 29));
        assert_eq!(weeks[4].week_bucket, "2024-W05");
        assert_eq!(weeks[4].month_bucket, "2024-01");
        assert!(weeks.iter().enumerate().all(|(i, w)| w.index == i));
    }

    #[test]
    fn test_planning_weeks_sort_in_time_order() {
        let weeks = planning_weeks(date(2024, 11, 1), 20);
        let buckets: Vec<&str> = weeks.iter().map(|w| w.week_bucket.as_str()).collect();
        let mut sorted = buckets.clone();
        sorted.sort();
        assert_eq!(buckets, sorted);
    }

    #[test]
    fn test_empty_horizon() {
        assert!(planning_weeks(date(2024, 1, 1), 0).is_empty());
    }

    #[test]
    fn test_reason_codes_joined() {
        let entry = CalendarEntry {
            customer_id: "C1".into(),
            week_bucket: "2024-W01".into(),
            month_bucket: "2024-01".into(),
            activity_id: "A1".into(),
            category: "Servicing".into(),
            sub_category: String::new(),
            channel: "Email".into(),
            owner_type: "Digital".into(),
            reason_codes: vec![ReasonCode::PassEligibility, ReasonCode::PassModifier],
        };
        assert_eq!(entry.reason_codes_joined(), "PASS_ELIGIBILITY|PASS_MODIFIER");
    }
}
