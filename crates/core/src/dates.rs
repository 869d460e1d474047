//! Calendar-day normalization and inclusive day ranges.
//!
//! Days are `NaiveDate` values in local time. Stepping and subtraction work on
//! calendar components, so daylight-saving transitions never shift a range.

use chrono::{Days, NaiveDate, NaiveDateTime};

use crate::model::Completion;

/// A date normalized to local midnight.
pub type CalendarDay = NaiveDate;

/// `strftime` pattern of a calendar day key.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Days past "today" that stay visible on the chart once reading has started.
pub const CHART_LOOKAHEAD_DAYS: u64 = 3;

/// Strips the time of day from a local timestamp.
#[must_use]
pub fn normalize(moment: NaiveDateTime) -> CalendarDay {
    moment.date()
}

/// Formats a day as its `YYYY-MM-DD` key.
#[must_use]
pub fn to_date_key(day: CalendarDay) -> String {
    day.format(DATE_KEY_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` key, returning `None` for anything that is not a
/// real calendar date.
#[must_use]
pub fn parse_date_key(raw: &str) -> Option<CalendarDay> {
    NaiveDate::parse_from_str(raw.trim(), DATE_KEY_FORMAT).ok()
}

/// Number of days from `start` through `end`, both included.
///
/// Zero when `end` is before `start`.
#[must_use]
pub fn inclusive_day_count(start: CalendarDay, end: CalendarDay) -> i64 {
    if end < start {
        return 0;
    }
    end.signed_duration_since(start).num_days() + 1
}

/// An ascending, gap-free run of calendar days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    days: Vec<CalendarDay>,
}

impl DateRange {
    /// Enumerates every day from `start` through `end`.
    ///
    /// Returns an empty range when `end` is before `start`.
    #[must_use]
    pub fn build(start: CalendarDay, end: CalendarDay) -> Self {
        if end < start {
            return Self::default();
        }

        let capacity = usize::try_from(inclusive_day_count(start, end)).unwrap_or(0);
        let mut days = Vec::with_capacity(capacity);
        let mut cursor = Some(start);
        while let Some(day) = cursor.filter(|day| *day <= end) {
            days.push(day);
            cursor = day.succ_opt();
        }
        Self { days }
    }

    /// Builds a range from raw day keys; unparseable input yields an empty range.
    #[must_use]
    pub fn from_keys(start: &str, end: &str) -> Self {
        match (parse_date_key(start), parse_date_key(end)) {
            (Some(start), Some(end)) => Self::build(start, end),
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<CalendarDay> {
        self.days.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<CalendarDay> {
        self.days.last().copied()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<CalendarDay> {
        self.days.get(index).copied()
    }

    /// Index of `day` within the range.
    #[must_use]
    pub fn position(&self, day: CalendarDay) -> Option<usize> {
        self.days.binary_search(&day).ok()
    }

    #[must_use]
    pub fn days(&self) -> &[CalendarDay] {
        &self.days
    }

    pub fn iter(&self) -> impl Iterator<Item = CalendarDay> + '_ {
        self.days.iter().copied()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.iter().map(to_date_key).collect()
    }
}

impl<'a> IntoIterator for &'a DateRange {
    type Item = &'a CalendarDay;
    type IntoIter = std::slice::Iter<'a, CalendarDay>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}

/// Inclusive day-by-day range from `start` to `end`.
#[must_use]
pub fn build_date_range(start: CalendarDay, end: CalendarDay) -> DateRange {
    DateRange::build(start, end)
}

/// The window shown on the progress chart.
///
/// Before any page is completed the whole project is visible. Afterwards the
/// window ends [`CHART_LOOKAHEAD_DAYS`] after `today`, never past `end` and
/// never before `start`.
#[must_use]
pub fn build_chart_date_range(
    start: CalendarDay,
    end: CalendarDay,
    completions: &[Completion],
    today: CalendarDay,
) -> DateRange {
    if end < start {
        return DateRange::default();
    }
    if completions.is_empty() {
        return DateRange::build(start, end);
    }

    let window_end = today
        .checked_add_days(Days::new(CHART_LOOKAHEAD_DAYS))
        .unwrap_or(NaiveDate::MAX);
    let capped_end = window_end.min(end).max(start);
    DateRange::build(start, capped_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> CalendarDay {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn completion(page: u32, date: CalendarDay) -> Completion {
        Completion::new(page, date)
    }

    #[test]
    fn normalize_drops_time_of_day() {
        let moment = day(2025, 3, 9).and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(normalize(moment), day(2025, 3, 9));
    }

    #[test]
    fn date_keys_are_zero_padded() {
        assert_eq!(to_date_key(day(2025, 1, 5)), "2025-01-05");
        assert_eq!(parse_date_key(" 2025-01-05 "), Some(day(2025, 1, 5)));
        assert_eq!(parse_date_key("2025-02-30"), None);
        assert_eq!(parse_date_key("not a date"), None);
    }

    #[test]
    fn build_date_range_is_inclusive() {
        let range = build_date_range(day(2025, 1, 1), day(2025, 1, 3));
        assert_eq!(range.len(), 3);
        assert_eq!(range.keys(), vec!["2025-01-01", "2025-01-02", "2025-01-03"]);
    }

    #[test]
    fn build_date_range_crosses_month_and_year_boundaries() {
        let range = build_date_range(day(2024, 12, 30), day(2025, 3, 1));
        assert_eq!(range.first(), Some(day(2024, 12, 30)));
        assert_eq!(range.last(), Some(day(2025, 3, 1)));
        assert_eq!(range.len(), 62);
        assert!(
            range
                .days()
                .windows(2)
                .all(|pair| pair[0].succ_opt() == Some(pair[1]))
        );
    }

    #[test]
    fn build_date_range_spans_daylight_saving_changes() {
        // US and EU spring-forward weekends both fall in this window.
        let range = build_date_range(day(2025, 3, 1), day(2025, 4, 1));
        assert_eq!(range.len(), 32);
        assert_eq!(range.get(30), Some(day(2025, 3, 31)));
    }

    #[test]
    fn build_date_range_single_day() {
        let range = build_date_range(day(2025, 6, 1), day(2025, 6, 1));
        assert_eq!(range.len(), 1);
    }

    #[test]
    fn build_date_range_is_empty_when_reversed_or_invalid() {
        assert!(build_date_range(day(2025, 1, 5), day(2025, 1, 1)).is_empty());
        assert!(DateRange::from_keys("2025-01-01", "garbage").is_empty());
        assert!(DateRange::from_keys("2025-13-01", "2025-12-31").is_empty());
        assert_eq!(DateRange::from_keys("2025-01-01", "2025-01-02").len(), 2);
    }

    #[test]
    fn position_finds_days_inside_the_range() {
        let range = build_date_range(day(2025, 1, 1), day(2025, 1, 10));
        assert_eq!(range.position(day(2025, 1, 4)), Some(3));
        assert_eq!(range.position(day(2025, 1, 11)), None);
    }

    #[test]
    fn inclusive_day_count_counts_both_ends() {
        assert_eq!(inclusive_day_count(day(2025, 1, 1), day(2025, 1, 5)), 5);
        assert_eq!(inclusive_day_count(day(2025, 1, 5), day(2025, 1, 5)), 1);
        assert_eq!(inclusive_day_count(day(2025, 1, 6), day(2025, 1, 5)), 0);
    }

    #[test]
    fn chart_range_shows_everything_before_any_completion() {
        let range = build_chart_date_range(day(2025, 1, 1), day(2025, 1, 5), &[], day(2025, 1, 2));
        assert_eq!(range.len(), 5);
        assert_eq!(range.last(), Some(day(2025, 1, 5)));
    }

    #[test]
    fn chart_range_caps_at_today_plus_three_after_progress() {
        let completions = [completion(1, day(2025, 1, 2))];
        let range = build_chart_date_range(
            day(2025, 1, 1),
            day(2025, 1, 10),
            &completions,
            day(2025, 1, 3),
        );
        assert_eq!(range.len(), 6);
        assert_eq!(range.first(), Some(day(2025, 1, 1)));
        assert_eq!(range.last(), Some(day(2025, 1, 6)));
    }

    #[test]
    fn chart_range_never_passes_the_end_date() {
        let completions = [completion(1, day(2025, 1, 2))];
        let range = build_chart_date_range(
            day(2025, 1, 1),
            day(2025, 1, 5),
            &completions,
            day(2025, 1, 4),
        );
        assert_eq!(range.last(), Some(day(2025, 1, 5)));
    }

    #[test]
    fn chart_range_clamps_to_the_start_when_the_window_ends_early() {
        let completions = [completion(1, day(2025, 1, 11))];
        let range = build_chart_date_range(
            day(2025, 1, 10),
            day(2025, 1, 20),
            &completions,
            day(2025, 1, 1),
        );
        assert_eq!(range.len(), 1);
        assert_eq!(range.first(), Some(day(2025, 1, 10)));
    }
}
