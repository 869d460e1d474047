//! Pace statistics for a reading goal.
//!
//! Every day count is a calendar-date difference, so a daylight-saving shift
//! inside the project never changes a result.

use serde::Serialize;

use crate::dates::{CalendarDay, inclusive_day_count};
use crate::model::{Completion, Project};

/// Everything the pace calculation needs, with "today" passed in explicitly.
#[derive(Debug, Clone, Copy)]
pub struct PaceInput<'a> {
    pub total_pages: u32,
    pub start_date: CalendarDay,
    pub end_date: CalendarDay,
    pub completions: &'a [Completion],
    pub today: CalendarDay,
}

/// Display-ready pace numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaceStats {
    /// Days in the whole project, never below 1.
    pub total_days: u32,
    pub days_done: u32,
    pub days_left: u32,
    pub completed: u32,
    pub remaining: u32,
    /// Pages per day needed when reading every day of the project.
    pub planned_pace: f64,
    /// Pages per day achieved so far.
    pub current_pace: f64,
    /// Pages per day needed from today to finish on the end date.
    pub pace_needed: f64,
    /// Share of the goal completed, clamped to `0..=100`.
    pub percent_done: f64,
}

impl<'a> PaceInput<'a> {
    #[must_use]
    pub fn for_project(project: &'a Project, today: CalendarDay) -> Self {
        Self {
            total_pages: project.total_pages(),
            start_date: project.start_date(),
            end_date: project.end_date(),
            completions: project.completions(),
            today,
        }
    }

    #[must_use]
    pub fn compute(&self) -> PaceStats {
        compute_pace_stats(self)
    }
}

fn clamp_days(raw: i64, total_days: i64) -> u32 {
    u32::try_from(raw.clamp(0, total_days)).unwrap_or(u32::MAX)
}

/// Derive pace statistics from project state and `input.today`.
#[must_use]
pub fn compute_pace_stats(input: &PaceInput<'_>) -> PaceStats {
    let total_days_raw = inclusive_day_count(input.start_date, input.end_date).max(1);
    let total_days = clamp_days(total_days_raw, total_days_raw);
    let days_done = clamp_days(
        inclusive_day_count(input.start_date, input.today),
        total_days_raw,
    );
    let days_left = clamp_days(
        inclusive_day_count(input.today, input.end_date),
        total_days_raw,
    );

    let completed = u32::try_from(input.completions.len()).unwrap_or(u32::MAX);
    let remaining = input.total_pages.saturating_sub(completed);

    let total_pages = f64::from(input.total_pages);
    let planned_pace = total_pages / f64::from(total_days);
    let current_pace = f64::from(completed) / f64::from(days_done.max(1));
    let pace_needed = f64::from(remaining) / f64::from(days_left.max(1));
    let percent_done = if input.total_pages == 0 {
        0.0
    } else {
        (f64::from(completed) / total_pages * 100.0).min(100.0)
    };

    PaceStats {
        total_days,
        days_done,
        days_left,
        completed,
        remaining,
        planned_pace,
        current_pace,
        pace_needed,
        percent_done,
    }
}
