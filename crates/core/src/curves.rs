//! Remaining-page curves plotted against a [`DateRange`].

use std::collections::HashMap;

use crate::dates::{CalendarDay, DateRange};
use crate::model::Completion;

/// Straight-line plan from `total_pages` on the first day to zero on the last.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_ideal_remaining(total_pages: u32, range: &DateRange) -> Vec<f64> {
    let total = f64::from(total_pages);
    match range.len() {
        0 => Vec::new(),
        1 => vec![total],
        len => {
            let last_index = (len - 1) as f64;
            (0..len)
                .map(|index| (total * (1.0 - index as f64 / last_index)).max(0.0))
                .collect()
        }
    }
}

/// The ideal curve of the whole project, cut to the visible chart window.
///
/// The slope stays that of the real deadline even when the chart shows fewer
/// days than the project spans.
#[must_use]
pub fn compute_ideal_remaining_for_chart(
    total_pages: u32,
    full_range: &DateRange,
    chart_range: &DateRange,
) -> Vec<f64> {
    if full_range.is_empty() || chart_range.is_empty() {
        return Vec::new();
    }
    let mut ideal = compute_ideal_remaining(total_pages, full_range);
    ideal.truncate(chart_range.len());
    ideal
}

/// Pages still to read at the end of each day of `range`.
///
/// Completions are matched to days by date only; days without any repeat the
/// previous value.
#[must_use]
pub fn compute_actual_remaining(
    total_pages: u32,
    range: &DateRange,
    completions: &[Completion],
) -> Vec<u32> {
    let mut per_day: HashMap<CalendarDay, u32> = HashMap::new();
    for completion in completions {
        *per_day.entry(completion.date()).or_default() += 1;
    }

    let mut completed = 0_u32;
    range
        .iter()
        .map(|day| {
            completed = completed.saturating_add(per_day.get(&day).copied().unwrap_or(0));
            total_pages.saturating_sub(completed)
        })
        .collect()
}

/// Extends `actual` past `today` at a constant `current_pace`.
///
/// The result lines up with `range`: up to today it repeats `actual`, after
/// today it falls by `current_pace` per day without going below zero. It is
/// empty when today is outside the range, on its last day, or when `actual`
/// does not match the range.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_projected_remaining(
    actual: &[u32],
    range: &DateRange,
    current_pace: f64,
    today: CalendarDay,
) -> Vec<f64> {
    if actual.len() != range.len() {
        return Vec::new();
    }
    let Some(today_index) = range.position(today) else {
        return Vec::new();
    };
    if today_index + 1 >= range.len() {
        return Vec::new();
    }

    let pace = if current_pace.is_finite() {
        current_pace.max(0.0)
    } else {
        0.0
    };
    let from = f64::from(actual[today_index]);
    actual
        .iter()
        .enumerate()
        .map(|(index, value)| {
            if index <= today_index {
                f64::from(*value)
            } else {
                let elapsed = (index - today_index) as f64;
                (from - elapsed * pace).max(0.0)
            }
        })
        .collect()
}
