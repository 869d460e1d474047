use countdown_core::completion::PageState;
use countdown_core::curves::{
    compute_actual_remaining, compute_ideal_remaining_for_chart, compute_projected_remaining,
};
use countdown_core::dates::{CalendarDay, DateRange, to_date_key};
use countdown_core::model::Project;
use countdown_core::pace::PaceStats;
use serde::Serialize;

/// Most axis labels shown under the chart.
pub const MAX_AXIS_TICKS: usize = 6;

/// Presentation-agnostic snapshot of everything the tracker shows.
///
/// No pre-formatted numbers: the renderer decides rounding and layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub today: CalendarDay,
    pub stats: PaceStats,
    pub chart: ChartView,
    pub tiles: Vec<PageTile>,
    /// Frontier offered by the lock button; `None` hides the button.
    pub lock_candidate: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageTile {
    pub page: u32,
    pub state: PageState,
}

/// Chart series aligned to `days`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub days: Vec<CalendarDay>,
    /// Top of the y axis, never below 1.
    pub max_y: u32,
    pub ideal: Vec<f64>,
    /// Actual remaining pages drawn as a solid line, up to today when a
    /// projection follows.
    pub actual: Vec<u32>,
    pub projection: Option<ProjectionSegment>,
    pub ticks: Vec<AxisTick>,
}

/// Dashed continuation of the actual line, starting at `offset` (today).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionSegment {
    pub offset: usize,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisTick {
    pub index: usize,
    pub label: String,
}

impl DashboardView {
    #[must_use]
    pub fn build(project: &Project, today: CalendarDay) -> Self {
        let stats = project.pace_stats(today);
        let tiles = (1..)
            .zip(project.page_states())
            .map(|(page, state)| PageTile { page, state })
            .collect();

        Self {
            today,
            stats,
            chart: ChartView::build(project, &stats, today),
            tiles,
            lock_candidate: project.lock_in_candidate(),
        }
    }
}

impl ChartView {
    #[must_use]
    pub fn build(project: &Project, stats: &PaceStats, today: CalendarDay) -> Self {
        let full_range = project.full_range();
        let chart_range = project.chart_range(today);
        let total_pages = project.total_pages();

        let ideal = compute_ideal_remaining_for_chart(total_pages, &full_range, &chart_range);
        let mut actual = compute_actual_remaining(total_pages, &chart_range, project.completions());
        let projected =
            compute_projected_remaining(&actual, &chart_range, stats.current_pace, today);

        let projection = chart_range
            .position(today)
            .filter(|_| projected.len() == chart_range.len())
            .map(|offset| {
                actual.truncate(offset + 1);
                ProjectionSegment {
                    offset,
                    values: projected[offset..].to_vec(),
                }
            });

        Self {
            ticks: axis_ticks(&chart_range),
            days: chart_range.days().to_vec(),
            max_y: total_pages.max(1),
            ideal,
            actual,
            projection,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Evenly spaced labelled indices, first and last day always included.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn axis_ticks(range: &DateRange) -> Vec<AxisTick> {
    let count = range.len().min(MAX_AXIS_TICKS);
    let span = range.len().saturating_sub(1) as f64;
    let steps = count.saturating_sub(1).max(1) as f64;

    (0..count)
        .filter_map(|tick| {
            let index = ((tick as f64 / steps) * span).round() as usize;
            range.get(index).map(|day| AxisTick {
                index,
                label: to_date_key(day),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use countdown_core::dates::build_date_range;
    use countdown_core::model::ProjectDraft;
    use countdown_core::time::fixed_now;

    fn day(y: i32, m: u32, d: u32) -> CalendarDay {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project_with_progress() -> Project {
        let mut project = ProjectDraft::new(10, "2025-01-01", "2025-01-10")
            .validate(fixed_now())
            .unwrap();
        project.complete_page(1, day(2025, 1, 1));
        project.complete_page(2, day(2025, 1, 2));
        project.complete_page(3, day(2025, 1, 2));
        project
    }

    #[test]
    fn splits_actual_and_projection_at_today() {
        let project = project_with_progress();
        let view = DashboardView::build(&project, day(2025, 1, 3));

        assert_eq!(view.chart.days.len(), 6);
        assert_eq!(view.chart.ideal.len(), 6);
        assert_eq!(view.chart.actual, vec![9, 7, 7]);

        let projection = view.chart.projection.expect("projection");
        assert_eq!(projection.offset, 2);
        assert_eq!(projection.values, vec![7.0, 6.0, 5.0, 4.0]);
    }

    #[test]
    fn no_projection_on_the_last_visible_day() {
        let project = project_with_progress();
        let view = DashboardView::build(&project, day(2025, 1, 12));

        assert_eq!(view.chart.days.len(), 10);
        assert_eq!(view.chart.actual.len(), 10);
        assert!(view.chart.projection.is_none());
    }

    #[test]
    fn fresh_project_shows_the_whole_window() {
        let project = ProjectDraft::new(10, "2025-01-01", "2025-01-10")
            .validate(fixed_now())
            .unwrap();
        let view = DashboardView::build(&project, day(2025, 1, 2));

        assert_eq!(view.chart.days.len(), 10);
        assert_eq!(view.lock_candidate, None);
        assert_eq!(view.tiles[0].state, PageState::Active);
        assert!(view.tiles[1..].iter().all(|t| t.state == PageState::Inert));
    }

    #[test]
    fn tiles_and_lock_button_follow_progress() {
        let mut project = project_with_progress();
        project.commit_lock_in(1);
        let view = DashboardView::build(&project, day(2025, 1, 3));

        let states: Vec<_> = view.tiles.iter().take(5).map(|t| t.state).collect();
        assert_eq!(
            states,
            vec![
                PageState::Locked,
                PageState::Completed,
                PageState::Undoable,
                PageState::Active,
                PageState::Inert,
            ]
        );
        assert_eq!(view.tiles.len(), 10);
        assert_eq!(view.lock_candidate, Some(3));
    }

    #[test]
    fn ticks_are_spread_across_the_range() {
        let range = build_date_range(day(2025, 1, 1), day(2025, 1, 11));
        let ticks = axis_ticks(&range);
        let indices: Vec<_> = ticks.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 2, 4, 6, 8, 10]);
        assert_eq!(ticks[5].label, "2025-01-11");

        let single = axis_ticks(&build_date_range(day(2025, 1, 1), day(2025, 1, 1)));
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].index, 0);
    }
}
