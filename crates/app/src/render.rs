//! Plain-text rendering of the dashboard.

use std::fmt::Write as _;

use countdown_core::celebration::ConfettiBurst;
use countdown_core::completion::PageState;
use countdown_core::dates::to_date_key;
use countdown_core::pace::PaceStats;
use services::{ChartView, DashboardView, PageTile};

const TILES_PER_ROW: usize = 10;

pub fn dashboard(view: &DashboardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Today: {}", to_date_key(view.today));
    out.push_str(&stats(&view.stats));
    out.push('\n');
    out.push_str(&tiles(&view.tiles));
    out.push('\n');
    out.push_str(&chart(&view.chart));
    if let Some(frontier) = view.lock_candidate {
        let _ = writeln!(out, "\nLock in available: pages 1 through {frontier}");
    }
    out
}

pub fn stats(stats: &PaceStats) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Pages: {} done, {} to go ({:.0}%)",
        stats.completed, stats.remaining, stats.percent_done
    );
    let _ = writeln!(
        out,
        "Days: {} of {} elapsed, {} left",
        stats.days_done, stats.total_days, stats.days_left
    );
    let _ = writeln!(
        out,
        "Pace: planned {:.2}/day, current {:.2}/day, needed {:.2}/day",
        stats.planned_pace, stats.current_pace, stats.pace_needed
    );
    out
}

fn tile_glyph(state: PageState) -> char {
    match state {
        PageState::Locked => '#',
        PageState::Undoable => '*',
        PageState::Completed => 'x',
        PageState::Active => '>',
        PageState::Inert => '.',
    }
}

/// Rows of page glyphs, each prefixed with its first page number.
pub fn tiles(tiles: &[PageTile]) -> String {
    let width = tiles.last().map_or(1, |tile| tile.page.to_string().len());
    let mut out = String::new();
    for row in tiles.chunks(TILES_PER_ROW) {
        let glyphs: String = row.iter().map(|tile| tile_glyph(tile.state)).collect();
        let _ = writeln!(out, "{:>width$} {glyphs}", row[0].page);
    }
    out
}

/// One row per charted day: ideal, actual, and projected remaining pages.
pub fn chart(chart: &ChartView) -> String {
    if chart.is_empty() {
        return "No chart data.\n".to_string();
    }

    let mut out = String::from("Day         Ideal  Actual  Projected\n");
    for (index, day) in chart.days.iter().enumerate() {
        let ideal = chart.ideal.get(index).map_or_else(String::new, |v| format!("{v:.1}"));
        let actual = chart
            .actual
            .get(index)
            .map_or_else(String::new, ToString::to_string);
        let projected = chart
            .projection
            .as_ref()
            .and_then(|segment| index.checked_sub(segment.offset))
            .and_then(|offset| chart.projection.as_ref()?.values.get(offset).copied())
            .map_or_else(String::new, |v| format!("{v:.1}"));
        let line = format!("{}  {ideal:>5}  {actual:>6}  {projected:>9}", to_date_key(*day));
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

pub fn confetti(burst: &ConfettiBurst) -> String {
    let shape = if burst.hearts { "hearts" } else { "confetti" };
    format!("{} pieces of {shape}!", burst.pieces.len())
}
