use std::num::NonZeroU32;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::completion::{self, PageState};
use crate::dates::{self, CalendarDay, DateRange};
use crate::pace::{PaceInput, PaceStats};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProjectError {
    #[error("Enter a positive page count.")]
    InvalidTotalPages,

    #[error("A goal can have at most {max} pages.")]
    TooManyPages { max: u32 },

    #[error("Start and end dates are required.")]
    MissingDates,

    #[error("not a calendar date: {raw}")]
    InvalidDate { raw: String },

    #[error("End date must be after the start date.")]
    EndNotAfterStart,

    #[error("completions are not sequential: expected page {expected}, found {found}")]
    NonSequentialCompletions { expected: u32, found: u32 },

    #[error("completion for page {page} exceeds the goal of {total_pages} pages")]
    CompletionBeyondTotal { page: u32, total_pages: u32 },

    #[error("locked frontier {frontier} is past the highest completed page {highest}")]
    FrontierBeyondProgress { frontier: u32, highest: u32 },
}

//
// ─── COMPLETION ────────────────────────────────────────────────────────────────
//

/// One finished page and the calendar day it was finished on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Completion {
    page: u32,
    date: CalendarDay,
}

impl Completion {
    #[must_use]
    pub const fn new(page: u32, date: CalendarDay) -> Self {
        Self { page, date }
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn date(&self) -> CalendarDay {
        self.date
    }

    /// The `YYYY-MM-DD` key of the completion day.
    #[must_use]
    pub fn date_key(&self) -> String {
        dates::to_date_key(self.date)
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Raw setup input, exactly as a user typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub total_pages: i64,
    pub start_date: String,
    pub end_date: String,
}

impl ProjectDraft {
    #[must_use]
    pub fn new(
        total_pages: i64,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            total_pages,
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// Validate the draft and create a fresh project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError` when the page count is not positive, a date is
    /// missing or unparseable, or the end date is not after the start date.
    pub fn validate(self, created_at: NaiveDateTime) -> Result<Project, ProjectError> {
        let total_pages = positive_page_count(self.total_pages)?;

        let start_raw = self.start_date.trim();
        let end_raw = self.end_date.trim();
        if start_raw.is_empty() || end_raw.is_empty() {
            return Err(ProjectError::MissingDates);
        }

        let start_date = parse_day(start_raw)?;
        let end_date = parse_day(end_raw)?;
        if end_date <= start_date {
            return Err(ProjectError::EndNotAfterStart);
        }

        Ok(Project {
            total_pages: total_pages.get(),
            start_date,
            end_date,
            completions: Vec::new(),
            locked_frontier: 0,
            created_at,
        })
    }
}

fn parse_day(raw: &str) -> Result<NaiveDate, ProjectError> {
    dates::parse_date_key(raw).ok_or_else(|| ProjectError::InvalidDate {
        raw: raw.to_owned(),
    })
}

/// Largest goal a project accepts. Every page gets a tile on the dashboard.
pub const MAX_TOTAL_PAGES: u32 = 100_000;

/// Checks a user-supplied page count.
///
/// # Errors
///
/// Returns `ProjectError::InvalidTotalPages` when `raw` is not positive and
/// `ProjectError::TooManyPages` when it exceeds [`MAX_TOTAL_PAGES`].
pub fn positive_page_count(raw: i64) -> Result<NonZeroU32, ProjectError> {
    if raw > i64::from(MAX_TOTAL_PAGES) {
        return Err(ProjectError::TooManyPages {
            max: MAX_TOTAL_PAGES,
        });
    }
    u32::try_from(raw)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or(ProjectError::InvalidTotalPages)
}

//
// ─── PROJECT ───────────────────────────────────────────────────────────────────
//

/// The single reading goal being tracked.
///
/// Completions always hold pages `1..=n` in order, every page is within the
/// goal, and the locked frontier never exceeds the highest completed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    total_pages: u32,
    start_date: CalendarDay,
    end_date: CalendarDay,
    completions: Vec<Completion>,
    locked_frontier: u32,
    created_at: NaiveDateTime,
}

impl Project {
    /// Rehydrate a project from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError` if the stored record breaks any project invariant.
    pub fn from_persisted(
        total_pages: u32,
        start_date: CalendarDay,
        end_date: CalendarDay,
        completions: Vec<Completion>,
        locked_frontier: u32,
        created_at: NaiveDateTime,
    ) -> Result<Self, ProjectError> {
        if total_pages == 0 {
            return Err(ProjectError::InvalidTotalPages);
        }
        if total_pages > MAX_TOTAL_PAGES {
            return Err(ProjectError::TooManyPages {
                max: MAX_TOTAL_PAGES,
            });
        }
        if end_date <= start_date {
            return Err(ProjectError::EndNotAfterStart);
        }

        for (expected, completion) in (1_u32..).zip(&completions) {
            if completion.page != expected {
                return Err(ProjectError::NonSequentialCompletions {
                    expected,
                    found: completion.page,
                });
            }
        }

        let highest = completions.last().map_or(0, Completion::page);
        if highest > total_pages {
            return Err(ProjectError::CompletionBeyondTotal {
                page: highest,
                total_pages,
            });
        }
        if locked_frontier > highest {
            return Err(ProjectError::FrontierBeyondProgress {
                frontier: locked_frontier,
                highest,
            });
        }

        Ok(Self {
            total_pages,
            start_date,
            end_date,
            completions,
            locked_frontier,
            created_at,
        })
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub fn start_date(&self) -> CalendarDay {
        self.start_date
    }

    #[must_use]
    pub fn end_date(&self) -> CalendarDay {
        self.end_date
    }

    #[must_use]
    pub fn completions(&self) -> &[Completion] {
        &self.completions
    }

    #[must_use]
    pub fn locked_frontier(&self) -> u32 {
        self.locked_frontier
    }

    #[must_use]
    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// Page numbers of every completion, in completion order.
    #[must_use]
    pub fn completed_pages(&self) -> Vec<u32> {
        self.completions.iter().map(Completion::page).collect()
    }

    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        completion::next_page(self.total_pages, &self.completed_pages())
    }

    #[must_use]
    pub fn is_goal_met(&self) -> bool {
        self.next_page().is_none()
    }

    /// Every day of the project, start through end.
    #[must_use]
    pub fn full_range(&self) -> DateRange {
        dates::build_date_range(self.start_date, self.end_date)
    }

    /// The days shown on the progress chart as of `today`.
    #[must_use]
    pub fn chart_range(&self, today: CalendarDay) -> DateRange {
        dates::build_chart_date_range(self.start_date, self.end_date, &self.completions, today)
    }

    #[must_use]
    pub fn pace_stats(&self, today: CalendarDay) -> PaceStats {
        PaceInput::for_project(self, today).compute()
    }

    /// Derived state of every page, page 1 first.
    #[must_use]
    pub fn page_states(&self) -> Vec<PageState> {
        completion::page_states(self.total_pages, &self.completed_pages(), self.locked_frontier)
    }

    /// Record `page` as finished on `day`.
    ///
    /// Returns `false` and leaves the project untouched unless `page` is the
    /// next page in sequence.
    pub fn complete_page(&mut self, page: u32, day: CalendarDay) -> bool {
        if !completion::is_page_completable(page, self.total_pages, &self.completed_pages()) {
            return false;
        }
        self.completions.push(Completion::new(page, day));
        true
    }

    /// Remove the most recent completion if it sits above the locked frontier.
    pub fn undo_last(&mut self) -> Option<Completion> {
        if !completion::can_undo(&self.completed_pages(), self.locked_frontier) {
            return None;
        }
        self.completions.pop()
    }

    /// The frontier a lock-in would commit, if it would move the current one.
    #[must_use]
    pub fn lock_in_candidate(&self) -> Option<u32> {
        let candidate = completion::lock_in(&self.completed_pages());
        (candidate > self.locked_frontier).then_some(candidate)
    }

    /// Commit a confirmed lock-in.
    ///
    /// The frontier only moves forward and never past the highest completed
    /// page; anything else is rejected with `false`.
    pub fn commit_lock_in(&mut self, frontier: u32) -> bool {
        let highest = completion::lock_in(&self.completed_pages());
        if frontier <= self.locked_frontier || frontier > highest {
            return false;
        }
        self.locked_frontier = frontier;
        true
    }

    /// Change the goal size, dropping progress that no longer fits.
    ///
    /// Returns whether the goal actually changed.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::InvalidTotalPages` if `new_total_pages` is not positive.
    pub fn change_goal(&mut self, new_total_pages: i64) -> Result<bool, ProjectError> {
        let new_total = positive_page_count(new_total_pages)?;
        if new_total.get() == self.total_pages {
            return Ok(false);
        }
        *self = self.reconciled(new_total);
        Ok(true)
    }

    /// A copy of this project with completions and frontier clamped to a new goal.
    #[must_use]
    pub fn reconciled(&self, new_total_pages: NonZeroU32) -> Self {
        let total_pages = new_total_pages.get();
        Self {
            total_pages,
            start_date: self.start_date,
            end_date: self.end_date,
            completions: self
                .completions
                .iter()
                .copied()
                .filter(|c| c.page <= total_pages)
                .collect(),
            locked_frontier: self.locked_frontier.min(total_pages),
            created_at: self.created_at,
        }
    }
}
