//! Sequential page completion, single-step undo and lock-in.
//!
//! The state lives entirely in the list of completed pages plus the locked
//! frontier. Rejected transitions return their input unchanged.

use std::num::NonZeroU32;

use serde::Serialize;

use crate::model::Project;

/// What a page looks like at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
    /// Completed at or below the locked frontier; permanent.
    Locked,
    /// The most recent completion, above the frontier; can be undone.
    Undoable,
    /// An earlier completion above the frontier.
    Completed,
    /// The one page that can be completed next.
    Active,
    /// Not reachable until the pages before it are done.
    Inert,
}

impl PageState {
    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Locked | Self::Undoable | Self::Completed)
    }
}

/// The page after the highest completed one, or `None` once the goal is met.
#[must_use]
pub fn next_page(total_pages: u32, completed_pages: &[u32]) -> Option<u32> {
    let highest = completed_pages.iter().copied().max().unwrap_or(0);
    highest.checked_add(1).filter(|next| *next <= total_pages)
}

#[must_use]
pub fn is_page_completable(page: u32, total_pages: u32, completed_pages: &[u32]) -> bool {
    next_page(total_pages, completed_pages) == Some(page)
}

/// Appends `page` if it is the next page; otherwise returns the input as is.
#[must_use]
pub fn complete_page(completed_pages: &[u32], page: u32, total_pages: u32) -> Vec<u32> {
    let mut pages = completed_pages.to_vec();
    if is_page_completable(page, total_pages, completed_pages) {
        pages.push(page);
    }
    pages
}

#[must_use]
pub fn can_undo(completed_pages: &[u32], locked_frontier: u32) -> bool {
    completed_pages
        .last()
        .is_some_and(|last| *last > locked_frontier)
}

/// Drops the latest page if it is above the frontier; otherwise returns the input as is.
#[must_use]
pub fn undo_last(completed_pages: &[u32], locked_frontier: u32) -> Vec<u32> {
    let mut pages = completed_pages.to_vec();
    if can_undo(completed_pages, locked_frontier) {
        pages.pop();
    }
    pages
}

/// Candidate frontier for a lock-in: the highest completed page, or 0.
///
/// Committing it is up to the caller, after explicit confirmation and only
/// when it is above the current frontier.
#[must_use]
pub fn lock_in(completed_pages: &[u32]) -> u32 {
    completed_pages.iter().copied().max().unwrap_or(0)
}

/// Fit a project to a new goal size.
///
/// Completions past the new total are dropped and the frontier is clamped to it.
#[must_use]
pub fn reconcile_goal(project: &Project, new_total_pages: NonZeroU32) -> Project {
    project.reconciled(new_total_pages)
}

/// Derived state of a single page.
#[must_use]
pub fn page_state(
    page: u32,
    total_pages: u32,
    completed_pages: &[u32],
    locked_frontier: u32,
) -> PageState {
    if completed_pages.contains(&page) {
        if page <= locked_frontier {
            PageState::Locked
        } else if completed_pages.last() == Some(&page) {
            PageState::Undoable
        } else {
            PageState::Completed
        }
    } else if next_page(total_pages, completed_pages) == Some(page) {
        PageState::Active
    } else {
        PageState::Inert
    }
}

/// Derived state of pages `1..=total_pages`.
#[must_use]
pub fn page_states(total_pages: u32, completed_pages: &[u32], locked_frontier: u32) -> Vec<PageState> {
    let next = next_page(total_pages, completed_pages);
    let last = completed_pages.last().copied();
    let highest = lock_in(completed_pages);

    // Completed pages are exactly 1..=highest.
    (1..=total_pages)
        .map(|page| {
            if page <= highest {
                if page <= locked_frontier {
                    PageState::Locked
                } else if Some(page) == last {
                    PageState::Undoable
                } else {
                    PageState::Completed
                }
            } else if Some(page) == next {
                PageState::Active
            } else {
                PageState::Inert
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProjectDraft;
    use crate::time::{fixed_now, fixed_today};

    #[test]
    fn next_page_is_sequential() {
        assert_eq!(next_page(5, &[]), Some(1));
        assert_eq!(next_page(5, &[1, 2, 3]), Some(4));
        assert_eq!(next_page(3, &[1, 2, 3]), None);
        assert_eq!(next_page(u32::MAX, &[u32::MAX]), None);
    }

    #[test]
    fn only_the_next_page_is_completable() {
        assert!(is_page_completable(1, 5, &[]));
        assert!(!is_page_completable(2, 5, &[]));
        assert!(is_page_completable(2, 5, &[1]));
        assert!(!is_page_completable(4, 5, &[1, 2]));
        assert!(!is_page_completable(4, 3, &[1, 2, 3]));
    }

    #[test]
    fn complete_page_only_adds_the_next_page() {
        assert_eq!(complete_page(&[], 1, 5), vec![1]);
        assert_eq!(complete_page(&[1], 3, 5), vec![1]);
        assert_eq!(complete_page(&[1], 2, 5), vec![1, 2]);
        assert_eq!(complete_page(&[1, 2], 3, 2), vec![1, 2]);
    }

    #[test]
    fn undo_is_blocked_at_the_frontier() {
        assert!(can_undo(&[1, 2, 3], 0));
        assert!(!can_undo(&[1, 2, 3], 3));
        assert!(!can_undo(&[], 0));

        assert_eq!(undo_last(&[1, 2, 3], 0), vec![1, 2]);
        assert_eq!(undo_last(&[1, 2, 3], 3), vec![1, 2, 3]);
        assert!(undo_last(&[], 0).is_empty());
    }

    #[test]
    fn complete_then_undo_restores_the_input() {
        let pages = vec![1, 2];
        let completed = complete_page(&pages, 3, 10);
        assert_eq!(undo_last(&completed, 0), pages);
    }

    #[test]
    fn lock_in_is_the_highest_completed_page() {
        assert_eq!(lock_in(&[]), 0);
        assert_eq!(lock_in(&[1, 2, 3]), 3);
    }

    #[test]
    fn page_states_cover_every_page() {
        let states = page_states(6, &[1, 2, 3, 4], 2);
        assert_eq!(
            states,
            vec![
                PageState::Locked,
                PageState::Locked,
                PageState::Completed,
                PageState::Undoable,
                PageState::Active,
                PageState::Inert,
            ]
        );
        for (page, state) in (1..=6).zip(&states) {
            assert_eq!(page_state(page, 6, &[1, 2, 3, 4], 2), *state);
        }
    }

    #[test]
    fn fully_locked_goal_has_no_active_page() {
        let states = page_states(3, &[1, 2, 3], 3);
        assert!(states.iter().all(|state| *state == PageState::Locked));
        assert!(states.iter().all(|state| state.is_completed()));
    }

    #[test]
    fn reconcile_goal_drops_pages_beyond_the_new_total() {
        let mut project = ProjectDraft::new(10, "2025-01-01", "2025-01-10")
            .validate(fixed_now())
            .unwrap();
        for page in 1..=6 {
            project.complete_page(page, fixed_today());
        }
        project.commit_lock_in(6);

        let smaller = reconcile_goal(&project, NonZeroU32::new(4).unwrap());
        assert_eq!(smaller.total_pages(), 4);
        assert_eq!(smaller.completed_pages(), vec![1, 2, 3, 4]);
        assert_eq!(smaller.locked_frontier(), 4);

        let larger = reconcile_goal(&project, NonZeroU32::new(20).unwrap());
        assert_eq!(larger.completed_pages(), project.completed_pages());
        assert_eq!(larger.locked_frontier(), 6);
    }
}
