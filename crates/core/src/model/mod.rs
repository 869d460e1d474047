mod project;

pub use project::{
    Completion, MAX_TOTAL_PAGES, Project, ProjectDraft, ProjectError, positive_page_count,
};
