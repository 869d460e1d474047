#![forbid(unsafe_code)]

pub mod app_services;
pub mod celebration_service;
pub mod dashboard;
pub mod error;
pub mod persistence;
pub mod project_service;

pub use countdown_core::Clock;

pub use app_services::AppServices;
pub use celebration_service::CelebrationService;
pub use dashboard::{AxisTick, ChartView, DashboardView, PageTile, ProjectionSegment};
pub use error::{AppServicesError, ProjectServiceError};
pub use persistence::PersistenceManager;
pub use project_service::{ProjectService, ProjectUpdate};
