#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod lesson_sheet_service;
pub mod roster_service;
pub mod schedule_service;
pub mod summary_service;

pub use lms_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, LessonSheetError, RosterError, ScheduleError, SummaryError};
pub use lesson_sheet_service::{LessonSheetService, SaveOutcome};
pub use roster_service::{CallParty, RosterService};
pub use schedule_service::ScheduleService;
pub use summary_service::{StudentSummary, StudentSummaryService};
