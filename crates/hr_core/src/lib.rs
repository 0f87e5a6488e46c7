//! Core persistence for employee reviews.
//!
//! Reviews are validated on every assignment, stored in SQLite and handed
//! out through an identity map so each row has one live instance per
//! repository.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::employee::{Employee, EmployeeId, EmployeeValidationError};
pub use model::review::{Review, ReviewId, ReviewValidationError, MIN_REVIEW_YEAR};
pub use repo::employee_repo::{EmployeeLookup, SqliteEmployeeRepository};
pub use repo::review_repo::{ReviewHandle, SqliteReviewRepository};
pub use repo::{RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
