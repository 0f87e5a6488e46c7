//! Review domain model.
//!
//! # Responsibility
//! - Hold one performance review written for an employee.
//! - Enforce field rules on construction and on every assignment.
//!
//! # Invariants
//! - `year >= MIN_REVIEW_YEAR`.
//! - `summary` contains at least one non-whitespace character. The text is
//!   stored exactly as given, not trimmed.
//! - `employee_id` resolved to an existing employee when it was assigned.
//! - `id` is `None` until the review is first saved, and again after it is
//!   deleted.

use crate::model::employee::EmployeeId;
use crate::repo::employee_repo::EmployeeLookup;
use crate::repo::RepoResult;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned review primary key.
pub type ReviewId = i64;

/// Earliest accepted review year.
pub const MIN_REVIEW_YEAR: i64 = 2000;

/// Field rule violations for [`Review`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewValidationError {
    /// Stored `year` column held something other than an integer.
    YearNotInteger,
    YearTooEarly { year: i64 },
    EmptySummary,
    /// Stored `employee_id` column held something other than an integer.
    EmployeeIdNotInteger,
    UnknownEmployee(EmployeeId),
}

impl Display for ReviewValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::YearNotInteger => write!(f, "year must be an integer"),
            Self::YearTooEarly { year } => write!(
                f,
                "year must be greater than or equal to {MIN_REVIEW_YEAR}, got {year}"
            ),
            Self::EmptySummary => write!(f, "summary must have at least one character"),
            Self::EmployeeIdNotInteger => write!(f, "employee id must be an integer"),
            Self::UnknownEmployee(id) => write!(f, "employee with id {id} does not exist"),
        }
    }
}

impl Error for ReviewValidationError {}

/// One employee review.
///
/// Fields are private so that every mutation goes through a validating
/// setter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    id: Option<ReviewId>,
    year: i64,
    summary: String,
    employee_id: EmployeeId,
}

impl Review {
    /// Builds an unsaved review.
    ///
    /// # Errors
    /// - `RepoError::Validation` when any field rule is violated, including an
    ///   `employee_id` unknown to `employees`.
    /// - `RepoError::Db` when the employee lookup itself fails.
    pub fn new(
        year: i64,
        summary: impl Into<String>,
        employee_id: EmployeeId,
        employees: &impl EmployeeLookup,
    ) -> RepoResult<Self> {
        Self::build(None, year, summary.into(), employee_id, employees)
    }

    /// Builds a review that already carries a storage identifier.
    ///
    /// Used when hydrating rows; the same field rules apply.
    pub fn with_id(
        id: ReviewId,
        year: i64,
        summary: impl Into<String>,
        employee_id: EmployeeId,
        employees: &impl EmployeeLookup,
    ) -> RepoResult<Self> {
        Self::build(Some(id), year, summary.into(), employee_id, employees)
    }

    fn build(
        id: Option<ReviewId>,
        year: i64,
        summary: String,
        employee_id: EmployeeId,
        employees: &impl EmployeeLookup,
    ) -> RepoResult<Self> {
        validate_year(year)?;
        validate_summary(&summary)?;
        ensure_employee_exists(employee_id, employees)?;
        Ok(Self {
            id,
            year,
            summary,
            employee_id,
        })
    }

    pub fn id(&self) -> Option<ReviewId> {
        self.id
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    /// Returns whether this review has a row in storage.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Assigns a new year. The old value is kept on failure.
    pub fn set_year(&mut self, year: i64) -> Result<(), ReviewValidationError> {
        validate_year(year)?;
        self.year = year;
        Ok(())
    }

    /// Assigns a new summary. The old value is kept on failure.
    pub fn set_summary(&mut self, summary: impl Into<String>) -> Result<(), ReviewValidationError> {
        let summary = summary.into();
        validate_summary(&summary)?;
        self.summary = summary;
        Ok(())
    }

    /// Re-points the review at another employee after checking it exists.
    pub fn set_employee_id(
        &mut self,
        employee_id: EmployeeId,
        employees: &impl EmployeeLookup,
    ) -> RepoResult<()> {
        ensure_employee_exists(employee_id, employees)?;
        self.employee_id = employee_id;
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: ReviewId) {
        self.id = Some(id);
    }

    pub(crate) fn clear_id(&mut self) {
        self.id = None;
    }
}

impl Display for Review {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = self
            .id
            .map_or_else(|| "None".to_string(), |id| id.to_string());
        write!(
            f,
            "<Review {id}: {}, {}, Employee: {}>",
            self.year, self.summary, self.employee_id
        )
    }
}

fn validate_year(year: i64) -> Result<(), ReviewValidationError> {
    if year < MIN_REVIEW_YEAR {
        return Err(ReviewValidationError::YearTooEarly { year });
    }
    Ok(())
}

fn validate_summary(summary: &str) -> Result<(), ReviewValidationError> {
    if summary.trim().is_empty() {
        return Err(ReviewValidationError::EmptySummary);
    }
    Ok(())
}

fn ensure_employee_exists(
    employee_id: EmployeeId,
    employees: &impl EmployeeLookup,
) -> RepoResult<()> {
    if !employees.employee_exists(employee_id)? {
        return Err(ReviewValidationError::UnknownEmployee(employee_id).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Review, ReviewValidationError};
    use crate::model::employee::EmployeeId;
    use crate::repo::employee_repo::EmployeeLookup;
    use crate::repo::{RepoError, RepoResult};

    struct KnownEmployees(&'static [EmployeeId]);

    impl EmployeeLookup for KnownEmployees {
        fn employee_exists(&self, id: EmployeeId) -> RepoResult<bool> {
            Ok(self.0.contains(&id))
        }
    }

    const STAFF: KnownEmployees = KnownEmployees(&[1, 2]);

    #[test]
    fn new_review_starts_unsaved() {
        let review = Review::new(2023, "Solid year", 1, &STAFF).unwrap();
        assert_eq!(review.id(), None);
        assert!(!review.is_persisted());
        assert_eq!(review.year(), 2023);
        assert_eq!(review.summary(), "Solid year");
        assert_eq!(review.employee_id(), 1);
    }

    #[test]
    fn year_before_2000_is_rejected() {
        let err = Review::new(1999, "Too early", 1, &STAFF).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ReviewValidationError::YearTooEarly { year: 1999 })
        ));
    }

    #[test]
    fn whitespace_summary_is_rejected() {
        let err = Review::new(2021, " \t\n", 1, &STAFF).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ReviewValidationError::EmptySummary)
        ));
    }

    #[test]
    fn unknown_employee_is_rejected() {
        let err = Review::new(2021, "Ghost", 99, &STAFF).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ReviewValidationError::UnknownEmployee(99))
        ));
    }

    #[test]
    fn failed_setter_keeps_previous_value() {
        let mut review = Review::new(2022, "Original", 1, &STAFF).unwrap();

        assert_eq!(
            review.set_year(1980).unwrap_err(),
            ReviewValidationError::YearTooEarly { year: 1980 }
        );
        assert_eq!(review.year(), 2022);

        assert_eq!(
            review.set_summary("").unwrap_err(),
            ReviewValidationError::EmptySummary
        );
        assert_eq!(review.summary(), "Original");

        review.set_employee_id(7, &STAFF).unwrap_err();
        assert_eq!(review.employee_id(), 1);

        review.set_employee_id(2, &STAFF).unwrap();
        assert_eq!(review.employee_id(), 2);
    }

    #[test]
    fn display_matches_record_layout() {
        let mut review = Review::new(2020, "Great work", 2, &STAFF).unwrap();
        assert_eq!(review.to_string(), "<Review None: 2020, Great work, Employee: 2>");

        review.assign_id(5);
        assert_eq!(review.to_string(), "<Review 5: 2020, Great work, Employee: 2>");
    }
}
