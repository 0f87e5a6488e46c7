//! Repository layer over SQLite.
//!
//! # Responsibility
//! - Own the `employees` and `reviews` tables: schema, SQL, row hydration.
//! - Return semantic errors (`NotFound`, `NotPersisted`) in addition to DB
//!   transport errors.
//!
//! # Invariants
//! - Every write path validates the record before touching SQL.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::employee::EmployeeValidationError;
use crate::model::review::ReviewValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod employee_repo;
pub mod review_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error shared by all repositories.
#[derive(Debug)]
pub enum RepoError {
    Validation(ReviewValidationError),
    EmployeeValidation(EmployeeValidationError),
    Db(DbError),
    /// No row with this primary key.
    NotFound(i64),
    /// Operation requires a record that has been saved; carries the
    /// operation name.
    NotPersisted(&'static str),
    InvalidData(String),
    /// A different in-memory instance is already mapped to this id.
    IdentityConflict(i64),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EmployeeValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "row not found: {id}"),
            Self::NotPersisted(operation) => write!(
                f,
                "cannot {operation} a review that hasn't been saved to the database yet"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::IdentityConflict(id) => {
                write!(f, "another instance is already loaded for review {id}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::EmployeeValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::NotPersisted(_)
            | Self::InvalidData(_)
            | Self::IdentityConflict(_) => None,
        }
    }
}

impl From<ReviewValidationError> for RepoError {
    fn from(value: ReviewValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<EmployeeValidationError> for RepoError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::EmployeeValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
