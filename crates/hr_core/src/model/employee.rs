//! Employee domain model.
//!
//! Employees only matter to this crate as the target of the review
//! foreign key, so the record is deliberately small.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned employee primary key.
pub type EmployeeId = i64;

/// Field rule violations for [`Employee`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeValidationError {
    EmptyName,
    EmptyJobTitle,
}

impl Display for EmployeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "employee name must have at least one character"),
            Self::EmptyJobTitle => {
                write!(f, "employee job title must have at least one character")
            }
        }
    }
}

impl Error for EmployeeValidationError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    id: Option<EmployeeId>,
    name: String,
    job_title: String,
}

impl Employee {
    /// Builds an unsaved employee.
    pub fn new(
        name: impl Into<String>,
        job_title: impl Into<String>,
    ) -> Result<Self, EmployeeValidationError> {
        let name = name.into();
        let job_title = job_title.into();
        if name.trim().is_empty() {
            return Err(EmployeeValidationError::EmptyName);
        }
        if job_title.trim().is_empty() {
            return Err(EmployeeValidationError::EmptyJobTitle);
        }
        Ok(Self {
            id: None,
            name,
            job_title,
        })
    }

    pub fn id(&self) -> Option<EmployeeId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn job_title(&self) -> &str {
        &self.job_title
    }

    pub(crate) fn assign_id(&mut self, id: EmployeeId) {
        self.id = Some(id);
    }
}

impl Display for Employee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Employee {id}: {}, {}>", self.name, self.job_title),
            None => write!(f, "<Employee None: {}, {}>", self.name, self.job_title),
        }
    }
}
