//! Employee repository and the foreign-key lookup used by reviews.
//!
//! # Invariants
//! - `employees.id` is the parent key of `reviews.employee_id`.
//! - Lookups never cache; the connection is the source of truth.

use crate::model::employee::{Employee, EmployeeId};
use crate::repo::{RepoError, RepoResult};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Resolves whether an employee row exists.
///
/// Reviews validate their `employee_id` through this trait, which keeps the
/// review model independent of how employees are stored.
pub trait EmployeeLookup {
    fn employee_exists(&self, id: EmployeeId) -> RepoResult<bool>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Creates the `employees` table if it is missing.
    pub fn create_table(&self) -> RepoResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY,
                name TEXT,
                job_title TEXT
            );",
        )?;
        info!("event=table_create module=repo table=employees status=ok");
        Ok(())
    }

    /// Drops the `employees` table if it exists.
    pub fn drop_table(&self) -> RepoResult<()> {
        self.conn.execute_batch("DROP TABLE IF EXISTS employees;")?;
        info!("event=table_drop module=repo table=employees status=ok");
        Ok(())
    }

    /// Inserts `employee` and assigns its generated id.
    pub fn save(&self, employee: &mut Employee) -> RepoResult<EmployeeId> {
        if let Some(id) = employee.id() {
            let changed = self.conn.execute(
                "UPDATE employees SET name = ?1, job_title = ?2 WHERE id = ?3;",
                params![employee.name(), employee.job_title(), id],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(id));
            }
            return Ok(id);
        }

        self.conn.execute(
            "INSERT INTO employees (name, job_title) VALUES (?1, ?2);",
            params![employee.name(), employee.job_title()],
        )?;
        let id = self.conn.last_insert_rowid();
        employee.assign_id(id);
        debug!("event=employee_save module=repo status=ok employee_id={id}");
        Ok(id)
    }

    /// Validates, inserts and returns a new employee.
    pub fn create(&self, name: &str, job_title: &str) -> RepoResult<Employee> {
        let mut employee = Employee::new(name, job_title)?;
        self.save(&mut employee)?;
        Ok(employee)
    }

    pub fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let employee = self
            .conn
            .query_row(
                "SELECT id, name, job_title FROM employees WHERE id = ?1;",
                [id],
                |row| Ok(parse_employee_row(row)),
            )
            .optional()?;
        employee.transpose()
    }
}

impl EmployeeLookup for SqliteEmployeeRepository<'_> {
    fn employee_exists(&self, id: EmployeeId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let id: EmployeeId = row.get("id")?;
    let name: Option<String> = row.get("name")?;
    let job_title: Option<String> = row.get("job_title")?;
    let mut employee = Employee::new(name.unwrap_or_default(), job_title.unwrap_or_default())
        .map_err(|err| RepoError::InvalidData(format!("employees row {id}: {err}")))?;
    employee.assign_id(id);
    Ok(employee)
}
