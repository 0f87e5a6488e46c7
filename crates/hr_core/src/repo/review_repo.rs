//! Review repository with an identity map.
//!
//! # Responsibility
//! - Own the `reviews` table schema and every SQL statement that touches it.
//! - Hand out one shared in-memory instance per persisted review.
//!
//! # Invariants
//! - At most one `ReviewHandle` per persisted id lives in the identity map.
//!   Loading a known id returns the cached handle without re-reading its
//!   fields from the row.
//! - A handle enters the map on first save or first load and leaves it on
//!   delete or `drop_table`.
//! - `update` and `delete` require a saved review (`RepoError::NotPersisted`).

use crate::model::employee::EmployeeId;
use crate::model::review::{Review, ReviewId, ReviewValidationError};
use crate::repo::employee_repo::SqliteEmployeeRepository;
use crate::repo::{RepoError, RepoResult};
use log::{debug, info, warn};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row, Rows};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

const REVIEW_SELECT_SQL: &str = "SELECT id, year, summary, employee_id FROM reviews";

/// Shared, mutable handle to an identity-mapped review.
pub type ReviewHandle = Rc<RefCell<Review>>;

/// SQLite-backed review repository.
///
/// The identity map lives as long as the repository; two repositories over
/// the same connection keep independent maps.
pub struct SqliteReviewRepository<'conn> {
    conn: &'conn Connection,
    employees: SqliteEmployeeRepository<'conn>,
    identity_map: HashMap<ReviewId, ReviewHandle>,
}

impl<'conn> SqliteReviewRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            employees: SqliteEmployeeRepository::new(conn),
            identity_map: HashMap::new(),
        }
    }

    /// Employee collaborator used to validate `employee_id` values.
    pub fn employees(&self) -> &SqliteEmployeeRepository<'conn> {
        &self.employees
    }

    /// Creates the `reviews` table if it is missing.
    pub fn create_table(&self) -> RepoResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY,
                year INT,
                summary TEXT,
                employee_id INTEGER,
                FOREIGN KEY (employee_id) REFERENCES employees(id)
            );",
        )?;
        info!("event=table_create module=repo table=reviews status=ok");
        Ok(())
    }

    /// Drops the `reviews` table if it exists and forgets every cached
    /// instance.
    pub fn drop_table(&mut self) -> RepoResult<()> {
        self.conn.execute_batch("DROP TABLE IF EXISTS reviews;")?;
        let evicted = self.identity_map.len();
        self.identity_map.clear();
        info!("event=table_drop module=repo table=reviews status=ok evicted={evicted}");
        Ok(())
    }

    /// Validates the fields against the employee table and returns an
    /// unsaved review.
    pub fn new_review(
        &self,
        year: i64,
        summary: impl Into<String>,
        employee_id: EmployeeId,
    ) -> RepoResult<Review> {
        Review::new(year, summary, employee_id, &self.employees)
    }

    /// Persists `review`.
    ///
    /// An unsaved review is inserted, receives its generated id and is
    /// registered in the identity map. A review that already carries an id
    /// has its row overwritten and is registered if its id was not mapped
    /// yet.
    ///
    /// # Errors
    /// - `RepoError::IdentityConflict` when another handle is already mapped
    ///   to the same id. Nothing is written in that case.
    pub fn save(&mut self, review: &ReviewHandle) -> RepoResult<()> {
        let existing_id = review.borrow().id();
        if let Some(id) = existing_id {
            if let Some(mapped) = self.identity_map.get(&id) {
                if !Rc::ptr_eq(mapped, review) {
                    warn!("event=review_save module=repo status=conflict review_id={id}");
                    return Err(RepoError::IdentityConflict(id));
                }
            }
            self.write_row(id, &review.borrow())?;
            self.identity_map
                .entry(id)
                .or_insert_with(|| Rc::clone(review));
            return Ok(());
        }

        let id = {
            let current = review.borrow();
            self.conn.execute(
                "INSERT INTO reviews (year, summary, employee_id) VALUES (?1, ?2, ?3);",
                params![current.year(), current.summary(), current.employee_id()],
            )?;
            self.conn.last_insert_rowid()
        };
        review.borrow_mut().assign_id(id);
        self.identity_map.insert(id, Rc::clone(review));
        debug!("event=review_save module=repo status=ok op=insert review_id={id}");
        Ok(())
    }

    /// Builds, saves and returns a new identity-mapped review.
    pub fn create(
        &mut self,
        year: i64,
        summary: impl Into<String>,
        employee_id: EmployeeId,
    ) -> RepoResult<ReviewHandle> {
        let handle = Rc::new(RefCell::new(self.new_review(year, summary, employee_id)?));
        self.save(&handle)?;
        Ok(handle)
    }

    /// Loads one review by primary key.
    ///
    /// Returns the cached handle when the id is already mapped.
    pub fn find_by_id(&mut self, id: ReviewId) -> RepoResult<Option<ReviewHandle>> {
        let conn = self.conn;
        let mut stmt = conn.prepare(&format!("{REVIEW_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let handle = self.instance_from_row(row)?;
        Ok(Some(handle))
    }

    /// Overwrites the stored row with the review's current fields.
    pub fn update(&self, review: &ReviewHandle) -> RepoResult<()> {
        let current = review.borrow();
        let id = current.id().ok_or(RepoError::NotPersisted("update"))?;
        self.write_row(id, &current)
    }

    /// Deletes the review's row, evicts it from the identity map and clears
    /// its id.
    ///
    /// The handle is left untouched when the row is already gone.
    pub fn delete(&mut self, review: &ReviewHandle) -> RepoResult<()> {
        let id = review
            .borrow()
            .id()
            .ok_or(RepoError::NotPersisted("delete"))?;

        let changed = self
            .conn
            .execute("DELETE FROM reviews WHERE id = ?1;", [id])?;
        if changed == 0 {
            warn!("event=review_delete module=repo status=not_found review_id={id}");
            return Err(RepoError::NotFound(id));
        }

        self.identity_map.remove(&id);
        review.borrow_mut().clear_id();
        debug!("event=review_delete module=repo status=ok review_id={id}");
        Ok(())
    }

    /// Returns every stored review in row order.
    pub fn get_all(&mut self) -> RepoResult<Vec<ReviewHandle>> {
        let conn = self.conn;
        let mut stmt = conn.prepare(&format!("{REVIEW_SELECT_SQL};"))?;
        let rows = stmt.query([])?;
        self.collect_instances(rows)
    }

    /// Returns every review written for one employee, in row order.
    pub fn find_by_employee(&mut self, employee_id: EmployeeId) -> RepoResult<Vec<ReviewHandle>> {
        let conn = self.conn;
        let mut stmt = conn.prepare(&format!("{REVIEW_SELECT_SQL} WHERE employee_id = ?1;"))?;
        let rows = stmt.query([employee_id])?;
        self.collect_instances(rows)
    }

    /// Returns whether an instance for `id` is currently mapped.
    pub fn is_cached(&self, id: ReviewId) -> bool {
        self.identity_map.contains_key(&id)
    }

    pub fn cached_count(&self) -> usize {
        self.identity_map.len()
    }

    fn write_row(&self, id: ReviewId, review: &Review) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE reviews
             SET year = ?1, summary = ?2, employee_id = ?3
             WHERE id = ?4;",
            params![review.year(), review.summary(), review.employee_id(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        debug!("event=review_save module=repo status=ok op=update review_id={id}");
        Ok(())
    }

    fn collect_instances(&mut self, mut rows: Rows<'_>) -> RepoResult<Vec<ReviewHandle>> {
        let mut reviews = Vec::new();
        while let Some(row) = rows.next()? {
            reviews.push(self.instance_from_row(row)?);
        }
        Ok(reviews)
    }

    fn instance_from_row(&mut self, row: &Row<'_>) -> RepoResult<ReviewHandle> {
        let id: ReviewId = row.get("id")?;
        if let Some(cached) = self.identity_map.get(&id) {
            return Ok(Rc::clone(cached));
        }

        let review = parse_review_row(id, row, &self.employees)?;
        let handle = Rc::new(RefCell::new(review));
        self.identity_map.insert(id, Rc::clone(&handle));
        Ok(handle)
    }
}

fn parse_review_row(
    id: ReviewId,
    row: &Row<'_>,
    employees: &SqliteEmployeeRepository<'_>,
) -> RepoResult<Review> {
    let year = match row.get_ref("year")? {
        ValueRef::Integer(value) => value,
        _ => return Err(ReviewValidationError::YearNotInteger.into()),
    };
    let employee_id = match row.get_ref("employee_id")? {
        ValueRef::Integer(value) => value,
        _ => return Err(ReviewValidationError::EmployeeIdNotInteger.into()),
    };
    let summary: Option<String> = row.get("summary")?;

    Review::with_id(id, year, summary.unwrap_or_default(), employee_id, employees)
}
