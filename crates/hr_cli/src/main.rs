//! CLI smoke entry point.
//!
//! # Responsibility
//! - Run the review lifecycle once against a real SQLite database.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `hr_cli [DB_PATH]`. Without a path an in-memory database is used.
//! Set `HR_LOG_DIR` (absolute) to enable file logging, and `HR_LOG_LEVEL`
//! to override the build-mode default level.

use hr_core::db::{open_db, open_db_in_memory};
use hr_core::{
    core_version, default_log_level, init_logging, Employee, RepoResult, SqliteEmployeeRepository,
    SqliteReviewRepository,
};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("hr_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = std::env::var("HR_LOG_DIR") {
        let level = std::env::var("HR_LOG_LEVEL")
            .unwrap_or_else(|_| default_log_level().as_str().to_string());
        init_logging(&level, &log_dir)?;
    }

    println!("hr_core version={}", core_version());

    let conn = match std::env::args().nth(1) {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    smoke_lifecycle(&conn)?;
    Ok(())
}

fn smoke_lifecycle(conn: &Connection) -> RepoResult<()> {
    let employees = SqliteEmployeeRepository::new(conn);
    let mut reviews = SqliteReviewRepository::new(conn);
    employees.create_table()?;
    reviews.create_table()?;

    let mut employee = Employee::new("Lee", "Manager")?;
    let employee_id = employees.save(&mut employee)?;
    println!("employee {employee}");

    let review = reviews.create(2023, "Efficient worker", employee_id)?;
    println!("created {}", review.borrow());

    review.borrow_mut().set_summary("Efficient and reliable worker")?;
    reviews.update(&review)?;

    for stored in reviews.get_all()? {
        println!("stored {}", stored.borrow());
    }

    reviews.delete(&review)?;
    println!("deleted {}", review.borrow());
    info!("event=smoke module=cli status=ok");
    Ok(())
}
