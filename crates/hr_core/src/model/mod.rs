//! Domain records persisted by HR core.
//!
//! # Invariants
//! - Field rules are enforced at assignment time; a record value that
//!   exists in memory has always passed validation.
//! - Identifiers are assigned by storage and are `None` until first save.

pub mod employee;
pub mod review;
