//! Persistence behind the draft persistence contract.
//!
//! # Invariants
//! - Repository APIs report semantic errors (`NotFound`, `SlugConflict`)
//!   separately from storage failures.

pub mod article_repo;
