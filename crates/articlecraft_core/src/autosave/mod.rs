//! Debounced draft persistence.
//!
//! # Responsibility
//! - Decide when the current draft is persisted.
//! - Define the persistence collaborator contract.

pub mod clock;
pub mod coordinator;
pub mod persistence;
