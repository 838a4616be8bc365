//! Article domain model.
//!
//! # Responsibility
//! - Define the canonical draft shape shared by scoring, autosave and storage.
//! - Own read-only template reference data and slug derivation.
//!
//! # Invariants
//! - Every draft is identified by a stable `ArticleId`.
//! - Template profiles are static and never mutated at runtime.

pub mod draft;
pub mod slug;
pub mod template;
