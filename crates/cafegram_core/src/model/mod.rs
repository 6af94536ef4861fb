//! Café domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by catalog logic.
//!
//! # Invariants
//! - Every café is identified by a stable `CafeId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod cafe;
