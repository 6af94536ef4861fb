//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract the catalog depends on.
//! - Isolate SQLite query details from catalog orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `CafeRecord::validate()` before staging.
//! - Staged writes become durable only through `flush`, all or nothing.

pub mod cafe_repo;
pub mod memory;
