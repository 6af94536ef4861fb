//! Café search entry points.
//!
//! # Responsibility
//! - Derive read-only search projections from the canonical catalog.
//! - Keep matching rules in one place for every caller.

pub mod name_filter;
