//! Core domain logic for Cafegram.
//! This crate is the single source of truth for café catalog invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::cafe::{CafeEdit, CafeId, CafeRecord, CafeValidationError, NewCafe};
pub use repo::cafe_repo::{CafeRepository, RepoError, RepoResult, SqliteCafeRepository};
pub use repo::memory::MemoryCafeRepository;
pub use search::name_filter::{filter_by_name, NameQuery};
pub use service::catalog::{
    CafeCatalog, CatalogChange, CatalogError, CatalogObserver, CatalogResult, SubscriptionId,
};
pub use service::random::{entropy_source, seeded_source, RandomSource};
pub use service::recommendation::{
    check_in_message, recommend, RecommendError, Recommendation, ReminderAction,
    ReminderScheduler,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
