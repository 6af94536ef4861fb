//! Café catalog use-case service.
//!
//! # Responsibility
//! - Own the canonical, name-ordered sequence of café records.
//! - Route every mutation through the repository before touching memory.
//! - Tell observers what changed so a presentation layer can re-render.
//!
//! # Invariants
//! - The canonical sequence is always sorted by accent- and case-folded name,
//!   then case-folded name, then raw name, then id.
//! - A failed stage or flush leaves memory unchanged and notifies nobody.
//! - Search results are fresh projections and never alias catalog storage.

use crate::model::cafe::{CafeEdit, CafeId, CafeRecord, CafeValidationError, NewCafe};
use crate::repo::cafe_repo::{CafeRepository, RepoError, RepoResult};
use crate::search::name_filter::{collation_key, filter_by_name, fold_case};
use crate::service::random::{entropy_source, RandomSource};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors surfaced by catalog operations. None of them are fatal.
#[derive(Debug)]
pub enum CatalogError {
    /// Rejected input, e.g. a blank name.
    Validation(CafeValidationError),
    /// The referenced id is not in the catalog.
    NotFound(CafeId),
    /// A random pick was requested on an empty catalog.
    EmptyCatalog,
    /// The storage backend failed to load or flush.
    Persistence(RepoError),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "cafe not found: {id}"),
            Self::EmptyCatalog => write!(f, "catalog is empty"),
            Self::Persistence(err) => write!(f, "persistence failed: {err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::NotFound(_) | Self::EmptyCatalog => None,
        }
    }
}

impl From<CafeValidationError> for CatalogError {
    fn from(value: CafeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Persistence(other),
        }
    }
}

/// Description of a catalog change delivered to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogChange {
    /// Membership or order changed; here is the full canonical sequence.
    Replaced { records: Vec<CafeRecord> },
    /// One record changed in place at `index`; order is unaffected.
    Updated { index: usize, record: CafeRecord },
}

/// Receives catalog change notifications.
pub trait CatalogObserver {
    fn on_change(&mut self, change: &CatalogChange);
}

impl<F: FnMut(&CatalogChange)> CatalogObserver for F {
    fn on_change(&mut self, change: &CatalogChange) {
        self(change)
    }
}

/// Handle returned by [`CafeCatalog::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The authoritative café collection.
pub struct CafeCatalog<R: CafeRepository> {
    repo: R,
    records: Vec<CafeRecord>,
    observers: Vec<(SubscriptionId, Box<dyn CatalogObserver>)>,
    next_subscription: u64,
    random: Box<dyn RandomSource>,
}

impl<R: CafeRepository> CafeCatalog<R> {
    /// Loads every persisted record and builds the canonical sequence.
    pub fn load(repo: R) -> CatalogResult<Self> {
        let started_at = Instant::now();
        let mut records = repo.load_all().map_err(CatalogError::Persistence)?;
        for record in &records {
            if let Err(err) = record.validate() {
                warn!(
                    "event=catalog_load module=catalog status=error cafe_id={} error={}",
                    record.id, err
                );
                return Err(CatalogError::Persistence(RepoError::InvalidData(format!(
                    "stored cafe {}: {err}",
                    record.id
                ))));
            }
        }
        sort_canonical(&mut records);

        info!(
            "event=catalog_load module=catalog status=ok count={} duration_ms={}",
            records.len(),
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            repo,
            records,
            observers: Vec::new(),
            next_subscription: 0,
            random: entropy_source(),
        })
    }

    /// Replaces the random source used by [`CafeCatalog::pick_random`].
    pub fn with_random_source(mut self, source: Box<dyn RandomSource>) -> Self {
        self.random = source;
        self
    }

    pub fn subscribe(&mut self, observer: impl CatalogObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Immutable view of the canonical sequence.
    pub fn records(&self) -> &[CafeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: CafeId) -> Option<&CafeRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Adds a new café with a freshly assigned id.
    pub fn add(&mut self, draft: NewCafe) -> CatalogResult<CafeRecord> {
        let mut record = CafeRecord::from_new(draft.clone())?;
        while self.get(record.id).is_some() {
            record = CafeRecord::from_new(draft.clone())?;
        }

        self.persist(|repo| repo.upsert(&record))?;
        self.records.push(record.clone());
        sort_canonical(&mut self.records);

        info!(
            "event=cafe_add module=catalog status=ok cafe_id={} count={}",
            record.id,
            self.records.len()
        );
        self.notify_replaced();
        Ok(record)
    }

    /// Deletes a café and returns the removed record.
    pub fn remove(&mut self, id: CafeId) -> CatalogResult<CafeRecord> {
        let index = self.index_of(id)?;

        self.persist(|repo| repo.delete(id))?;
        let removed = self.records.remove(index);

        info!(
            "event=cafe_remove module=catalog status=ok cafe_id={} count={}",
            id,
            self.records.len()
        );
        self.notify_replaced();
        Ok(removed)
    }

    /// Check-in/check-out: negates `is_visited`.
    pub fn toggle_visited(&mut self, id: CafeId) -> CatalogResult<CafeRecord> {
        let index = self.index_of(id)?;
        let mut updated = self.records[index].clone();
        updated.toggle_visited();

        self.persist(|repo| repo.upsert(&updated))?;
        self.records[index] = updated.clone();

        info!(
            "event=cafe_check_in module=catalog status=ok cafe_id={} is_visited={}",
            id, updated.is_visited
        );
        self.notify(CatalogChange::Updated {
            index,
            record: updated.clone(),
        });
        Ok(updated)
    }

    /// Edit flow: replaces descriptive fields and re-sorts.
    pub fn update(&mut self, id: CafeId, edit: CafeEdit) -> CatalogResult<CafeRecord> {
        let index = self.index_of(id)?;
        let mut updated = self.records[index].clone();
        updated.apply_edit(edit);
        updated.validate()?;

        self.persist(|repo| repo.upsert(&updated))?;
        self.records[index] = updated.clone();
        sort_canonical(&mut self.records);

        info!("event=cafe_update module=catalog status=ok cafe_id={id}");
        self.notify_replaced();
        Ok(updated)
    }

    /// Sets or clears (blank input) the rating label.
    pub fn rate(&mut self, id: CafeId, rating: Option<String>) -> CatalogResult<CafeRecord> {
        let index = self.index_of(id)?;
        let mut updated = self.records[index].clone();
        updated.set_rating(rating);

        self.persist(|repo| repo.upsert(&updated))?;
        self.records[index] = updated.clone();

        info!(
            "event=cafe_rate module=catalog status=ok cafe_id={} rated={}",
            id,
            updated.rating.is_some()
        );
        self.notify(CatalogChange::Updated {
            index,
            record: updated.clone(),
        });
        Ok(updated)
    }

    /// Case-insensitive name search. The empty query returns everything.
    pub fn search(&self, query: &str) -> Vec<CafeRecord> {
        let hits = filter_by_name(&self.records, query);
        debug!(
            "event=cafe_search module=catalog status=ok query_len={} hits={}",
            query.chars().count(),
            hits.len()
        );
        hits
    }

    /// Uniform random pick from the canonical sequence.
    pub fn pick_random(&mut self) -> CatalogResult<CafeRecord> {
        let len = self.records.len();
        let index = match len {
            0 => return Err(CatalogError::EmptyCatalog),
            1 => 0,
            _ => self.random.next_index(len) % len,
        };
        Ok(self.records[index].clone())
    }

    fn index_of(&self, id: CafeId) -> CatalogResult<usize> {
        self.records
            .iter()
            .position(|record| record.id == id)
            .ok_or(CatalogError::NotFound(id))
    }

    fn persist(&mut self, stage: impl FnOnce(&mut R) -> RepoResult<()>) -> CatalogResult<()> {
        let result = stage(&mut self.repo).and_then(|()| self.repo.flush());
        if let Err(err) = &result {
            warn!("event=catalog_persist module=catalog status=error error={err}");
        }
        result.map_err(CatalogError::from)
    }

    fn notify_replaced(&mut self) {
        let change = CatalogChange::Replaced {
            records: self.records.clone(),
        };
        self.notify(change);
    }

    fn notify(&mut self, change: CatalogChange) {
        for (_, observer) in &mut self.observers {
            observer.on_change(&change);
        }
    }
}

fn sort_canonical(records: &mut [CafeRecord]) {
    records.sort_by_cached_key(|record| {
        (
            collation_key(&record.name),
            fold_case(&record.name),
            record.name.clone(),
            record.id,
        )
    });
}
