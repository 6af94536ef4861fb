//! In-memory café repository.
//!
//! Used by tests and throwaway CLI sessions. Shares the staging semantics of
//! the SQLite repository so catalog behavior is identical on both backends.

use crate::model::cafe::{CafeId, CafeRecord};
use crate::repo::cafe_repo::{CafeRepository, PendingWrite, RepoError, RepoResult};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MemoryCafeRepository {
    committed: HashMap<CafeId, CafeRecord>,
    pending: Vec<PendingWrite>,
    fail_next_flush: bool,
    flush_count: usize,
}

impl MemoryCafeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository with already-persisted records.
    pub fn with_records(records: impl IntoIterator<Item = CafeRecord>) -> Self {
        Self {
            committed: records
                .into_iter()
                .map(|record| (record.id, record))
                .collect(),
            ..Self::default()
        }
    }

    /// Makes the next `flush` fail and discard its staged writes.
    pub fn fail_next_flush(&mut self) {
        self.fail_next_flush = true;
    }

    /// Number of successful flushes so far.
    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    pub fn get(&self, id: CafeId) -> Option<&CafeRecord> {
        self.committed.get(&id)
    }

    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }
}

impl CafeRepository for MemoryCafeRepository {
    fn load_all(&self) -> RepoResult<Vec<CafeRecord>> {
        Ok(self.committed.values().cloned().collect())
    }

    fn upsert(&mut self, record: &CafeRecord) -> RepoResult<()> {
        record.validate()?;
        self.pending.push(PendingWrite::Upsert(record.clone()));
        Ok(())
    }

    fn delete(&mut self, id: CafeId) -> RepoResult<()> {
        self.pending.push(PendingWrite::Delete(id));
        Ok(())
    }

    fn flush(&mut self) -> RepoResult<()> {
        let pending = std::mem::take(&mut self.pending);
        if std::mem::take(&mut self.fail_next_flush) {
            return Err(RepoError::Backend("injected flush failure".to_string()));
        }

        // Apply to a copy so a missing delete target leaves committed state intact.
        let mut next = self.committed.clone();
        for write in pending {
            match write {
                PendingWrite::Upsert(record) => {
                    next.insert(record.id, record);
                }
                PendingWrite::Delete(id) => {
                    if next.remove(&id).is_none() {
                        return Err(RepoError::NotFound(id));
                    }
                }
            }
        }
        self.committed = next;
        self.flush_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryCafeRepository;
    use crate::model::cafe::{CafeRecord, NewCafe};
    use crate::repo::cafe_repo::{CafeRepository, RepoError};

    #[test]
    fn staged_writes_are_invisible_until_flush() {
        let mut repo = MemoryCafeRepository::new();
        let record = CafeRecord::from_new(NewCafe::named("Haigh's Chocolate")).unwrap();

        repo.upsert(&record).unwrap();
        assert!(repo.load_all().unwrap().is_empty());

        repo.flush().unwrap();
        assert_eq!(repo.load_all().unwrap(), vec![record]);
    }

    #[test]
    fn failed_delete_leaves_committed_state_intact() {
        let kept = CafeRecord::from_new(NewCafe::named("Cafe Loisl")).unwrap();
        let missing = CafeRecord::from_new(NewCafe::named("Ghost")).unwrap();
        let mut repo = MemoryCafeRepository::with_records([kept.clone()]);

        repo.upsert(&CafeRecord::from_new(NewCafe::named("New")).unwrap())
            .unwrap();
        repo.delete(missing.id).unwrap();
        let err = repo.flush().unwrap_err();

        assert!(matches!(err, RepoError::NotFound(id) if id == missing.id));
        assert_eq!(repo.load_all().unwrap(), vec![kept]);
    }

    #[test]
    fn injected_failure_discards_staged_writes() {
        let mut repo = MemoryCafeRepository::new();
        let record = CafeRecord::from_new(NewCafe::named("Upstate")).unwrap();

        repo.upsert(&record).unwrap();
        repo.fail_next_flush();
        assert!(matches!(repo.flush(), Err(RepoError::Backend(_))));

        repo.flush().unwrap();
        assert!(repo.is_empty());
        assert_eq!(repo.flush_count(), 1);
    }
}
