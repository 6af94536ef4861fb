//! Café repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide load-all/upsert/delete/flush over canonical `cafes` storage.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `CafeRecord::validate()` before staging.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `flush` applies every staged write in one transaction and always
//!   clears the staging buffer, whether it commits or not.

use crate::db::DbError;
use crate::model::cafe::{CafeId, CafeRecord, CafeValidationError};
use log::{debug, error};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

const CAFE_SELECT_SQL: &str = "SELECT
    id,
    name,
    category,
    location,
    image,
    phone,
    summary,
    is_visited,
    rating
FROM cafes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for café persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(CafeValidationError),
    Db(DbError),
    NotFound(CafeId),
    InvalidData(String),
    /// Failure reported by a non-SQL backend.
    Backend(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "cafe not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted cafe data: {message}"),
            Self::Backend(message) => write!(f, "storage backend failure: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::Backend(_) => None,
        }
    }
}

impl From<CafeValidationError> for RepoError {
    fn from(value: CafeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract consumed by the catalog.
///
/// `upsert` and `delete` only stage work; nothing is durable until `flush`
/// returns `Ok`.
pub trait CafeRepository {
    /// Loads every persisted café. Order is unspecified.
    fn load_all(&self) -> RepoResult<Vec<CafeRecord>>;
    /// Stages a create-or-replace keyed by `record.id`.
    fn upsert(&mut self, record: &CafeRecord) -> RepoResult<()>;
    /// Stages a hard delete. Missing ids surface as `NotFound` on flush.
    fn delete(&mut self, id: CafeId) -> RepoResult<()>;
    /// Applies staged writes atomically.
    fn flush(&mut self) -> RepoResult<()>;
}

/// A write waiting for the next flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingWrite {
    Upsert(CafeRecord),
    Delete(CafeId),
}

/// SQLite-backed café repository.
pub struct SqliteCafeRepository<'conn> {
    conn: &'conn mut Connection,
    pending: Vec<PendingWrite>,
}

impl<'conn> SqliteCafeRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self {
            conn,
            pending: Vec::new(),
        }
    }

    /// Number of writes staged since the last flush.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl CafeRepository for SqliteCafeRepository<'_> {
    // Unordered; the catalog owns the canonical ordering.
    fn load_all(&self) -> RepoResult<Vec<CafeRecord>> {
        let mut stmt = self.conn.prepare(CAFE_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_cafe_row(row)?);
        }

        Ok(records)
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
        if pending.is_empty() {
            return Ok(());
        }

        let started_at = Instant::now();
        let result = apply_pending(&mut *self.conn, &pending);
        match &result {
            Ok(()) => debug!(
                "event=repo_flush module=repo status=ok writes={} duration_ms={}",
                pending.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=repo_flush module=repo status=error writes={} duration_ms={} error={}",
                pending.len(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

fn apply_pending(conn: &mut Connection, pending: &[PendingWrite]) -> RepoResult<()> {
    let tx = conn.transaction()?;
    for write in pending {
        match write {
            PendingWrite::Upsert(record) => upsert_row(&tx, record)?,
            PendingWrite::Delete(id) => delete_row(&tx, *id)?,
        }
    }
    tx.commit()?;
    Ok(())
}

fn upsert_row(conn: &Connection, record: &CafeRecord) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO cafes (
            id,
            name,
            category,
            location,
            image,
            phone,
            summary,
            is_visited,
            rating
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            category = excluded.category,
            location = excluded.location,
            image = excluded.image,
            phone = excluded.phone,
            summary = excluded.summary,
            is_visited = excluded.is_visited,
            rating = excluded.rating,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![
            record.id.to_string(),
            record.name.as_str(),
            record.category.as_str(),
            record.location.as_str(),
            record.image.as_deref(),
            record.phone.as_deref(),
            record.summary.as_deref(),
            bool_to_int(record.is_visited),
            record.rating.as_deref(),
        ],
    )?;
    Ok(())
}

fn delete_row(conn: &Connection, id: CafeId) -> RepoResult<()> {
    let changed = conn.execute("DELETE FROM cafes WHERE id = ?1;", [id.to_string()])?;
    if changed == 0 {
        return Err(RepoError::NotFound(id));
    }
    Ok(())
}

fn parse_cafe_row(row: &Row<'_>) -> RepoResult<CafeRecord> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in cafes.id"))
    })?;

    let is_visited = match row.get::<_, i64>("is_visited")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_visited value `{other}` in cafes.is_visited"
            )));
        }
    };

    let record = CafeRecord {
        id,
        name: row.get("name")?,
        category: row.get("category")?,
        location: row.get("location")?,
        image: row.get("image")?,
        phone: row.get("phone")?,
        summary: row.get("summary")?,
        is_visited,
        rating: row.get("rating")?,
    };
    record.validate()?;
    Ok(record)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
