//! Café domain model.
//!
//! # Responsibility
//! - Define the canonical café record shared by list/detail/search views.
//! - Provide the input shapes used by add and edit flows.
//!
//! # Invariants
//! - `id` is stable and never reused for another café.
//! - `name` is never blank once a record is persisted.
//! - `is_visited` only changes through full negation.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a café record.
pub type CafeId = Uuid;

/// Validation failures for café records and drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CafeValidationError {
    /// The nil UUID is reserved and never identifies a record.
    NilId,
    /// Name is empty or whitespace only.
    BlankName,
}

impl Display for CafeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "cafe id must not be nil"),
            Self::BlankName => write!(f, "cafe name must not be blank"),
        }
    }
}

impl Error for CafeValidationError {}

/// Canonical persisted café record.
///
/// Deserialization runs [`CafeRecord::validate`], so invalid external data is
/// rejected at the boundary instead of leaking into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCafeRecord")]
pub struct CafeRecord {
    pub id: CafeId,
    pub name: String,
    /// Free-form kind of place, e.g. "coffee shop".
    pub category: String,
    pub location: String,
    /// Opaque image bytes. Never decoded or re-encoded by core.
    pub image: Option<Vec<u8>>,
    pub phone: Option<String>,
    pub summary: Option<String>,
    pub is_visited: bool,
    /// Free-form rating label such as "love" or "cool".
    pub rating: Option<String>,
}

impl CafeRecord {
    /// Builds a record from a draft with a freshly generated id.
    ///
    /// `is_visited` starts as `false` and `rating` as unset.
    pub fn from_new(draft: NewCafe) -> Result<Self, CafeValidationError> {
        Self::with_id(Uuid::new_v4(), draft)
    }

    /// Builds a record from a draft with a caller-provided id.
    ///
    /// Used by import paths where the identity already exists.
    pub fn with_id(id: CafeId, draft: NewCafe) -> Result<Self, CafeValidationError> {
        let record = Self {
            id,
            name: draft.name,
            category: draft.category,
            location: draft.location,
            image: draft.image,
            phone: normalize_optional(draft.phone),
            summary: normalize_optional(draft.summary),
            is_visited: false,
            rating: None,
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), CafeValidationError> {
        if self.id.is_nil() {
            return Err(CafeValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(CafeValidationError::BlankName);
        }
        Ok(())
    }

    /// Flips the check-in state and returns the new value.
    pub fn toggle_visited(&mut self) -> bool {
        self.is_visited = !self.is_visited;
        self.is_visited
    }

    /// Replaces the editable descriptive fields.
    ///
    /// `id`, `is_visited` and `rating` are kept.
    pub fn apply_edit(&mut self, edit: CafeEdit) {
        self.name = edit.name;
        self.category = edit.category;
        self.location = edit.location;
        self.image = edit.image;
        self.phone = normalize_optional(edit.phone);
        self.summary = normalize_optional(edit.summary);
    }

    /// Sets the rating label; blank input clears it.
    pub fn set_rating(&mut self, rating: Option<String>) {
        self.rating = normalize_optional(rating);
    }
}

/// Input draft for the add-café flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCafe {
    pub name: String,
    pub category: String,
    pub location: String,
    pub image: Option<Vec<u8>>,
    pub phone: Option<String>,
    pub summary: Option<String>,
}

impl NewCafe {
    /// Creates a draft with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Replacement values for the edit-café flow.
pub type CafeEdit = NewCafe;

#[derive(Deserialize)]
struct RawCafeRecord {
    id: CafeId,
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    image: Option<Vec<u8>>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    is_visited: bool,
    #[serde(default)]
    rating: Option<String>,
}

impl TryFrom<RawCafeRecord> for CafeRecord {
    type Error = CafeValidationError;

    fn try_from(raw: RawCafeRecord) -> Result<Self, Self::Error> {
        let record = Self {
            id: raw.id,
            name: raw.name,
            category: raw.category,
            location: raw.location,
            image: raw.image,
            phone: raw.phone,
            summary: raw.summary,
            is_visited: raw.is_visited,
            rating: raw.rating,
        };
        record.validate()?;
        Ok(record)
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{CafeRecord, CafeValidationError, NewCafe};
    use uuid::Uuid;

    #[test]
    fn from_new_sets_defaults() {
        let record = CafeRecord::from_new(NewCafe::named("Blue Bottle")).unwrap();
        assert!(!record.id.is_nil());
        assert!(!record.is_visited);
        assert_eq!(record.rating, None);
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = CafeRecord::from_new(NewCafe::named("   ")).unwrap_err();
        assert_eq!(err, CafeValidationError::BlankName);
    }

    #[test]
    fn nil_id_is_rejected() {
        let err = CafeRecord::with_id(Uuid::nil(), NewCafe::named("x")).unwrap_err();
        assert_eq!(err, CafeValidationError::NilId);
    }

    #[test]
    fn blank_optional_fields_are_stored_as_none() {
        let draft = NewCafe {
            phone: Some(" ".to_string()),
            summary: Some(String::new()),
            ..NewCafe::named("Cafe Deadend")
        };
        let record = CafeRecord::from_new(draft).unwrap();
        assert_eq!(record.phone, None);
        assert_eq!(record.summary, None);
    }

    #[test]
    fn set_rating_clears_on_blank() {
        let mut record = CafeRecord::from_new(NewCafe::named("Homei")).unwrap();
        record.set_rating(Some("love".to_string()));
        assert_eq!(record.rating.as_deref(), Some("love"));
        record.set_rating(Some("  ".to_string()));
        assert_eq!(record.rating, None);
    }

    #[test]
    fn deserialize_rejects_blank_name() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"id":"{id}","name":"  "}}"#);
        assert!(serde_json::from_str::<CafeRecord>(&json).is_err());
    }

    #[test]
    fn deserialize_fills_defaults() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"id":"{id}","name":"Teakha"}}"#);
        let record: CafeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.id, id);
        assert!(!record.is_visited);
        assert_eq!(record.image, None);
    }
}
