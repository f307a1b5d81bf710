//! Trade records and their uniqueness key.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One row of the export table: a destination country with the volume and
/// value shipped to it.
///
/// Records are built once, at the extraction boundary, and passed through the
/// pipeline unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Record {
    pub country: String,
    pub quantity_kg: i64,
    pub value_usd: i64,
}

/// Natural key that decides whether two records are the same logical entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub country: String,
    pub quantity_kg: i64,
    pub value_usd: i64,
}

impl Record {
    pub fn new(country: impl Into<String>, quantity_kg: i64, value_usd: i64) -> Self {
        Self { country: country.into(), quantity_kg, value_usd }
    }

    /// Derive the uniqueness key `(country, quantity_kg, value_usd)`.
    pub fn key(&self) -> RecordKey {
        RecordKey { country: self.country.clone(), quantity_kg: self.quantity_kg, value_usd: self.value_usd }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {} kg, {} USD)", self.country, self.quantity_kg, self.value_usd)
    }
}

/// A record as held by the persistent store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub record: Record,
    /// JSON document written when the key was first inserted.
    pub document: String,
    /// RFC 3339 timestamp, set on insert only.
    pub inserted_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_fields_share_a_key() {
        let a = Record::new("Alemanha", 1_200, 3_400);
        let b = Record::new("Alemanha", 1_200, 3_400);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_any_field_changes_the_key() {
        let base = Record::new("Alemanha", 1_200, 3_400);
        assert_ne!(base.key(), Record::new("Angola", 1_200, 3_400).key());
        assert_ne!(base.key(), Record::new("Alemanha", 1_201, 3_400).key());
        assert_ne!(base.key(), Record::new("Alemanha", 1_200, 3_401).key());
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_value(Record::new("Japão", 10, 25)).unwrap();
        assert_eq!(json, serde_json::json!({ "country": "Japão", "quantity_kg": 10, "value_usd": 25 }));
    }
}
