//! Tabular storage boundary for Konsern.
//!
//! The core depends on storage only through the [`TableStore`] trait: four
//! operations against a generic tabular resource addressed by table name.
//! Two backends are provided:
//!
//! - [`RestStore`] - the live remote rowstore, spoken to over HTTP
//! - [`MemoryStore`] - in-process backend for demo mode, seeding, and tests
//!
//! Rows are untyped JSON maps; decoding into canonical records happens at
//! the reconciliation boundary in `konsern-core`, never here.

pub mod error;
pub mod memory;
pub mod rest;
pub mod tables;

use async_trait::async_trait;
use serde_json::Value;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use rest::RestStore;

/// A raw persisted row, exactly as the storage engine returned it.
pub type Row = serde_json::Map<String, Value>;

/// Equality filter over row columns.
///
/// The remote rowstore only supports conjunctive equality matches, so that
/// is all this models.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    clauses: Vec<(String, Value)>,
}

impl RowFilter {
    /// An empty filter matching every row.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds an equality clause.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((column.into(), value.into()));
        self
    }

    /// Returns true when no clauses are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Iterates the equality clauses.
    pub fn clauses(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.clauses.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Returns true if the row satisfies every clause.
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        self.clauses
            .iter()
            .all(|(column, value)| row.get(column) == Some(value))
    }
}

/// The four storage operations the core depends on.
///
/// Every non-success response is a typed failure; a financial write that
/// fails must surface to the caller, never be swallowed.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Fetches rows from `table`, optionally narrowed by `filter`.
    async fn fetch_rows(&self, table: &str, filter: &RowFilter) -> Result<Vec<Row>, StoreError>;

    /// Inserts rows into `table`, returning them with their assigned ids.
    async fn insert_rows(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError>;

    /// Patches the row with `id` in `table`, returning the updated rows.
    async fn patch_rows(&self, table: &str, id: i64, fields: Row) -> Result<Vec<Row>, StoreError>;

    /// Deletes rows by id from `table`, returning how many were removed.
    async fn delete_rows(&self, table: &str, ids: &[i64]) -> Result<u64, StoreError>;
}
