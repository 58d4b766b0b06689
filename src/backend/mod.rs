//! Database backends under comparison.
//!
//! A [`Backend`] exposes the benchmarked CRUD operations plus the untimed
//! reset steps (truncate, snapshot, restore) the plan uses to give every
//! iteration the same starting state.

pub mod clickhouse;
pub mod redis;

pub use self::clickhouse::ClickHouseBackend;
pub use self::redis::RedisBackend;

use crate::dataset::{ListEncoding, Recipe};
use crate::error::BackendError;

/// A (named entity, occurrence count) pair.
pub type NerCount = (String, u64);

pub trait Backend {
    /// Short lowercase name, used in logs and metadata.
    fn name(&self) -> &'static str;

    /// Suffix appended to operation labels in the results file.
    fn label_suffix(&self) -> &'static str {
        ""
    }

    /// How this backend expects list fields to be decoded from the dataset.
    fn list_encoding(&self) -> ListEncoding;

    /// Create whatever schema the backend needs. Idempotent.
    fn setup(&mut self) -> Result<(), BackendError>;

    /// Remove every recipe.
    fn truncate(&mut self) -> Result<(), BackendError>;

    /// Insert all `recipes`; returns how many were written.
    fn insert(&mut self, recipes: &[Recipe]) -> Result<usize, BackendError>;

    /// The `limit` most frequent named entities, most frequent first.
    fn select_most_common_ner(&mut self, limit: usize) -> Result<Vec<NerCount>, BackendError>;

    /// Directions of every recipe titled exactly `title`.
    fn select_directions_by_title(&mut self, title: &str) -> Result<Vec<String>, BackendError>;

    /// Delete recipes whose title contains `needle`.
    fn delete_titles_containing(&mut self, needle: &str) -> Result<(), BackendError>;

    /// In recipes listing the entity `from`, rewrite it to `to`.
    fn update_ner(&mut self, from: &str, to: &str) -> Result<(), BackendError>;

    /// Capture the current data so [`Backend::restore`] can bring it back.
    fn snapshot(&mut self) -> Result<(), BackendError>;

    /// Restore the data captured by the last snapshot. `recipes` is the
    /// loaded dataset, for backends that restore by reinserting.
    fn restore(&mut self, recipes: &[Recipe]) -> Result<(), BackendError>;
}
