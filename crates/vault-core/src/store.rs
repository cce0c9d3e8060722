//! The `RecipeStore` and `BlobSink` traits.
//!
//! Backends (e.g. `vault-store-csv`) implement the raw load/append pair; the
//! title lookups are provided here so every backend shares the same
//! first-match and trimming semantics.

use std::{collections::BTreeSet, path::PathBuf};

use crate::recipe::{RecipeRecord, normalize_title};

// ─── Record store ────────────────────────────────────────────────────────────

/// Append-only table of recipe records.
///
/// Every call reads the persisted table afresh; implementations keep no cache
/// between calls. A single writer is assumed.
pub trait RecipeStore {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All records in file order, migrated to the current schema and with
  /// titles trimmed.
  fn load(&self) -> Result<Vec<RecipeRecord>, Self::Error>;

  /// Append `record` and persist the full table. On error nothing has been
  /// written.
  fn append(&self, record: &RecipeRecord) -> Result<(), Self::Error>;

  /// The first record, in file order, whose trimmed title equals the trimmed
  /// query. Case-sensitive.
  fn find_by_title(&self, title: &str) -> Result<Option<RecipeRecord>, Self::Error> {
    let wanted = normalize_title(title);
    if wanted.is_empty() {
      return Ok(None);
    }
    Ok(
      self
        .load()?
        .into_iter()
        .find(|r| normalize_title(&r.title) == wanted),
    )
  }

  /// Distinct non-empty titles in ascending order.
  fn list_titles(&self) -> Result<BTreeSet<String>, Self::Error> {
    Ok(distinct_titles(&self.load()?))
  }
}

/// Distinct, trimmed, non-empty titles of `records`.
pub fn distinct_titles(records: &[RecipeRecord]) -> BTreeSet<String> {
  records
    .iter()
    .map(|r| normalize_title(&r.title))
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
    .collect()
}

// ─── Blob sink ───────────────────────────────────────────────────────────────

/// Storage for uploaded media, addressed by original filename.
///
/// Name collisions overwrite; uniqueness is the uploader's concern.
pub trait BlobSink {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Reject a name `put` would refuse, without writing anything.
  fn check(&self, name: &str) -> Result<(), Self::Error> {
    let _ = name;
    Ok(())
  }

  fn put(&self, name: &str, bytes: &[u8]) -> Result<(), Self::Error>;

  /// Where the blob lives, if it exists.
  fn locate(&self, name: &str) -> Option<PathBuf>;
}
