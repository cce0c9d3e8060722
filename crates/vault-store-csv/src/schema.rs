//! Table layout and the load-time migration.
//!
//! The header row is the schema version: a file written before the media
//! columns existed simply lacks them. Loading maps each canonical column to
//! its position in the file's header and back-fills the late columns with
//! empty cells. The migration is pure and idempotent; it runs on every load.

use std::path::Path;

use csv::StringRecord;
use tracing::warn;

use crate::{Error, Result};

/// Canonical column order, as written by the store.
pub const COLUMNS: [&str; 14] = [
  "Timestamp",
  "Username",
  "Full Name",
  "Email",
  "Geolocation",
  "Category",
  "Title",
  "Description",
  "Ingredients",
  "Steps",
  "ImageFile",
  "AudioFile",
  "VideoFile",
  "CorpusType",
];

/// Columns added after the first deployment. Absent ones are back-filled.
pub const LATE_COLUMNS: [&str; 4] = ["ImageFile", "AudioFile", "VideoFile", "CorpusType"];

// Canonical positions, used by the row codec.
pub const TIMESTAMP: usize = 0;
pub const USERNAME: usize = 1;
pub const FULL_NAME: usize = 2;
pub const EMAIL: usize = 3;
pub const GEOLOCATION: usize = 4;
pub const CATEGORY: usize = 5;
pub const TITLE: usize = 6;
pub const DESCRIPTION: usize = 7;
pub const INGREDIENTS: usize = 8;
pub const STEPS: usize = 9;
pub const IMAGE_FILE: usize = 10;
pub const AUDIO_FILE: usize = 11;
pub const VIDEO_FILE: usize = 12;
pub const CORPUS_TYPE: usize = 13;

/// Where each canonical column sits in a particular file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
  positions: [Option<usize>; COLUMNS.len()],
  /// Header names not in [`COLUMNS`]; dropped on the next rewrite.
  extra:     Vec<String>,
  canonical: bool,
}

impl Layout {
  /// The layout of a file written by this version of the store.
  pub fn canonical() -> Self {
    Self {
      positions: std::array::from_fn(Some),
      extra:     Vec::new(),
      canonical: true,
    }
  }

  /// Map a header row onto the canonical columns.
  ///
  /// Fails only if one of the original (non-late) columns is absent.
  pub fn from_header(path: &Path, header: &StringRecord) -> Result<Self> {
    let names: Vec<&str> = header.iter().map(str::trim).collect();

    let mut positions = [None; COLUMNS.len()];
    for (slot, column) in positions.iter_mut().zip(COLUMNS) {
      *slot = names.iter().position(|n| *n == column);
      if slot.is_none() && !LATE_COLUMNS.contains(&column) {
        return Err(Error::MissingColumn {
          path: path.to_path_buf(),
          column,
        });
      }
    }

    let extra: Vec<String> = names
      .iter()
      .filter(|n| !COLUMNS.contains(n))
      .map(|n| (*n).to_owned())
      .collect();
    if !extra.is_empty() {
      warn!(path = %path.display(), ?extra, "unknown columns will be dropped on the next write");
    }

    let canonical = names.len() == COLUMNS.len() && names.iter().zip(COLUMNS).all(|(a, b)| *a == b);

    Ok(Self {
      positions,
      extra,
      canonical,
    })
  }

  /// Whether the file already has exactly the canonical header.
  pub fn is_canonical(&self) -> bool { self.canonical }

  /// Late columns this file lacks.
  pub fn missing_columns(&self) -> Vec<&'static str> {
    COLUMNS
      .iter()
      .zip(&self.positions)
      .filter(|(_, p)| p.is_none())
      .map(|(c, _)| *c)
      .collect()
  }

  pub fn extra_columns(&self) -> &[String] { &self.extra }

  /// The cell for canonical column `column`, or `""` when the file lacks the
  /// column or the row is short.
  pub fn cell<'r>(&self, row: &'r StringRecord, column: usize) -> &'r str {
    self.positions[column]
      .and_then(|i| row.get(i))
      .unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const LEGACY: [&str; 10] = [
    "Timestamp",
    "Username",
    "Full Name",
    "Email",
    "Geolocation",
    "Category",
    "Title",
    "Description",
    "Ingredients",
    "Steps",
  ];

  #[test]
  fn canonical_header_round_trips() {
    let layout = Layout::from_header(Path::new("r.csv"), &StringRecord::from(COLUMNS.to_vec())).unwrap();
    assert!(layout.is_canonical());
    assert_eq!(layout, Layout::canonical());
    assert!(layout.missing_columns().is_empty());
  }

  #[test]
  fn legacy_header_backfills_late_columns() {
    let layout = Layout::from_header(Path::new("r.csv"), &StringRecord::from(LEGACY.to_vec())).unwrap();
    assert!(!layout.is_canonical());
    assert_eq!(layout.missing_columns(), LATE_COLUMNS);

    let row = StringRecord::from(vec!["2024-05-01 12:00:00", "admin"]);
    assert_eq!(layout.cell(&row, USERNAME), "admin");
    assert_eq!(layout.cell(&row, TITLE), "");
    assert_eq!(layout.cell(&row, CORPUS_TYPE), "");
  }

  #[test]
  fn reordered_header_is_mapped_by_name() {
    let mut names = COLUMNS.to_vec();
    names.swap(TITLE, CATEGORY);
    let layout = Layout::from_header(Path::new("r.csv"), &StringRecord::from(names.clone())).unwrap();
    assert!(!layout.is_canonical());
    let row = StringRecord::from(names);
    assert_eq!(layout.cell(&row, TITLE), "Title");
  }

  #[test]
  fn missing_original_column_is_an_error() {
    let names: Vec<_> = LEGACY.iter().filter(|c| **c != "Email").copied().collect();
    let err = Layout::from_header(Path::new("r.csv"), &StringRecord::from(names)).unwrap_err();
    assert!(matches!(err, Error::MissingColumn { column: "Email", .. }));
  }

  #[test]
  fn extra_columns_are_reported() {
    let mut names = COLUMNS.to_vec();
    names.push("Rating");
    let layout = Layout::from_header(Path::new("r.csv"), &StringRecord::from(names)).unwrap();
    assert_eq!(layout.extra_columns(), ["Rating".to_owned()]);
    assert!(!layout.is_canonical());
  }
}
