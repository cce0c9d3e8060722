//! [`CsvStore`]: the CSV file implementation of [`RecipeStore`].

use std::{
  fs,
  io::{self, Write as _},
  path::{Path, PathBuf},
};

use csv::{ReaderBuilder, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use vault_core::{recipe::RecipeRecord, store::RecipeStore};

use crate::{
  Error, Result,
  encode::{decode_row, encode_row},
  schema::{COLUMNS, Layout},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A recipe table backed by a single CSV file.
///
/// Holds only the path; every operation goes back to disk.
#[derive(Debug, Clone)]
pub struct CsvStore {
  path: PathBuf,
}

/// A decoded file together with the layout it was read with.
struct Table {
  layout:  Layout,
  records: Vec<RecipeRecord>,
}

impl CsvStore {
  /// Use the table at `path` without touching the filesystem.
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  /// Open (or create) the table at `path`.
  ///
  /// A missing file is created with the canonical header. A file with an
  /// older header is rewritten once in the canonical layout.
  pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
    let store = Self::new(path);

    if let Some(parent) = store.parent() {
      fs::create_dir_all(parent).map_err(|source| Error::Io {
        path: parent.to_path_buf(),
        source,
      })?;
    }

    match store.read_table()? {
      None => {
        info!(path = %store.path.display(), "creating recipe table");
        store.write_table(&[])?;
      }
      Some(table) if !table.layout.is_canonical() => {
        info!(
          path = %store.path.display(),
          added = ?table.layout.missing_columns(),
          dropped = ?table.layout.extra_columns(),
          rows = table.records.len(),
          "migrating recipe table header",
        );
        store.write_table(&table.records)?;
      }
      Some(table) => {
        debug!(path = %store.path.display(), rows = table.records.len(), "recipe table opened");
      }
    }

    Ok(store)
  }

  pub fn path(&self) -> &Path { &self.path }

  fn parent(&self) -> Option<&Path> {
    self.path.parent().filter(|p| !p.as_os_str().is_empty())
  }

  fn io_err(&self, source: io::Error) -> Error {
    Error::Io {
      path: self.path.clone(),
      source,
    }
  }

  fn csv_err(&self, source: csv::Error) -> Error {
    Error::Csv {
      path: self.path.clone(),
      source,
    }
  }

  /// Read and migrate the whole file. `None` if the file does not exist.
  fn read_table(&self) -> Result<Option<Table>> {
    let file = match fs::File::open(&self.path) {
      Ok(f) => f,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(self.io_err(e)),
    };

    let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);

    let header = reader.headers().map_err(|e| self.csv_err(e))?.clone();
    if header.is_empty() {
      // Zero-byte file: treat as a fresh table.
      return Ok(Some(Table {
        layout:  Layout::canonical(),
        records: Vec::new(),
      }));
    }
    let layout = Layout::from_header(&self.path, &header)?;

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
      let row = row.map_err(|e| self.csv_err(e))?;
      // Line 1 is the header.
      let line = row.position().map_or(i as u64 + 2, |p| p.line());
      records.push(decode_row(&self.path, &layout, &row, line));
    }

    Ok(Some(Table { layout, records }))
  }

  /// Replace the file with `records` in the canonical layout.
  ///
  /// Written to a temporary file in the same directory and renamed over the
  /// target, so a failed write leaves the old table intact.
  fn write_table(&self, records: &[RecipeRecord]) -> Result<()> {
    let dir = self.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|source| Error::Io {
      path: dir.to_path_buf(),
      source,
    })?;

    {
      let mut writer = WriterBuilder::new().from_writer(&mut tmp);
      writer.write_record(COLUMNS).map_err(|e| self.csv_err(e))?;
      for record in records {
        writer
          .write_record(encode_row(record))
          .map_err(|e| self.csv_err(e))?;
      }
      writer.flush().map_err(|e| self.io_err(e))?;
    }
    tmp.flush().map_err(|e| self.io_err(e))?;

    // The replacement keeps the permissions of the table it replaces.
    match fs::metadata(&self.path) {
      Ok(meta) => tmp
        .as_file()
        .set_permissions(meta.permissions())
        .map_err(|e| self.io_err(e))?,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => return Err(self.io_err(e)),
    }
    tmp.as_file().sync_all().map_err(|e| self.io_err(e))?;

    tmp
      .persist(&self.path)
      .map_err(|e| self.io_err(e.error))?;
    Ok(())
  }
}

// ─── RecipeStore impl ────────────────────────────────────────────────────────

impl RecipeStore for CsvStore {
  type Error = Error;

  fn load(&self) -> Result<Vec<RecipeRecord>> {
    match self.read_table()? {
      Some(table) => Ok(table.records),
      None => {
        info!(path = %self.path.display(), "recipe table missing; creating it");
        self.write_table(&[])?;
        Ok(Vec::new())
      }
    }
  }

  fn append(&self, record: &RecipeRecord) -> Result<()> {
    let mut records = self.load()?;
    records.push(record.clone().normalized());
    self.write_table(&records)?;
    debug!(path = %self.path.display(), rows = records.len(), "recipe table rewritten");
    Ok(())
  }
}
