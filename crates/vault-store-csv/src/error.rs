//! Error type for `vault-store-csv`.
//!
//! Every variant carries the path it concerns so the message can be shown to
//! the user as is.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("i/o error on {}: {source}", .path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("csv error in {}: {source}", .path.display())]
  Csv {
    path:   PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("{} is missing the {column:?} column", .path.display())]
  MissingColumn {
    path:   PathBuf,
    column: &'static str,
  },

  #[error("refusing blob name {name:?} in {}", .root.display())]
  InvalidBlobName { root: PathBuf, name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
