//! Error types for `vault-core`.

use thiserror::Error;

use crate::geo::GeoStatus;

#[derive(Debug, Error)]
pub enum Error {
  /// A selected title has no matching record.
  #[error("recipe with title {0:?} not found")]
  LookupMiss(String),

  #[error("cannot {action} geolocation while {status}")]
  GeoInvalidTransition {
    action: &'static str,
    status: GeoStatus,
  },

  #[error("unknown corpus type: {0:?}")]
  UnknownCorpusType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
