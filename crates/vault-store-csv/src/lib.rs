//! CSV file backend for the Recipe Vault record store.
//!
//! The whole table is read on every query and rewritten on every append. The
//! rewrite goes through a temporary file in the same directory so readers
//! never observe a half-written table.

mod encode;
mod schema;
mod store;

pub mod blob;
pub mod error;

pub use blob::DirBlobSink;
pub use error::{Error, Result};
pub use schema::COLUMNS;
pub use store::CsvStore;
