//! [`DirBlobSink`]: uploaded media stored as plain files in one directory.

use std::{
  fs,
  path::{Component, Path, PathBuf},
};

use tracing::debug;
use vault_core::store::BlobSink;

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct DirBlobSink {
  root: PathBuf,
}

impl DirBlobSink {
  /// Use `root` as the upload directory, creating it if needed.
  pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
    let root = root.into();
    fs::create_dir_all(&root).map_err(|source| Error::Io {
      path: root.clone(),
      source,
    })?;
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path { &self.root }

  /// Resolve `name` inside the root. Only a single plain path component is
  /// accepted.
  fn resolve(&self, name: &str) -> Result<PathBuf> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
      (Some(Component::Normal(file)), None) if !name.contains(['/', '\\']) => {
        Ok(self.root.join(file))
      }
      _ => Err(Error::InvalidBlobName {
        root: self.root.clone(),
        name: name.to_owned(),
      }),
    }
  }
}

impl BlobSink for DirBlobSink {
  type Error = Error;

  fn check(&self, name: &str) -> Result<()> { self.resolve(name).map(drop) }

  fn put(&self, name: &str, bytes: &[u8]) -> Result<()> {
    let path = self.resolve(name)?;
    fs::write(&path, bytes).map_err(|source| Error::Io {
      path: path.clone(),
      source,
    })?;
    debug!(path = %path.display(), len = bytes.len(), "blob written");
    Ok(())
  }

  fn locate(&self, name: &str) -> Option<PathBuf> {
    self.resolve(name).ok().filter(|p| p.is_file())
  }
}
