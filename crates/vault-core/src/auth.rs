//! Static credential table.
//!
//! Passwords are compared as unsalted SHA-256 hex digests. The workflow only
//! sees the boolean outcome through [`CredentialCheck`].

use std::collections::HashMap;

use sha2::{Digest, Sha256};

pub trait CredentialCheck {
  fn verify(&self, username: &str, password: &str) -> bool;
}

/// Hex-encoded SHA-256 of `password`, the form stored in the table.
pub fn hash_password(password: &str) -> String {
  hex::encode(Sha256::digest(password.as_bytes()))
}

/// Username → password digest.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
  digests: HashMap<String, String>,
}

impl StaticCredentials {
  pub fn from_digests<I, K, V>(entries: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      digests: entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into().to_ascii_lowercase()))
        .collect(),
    }
  }

  pub fn len(&self) -> usize { self.digests.len() }

  pub fn is_empty(&self) -> bool { self.digests.is_empty() }
}

impl CredentialCheck for StaticCredentials {
  fn verify(&self, username: &str, password: &str) -> bool {
    self
      .digests
      .get(username)
      .is_some_and(|digest| *digest == hash_password(password))
  }
}
