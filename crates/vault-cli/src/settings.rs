//! Runtime configuration, layered from `vault.toml` and `VAULT_*` variables.

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::Deserialize;

/// Deserialised from the config file; every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
  pub store_path:  PathBuf,
  pub upload_dir:  PathBuf,
  /// Username → unsalted SHA-256 hex digest of the password.
  pub credentials: BTreeMap<String, String>,
  pub generator:   GeneratorConfig,
  pub sensor:      SensorConfig,
}

impl Default for VaultConfig {
  fn default() -> Self {
    Self {
      store_path:  PathBuf::from("recipes.csv"),
      upload_dir:  PathBuf::from("uploads"),
      credentials: BTreeMap::new(),
      generator:   GeneratorConfig::default(),
      sensor:      SensorConfig::default(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
  pub base_url: String,
  pub model:    String,
  pub api_key:  String,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self {
      base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
      model:    "gemini-2.0-flash".into(),
      api_key:  String::new(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
  /// Returns a JSON object with `lat` and `lon` for the caller's address.
  pub url: String,
}

impl Default for SensorConfig {
  fn default() -> Self {
    Self {
      url: "http://ip-api.com/json".into(),
    }
  }
}

impl VaultConfig {
  /// Read `file` (if it exists) and overlay `VAULT_*` environment variables.
  ///
  /// Nested keys use a double underscore, e.g. `VAULT_GENERATOR__API_KEY`.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(
        config::Environment::with_prefix("VAULT")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise VaultConfig")?;

    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.upload_dir = expand_tilde(&cfg.upload_dir);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
