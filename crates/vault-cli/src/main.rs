//! `vault`: interactive shell for the Recipe Vault.
//!
//! Reads `vault.toml` (or the path given with `--config`), opens the CSV
//! record store and the upload directory, and runs one workflow tick per
//! input line.
//!
//! # Password hash generation
//!
//! To generate the digest for a `[credentials]` entry in vault.toml:
//!
//! ```
//! cargo run -p vault-cli --bin vault -- --hash-password
//! ```

mod app;
mod client;
mod sensor;
mod settings;
mod ui;

use std::{io::Write as _, path::PathBuf, time::Duration};

use anyhow::Context as _;
use app::{App, Step};
use clap::Parser;
use client::GenerativeClient;
use sensor::IpLocationSensor;
use settings::VaultConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vault_core::{
  auth::{StaticCredentials, hash_password},
  workflow::{Tick, Workflow},
};
use vault_store_csv::{CsvStore, DirBlobSink};

#[derive(Parser)]
#[command(author, version, about = "Recipe Vault shell")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "vault.toml", env = "VAULT_CONFIG")]
  config: PathBuf,

  /// Print the SHA-256 digest for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr; stdout belongs to the shell.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    println!("{}", hash_password(&password));
    return Ok(());
  }

  let cfg = VaultConfig::load(&cli.config)?;

  let store = CsvStore::open(&cfg.store_path)
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  let blobs = DirBlobSink::open(&cfg.upload_dir)
    .with_context(|| format!("failed to open upload directory {:?}", cfg.upload_dir))?;

  let credentials = StaticCredentials::from_digests(cfg.credentials.clone());
  if credentials.is_empty() {
    tracing::warn!("no credentials configured; nobody will be able to log in");
  }

  let generator = GenerativeClient::new(cfg.generator.clone())?;
  if cfg.generator.api_key.is_empty() {
    tracing::warn!("generator.api_key is empty; the chatbot will report errors");
  }
  let lookup_client = reqwest::Client::builder()
    .timeout(Duration::from_secs(10))
    .build()
    .context("failed to build HTTP client")?;
  let sensor = IpLocationSensor::new(lookup_client, cfg.sensor.url.clone());

  tracing::info!(
    store = %store.path().display(),
    uploads = %blobs.root().display(),
    users = credentials.len(),
    "vault ready"
  );

  let mut app = App::new(Workflow::new(store, blobs, credentials, sensor, generator));
  run_shell(&mut app).await
}

// ─── Shell loop ──────────────────────────────────────────────────────────────

async fn run_shell<S, B, C, L, G>(app: &mut App<S, B, C, L, G>) -> anyhow::Result<()>
where
  S: vault_core::store::RecipeStore,
  B: vault_core::store::BlobSink,
  C: vault_core::auth::CredentialCheck,
  L: vault_core::geo::LocationSensor,
  G: vault_core::chat::TextGenerator,
{
  println!("{}", app.tick(Tick::idle()).await);
  println!("Type 'help' for commands.");

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  loop {
    print!("> ");
    std::io::stdout().flush().ok();

    let Some(line) = lines.next_line().await.context("reading stdin")? else {
      break;
    };
    match app.handle_line(&line).await {
      Step::Print(out) => println!("{out}\n"),
      Step::Quit => break,
    }
  }

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
