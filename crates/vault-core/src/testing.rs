//! In-memory collaborators and fixtures shared by the unit tests.

use std::{
  cell::{Cell, RefCell},
  collections::{HashMap, VecDeque},
  io,
  path::PathBuf,
  sync::Mutex,
};

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
  chat::{TextGenerator, UpstreamError},
  geo::{LocationSensor, SensorReading},
  recipe::{CorpusType, GEOLOCATION_SENTINEL, RecipeRecord},
  store::{BlobSink, RecipeStore},
  validate::DraftRecord,
};

pub fn now() -> NaiveDateTime {
  NaiveDate::from_ymd_opt(2024, 5, 1)
    .unwrap()
    .and_hms_opt(12, 0, 0)
    .unwrap()
}

pub fn record(title: &str, corpus_type: Option<CorpusType>) -> RecipeRecord {
  RecipeRecord {
    submitted_at: now().into(),
    username:     "admin".into(),
    full_name:    "Asha Rao".into(),
    email:        "asha@example.com".into(),
    geolocation:  GEOLOCATION_SENTINEL.into(),
    category:     "Drink".into(),
    title:        title.into(),
    description:  "Cold and sweet".into(),
    ingredients:  String::new(),
    steps:        String::new(),
    image_ref:    None,
    audio_ref:    None,
    video_ref:    None,
    corpus_type,
    corpus_cell:  None,
  }
}

pub fn lassi_draft() -> DraftRecord {
  DraftRecord {
    full_name: "Asha Rao".into(),
    email: " asha@example.com ".into(),
    category: "Drink".into(),
    title: "  Mango Lassi  ".into(),
    description: "Cold and sweet".into(),
    corpus_type: CorpusType::Text,
    ingredients: "mango, yogurt".into(),
    steps: "blend".into(),
    ..DraftRecord::default()
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
  pub records:      RefCell<Vec<RecipeRecord>>,
  pub fail_appends: Cell<bool>,
}

impl RecipeStore for MemoryStore {
  type Error = io::Error;

  fn load(&self) -> Result<Vec<RecipeRecord>, io::Error> {
    Ok(
      self
        .records
        .borrow()
        .iter()
        .cloned()
        .map(RecipeRecord::normalized)
        .collect(),
    )
  }

  fn append(&self, record: &RecipeRecord) -> Result<(), io::Error> {
    if self.fail_appends.get() {
      return Err(io::Error::new(
        io::ErrorKind::PermissionDenied,
        "recipes.csv is read-only",
      ));
    }
    self.records.borrow_mut().push(record.clone().normalized());
    Ok(())
  }
}

#[derive(Default)]
pub struct MemoryBlobs {
  pub blobs:     RefCell<HashMap<String, Vec<u8>>>,
  pub fail_puts: Cell<bool>,
}

impl BlobSink for MemoryBlobs {
  type Error = io::Error;

  fn check(&self, name: &str) -> Result<(), io::Error> {
    if name.is_empty() || name.contains(['/', '\\']) {
      return Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("refusing blob name {name:?}"),
      ));
    }
    Ok(())
  }

  fn put(&self, name: &str, bytes: &[u8]) -> Result<(), io::Error> {
    self.check(name)?;
    if self.fail_puts.get() {
      return Err(io::Error::new(io::ErrorKind::StorageFull, "uploads is full"));
    }
    self.blobs.borrow_mut().insert(name.to_owned(), bytes.to_vec());
    Ok(())
  }

  fn locate(&self, name: &str) -> Option<PathBuf> {
    self
      .blobs
      .borrow()
      .contains_key(name)
      .then(|| PathBuf::from("uploads").join(name))
  }
}

// ─── Sensor ──────────────────────────────────────────────────────────────────

/// Replays queued poll results; each `poll` pops one entry.
#[derive(Default)]
pub struct ScriptedSensor {
  pub requests: usize,
  pub replies:  VecDeque<Option<SensorReading>>,
}

impl LocationSensor for ScriptedSensor {
  fn request_once(&mut self) { self.requests += 1; }

  fn poll(&mut self) -> Option<SensorReading> { self.replies.pop_front().flatten() }
}

// ─── Generator ───────────────────────────────────────────────────────────────

pub struct StubGenerator {
  pub reply:   Result<String, UpstreamError>,
  pub prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
  pub fn replying(text: &str) -> Self {
    Self {
      reply:   Ok(text.to_owned()),
      prompts: Mutex::new(Vec::new()),
    }
  }

  pub fn failing(error: UpstreamError) -> Self {
    Self {
      reply:   Err(error),
      prompts: Mutex::new(Vec::new()),
    }
  }
}

impl TextGenerator for StubGenerator {
  async fn generate(&self, prompt: String) -> Result<String, UpstreamError> {
    self.prompts.lock().unwrap().push(prompt);
    self.reply.clone()
  }
}
