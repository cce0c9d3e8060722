//! Conversion between CSV rows and [`RecipeRecord`]s.
//!
//! Optional blob references are stored as empty cells. The corpus type is
//! stored as its literal (`Text-based`, …) or left empty for legacy rows.
//! Cells that do not decode are kept verbatim so a rewrite never loses them.

use std::path::Path;

use csv::StringRecord;
use tracing::warn;
use vault_core::recipe::{CorpusType, RecipeRecord, Timestamp};

use crate::schema::{self, COLUMNS, Layout};

fn optional(cell: &str) -> Option<String> {
  (!cell.is_empty()).then(|| cell.to_owned())
}

/// Decode one data row. `line` is the 1-based line number for messages.
pub fn decode_row(path: &Path, layout: &Layout, row: &StringRecord, line: u64) -> RecipeRecord {
  let cell = |column: usize| layout.cell(row, column);

  let submitted_at = Timestamp::from_cell(cell(schema::TIMESTAMP));
  if let Timestamp::Raw(raw) = &submitted_at {
    warn!(path = %path.display(), line, value = %raw, "unparsed timestamp kept as is");
  }

  let corpus = cell(schema::CORPUS_TYPE);
  let corpus_type = CorpusType::from_cell(corpus).unwrap_or_else(|e| {
    warn!(
      path = %path.display(),
      line,
      column = COLUMNS[schema::CORPUS_TYPE],
      error = %e,
      "unknown corpus type kept as is",
    );
    None
  });
  let corpus_cell = corpus_type.is_none().then(|| optional(corpus)).flatten();

  let record = RecipeRecord {
    submitted_at,
    username: cell(schema::USERNAME).to_owned(),
    full_name: cell(schema::FULL_NAME).to_owned(),
    email: cell(schema::EMAIL).to_owned(),
    geolocation: cell(schema::GEOLOCATION).to_owned(),
    category: cell(schema::CATEGORY).to_owned(),
    title: cell(schema::TITLE).to_owned(),
    description: cell(schema::DESCRIPTION).to_owned(),
    ingredients: cell(schema::INGREDIENTS).to_owned(),
    steps: cell(schema::STEPS).to_owned(),
    image_ref: optional(cell(schema::IMAGE_FILE)),
    audio_ref: optional(cell(schema::AUDIO_FILE)),
    video_ref: optional(cell(schema::VIDEO_FILE)),
    corpus_type,
    corpus_cell,
  };

  record.normalized()
}

/// Encode a record in canonical column order.
pub fn encode_row(record: &RecipeRecord) -> [String; COLUMNS.len()] {
  [
    record.submitted_at.to_string(),
    record.username.clone(),
    record.full_name.clone(),
    record.email.clone(),
    record.geolocation.clone(),
    record.category.clone(),
    record.title.trim().to_owned(),
    record.description.clone(),
    record.ingredients.clone(),
    record.steps.clone(),
    record.image_ref.clone().unwrap_or_default(),
    record.audio_ref.clone().unwrap_or_default(),
    record.video_ref.clone().unwrap_or_default(),
    match (record.corpus_type, &record.corpus_cell) {
      (Some(c), _) => c.as_str().to_owned(),
      (None, cell) => cell.clone().unwrap_or_default(),
    },
  ]
}
