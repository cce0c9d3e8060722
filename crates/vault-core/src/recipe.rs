//! Recipe records: the rows of the record store.
//!
//! A record is immutable once appended. Its shape is fixed, but which fields
//! carry the instructions depends on the declared [`CorpusType`].

use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Geolocation value stored when no position was detected.
pub const GEOLOCATION_SENTINEL: &str = "Not detected";

/// Format of the `Timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── Corpus type ─────────────────────────────────────────────────────────────

/// The primary instruction medium declared for a record.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CorpusType {
  #[serde(rename = "Text-based")]
  Text,
  #[serde(rename = "Audio-based")]
  Audio,
  #[serde(rename = "Video-based")]
  Video,
}

impl CorpusType {
  pub const ALL: [CorpusType; 3] = [Self::Text, Self::Audio, Self::Video];

  /// The literal stored in the `CorpusType` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Text => "Text-based",
      Self::Audio => "Audio-based",
      Self::Video => "Video-based",
    }
  }

  /// Decode a stored cell. An empty cell is a legacy row and yields `None`;
  /// so does `nan`, which older exports wrote for missing values.
  pub fn from_cell(cell: &str) -> Result<Option<Self>> {
    let cell = cell.trim();
    if cell.is_empty() || cell == "nan" {
      return Ok(None);
    }
    cell.parse().map(Some)
  }
}

impl FromStr for CorpusType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "Text-based" => Ok(Self::Text),
      "Audio-based" => Ok(Self::Audio),
      "Video-based" => Ok(Self::Video),
      other => Err(Error::UnknownCorpusType(other.to_owned())),
    }
  }
}

impl fmt::Display for CorpusType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Timestamp ───────────────────────────────────────────────────────────────

/// The `Timestamp` column.
///
/// Cells in [`TIMESTAMP_FORMAT`] are parsed; anything else is kept verbatim
/// and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Timestamp {
  At(NaiveDateTime),
  Raw(String),
}

impl Timestamp {
  pub fn from_cell(cell: &str) -> Self {
    match NaiveDateTime::parse_from_str(cell, TIMESTAMP_FORMAT) {
      // Only exact round-trips count as parsed.
      Ok(at) if at.format(TIMESTAMP_FORMAT).to_string() == cell => Self::At(at),
      _ => Self::Raw(cell.to_owned()),
    }
  }

  pub fn parsed(&self) -> Option<NaiveDateTime> {
    match self {
      Self::At(at) => Some(*at),
      Self::Raw(_) => None,
    }
  }
}

impl From<NaiveDateTime> for Timestamp {
  fn from(at: NaiveDateTime) -> Self { Self::At(at) }
}

impl From<String> for Timestamp {
  fn from(cell: String) -> Self { Self::from_cell(&cell) }
}

impl From<Timestamp> for String {
  fn from(t: Timestamp) -> Self { t.to_string() }
}

impl fmt::Display for Timestamp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::At(at) => write!(f, "{}", at.format(TIMESTAMP_FORMAT)),
      Self::Raw(cell) => f.write_str(cell),
    }
  }
}

// ─── Media ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
  Image,
  Audio,
  Video,
}

impl fmt::Display for MediaKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Image => "Image",
      Self::Audio => "Audio",
      Self::Video => "Video",
    })
  }
}

/// A reference from a record to a blob in the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef<'a> {
  pub kind: MediaKind,
  pub name: &'a str,
}

/// An uploaded file that has not been written to the blob sink yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Upload {
  /// Original filename; used verbatim as the blob name.
  pub name:  String,
  pub bytes: Vec<u8>,
}

impl Upload {
  pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
    Self {
      name:  name.into(),
      bytes: bytes.into(),
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One submitted recipe. Identity is the row position in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
  pub submitted_at: Timestamp,
  pub username:     String,
  pub full_name:    String,
  pub email:        String,
  /// `"lat, lon"` or [`GEOLOCATION_SENTINEL`].
  pub geolocation:  String,
  pub category:     String,
  /// Always stored trimmed; see [`normalize_title`].
  pub title:        String,
  pub description:  String,
  pub ingredients:  String,
  pub steps:        String,
  pub image_ref:    Option<String>,
  pub audio_ref:    Option<String>,
  pub video_ref:    Option<String>,
  /// `None` for rows written before the column existed.
  pub corpus_type:  Option<CorpusType>,
  /// A stored `CorpusType` cell that named no known type, written back as is.
  #[serde(default)]
  pub corpus_cell:  Option<String>,
}

impl RecipeRecord {
  /// The corpus type used for display; legacy rows count as text.
  pub fn effective_corpus_type(&self) -> CorpusType {
    self.corpus_type.unwrap_or(CorpusType::Text)
  }

  /// Re-apply the title invariant. Idempotent.
  pub fn normalized(mut self) -> Self {
    let trimmed = normalize_title(&self.title);
    if trimmed.len() != self.title.len() {
      self.title = trimmed.to_owned();
    }
    self
  }

  pub fn has_geolocation(&self) -> bool {
    let g = self.geolocation.trim();
    !g.is_empty() && g != GEOLOCATION_SENTINEL
  }

  /// The medium shown first on the detail view.
  ///
  /// Video and audio are only primary for their own corpus type; otherwise the
  /// image, if any, is shown.
  pub fn primary_media(&self) -> Option<MediaRef<'_>> {
    match (self.effective_corpus_type(), &self.video_ref, &self.audio_ref) {
      (CorpusType::Video, Some(name), _) => Some(MediaRef {
        kind: MediaKind::Video,
        name,
      }),
      (CorpusType::Audio, _, Some(name)) => Some(MediaRef {
        kind: MediaKind::Audio,
        name,
      }),
      _ => self.image_ref.as_deref().map(|name| MediaRef {
        kind: MediaKind::Image,
        name,
      }),
    }
  }
}

/// Title normalisation shared by writes, reads and lookups.
pub fn normalize_title(title: &str) -> &str { title.trim() }

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::record;

  #[test]
  fn corpus_type_literals() {
    for ct in CorpusType::ALL {
      assert_eq!(ct.as_str().parse::<CorpusType>().unwrap(), ct);
    }
    assert_eq!(CorpusType::from_cell("").unwrap(), None);
    assert_eq!(CorpusType::from_cell(" Audio-based ").unwrap(), Some(CorpusType::Audio));
    assert_eq!(CorpusType::from_cell("nan").unwrap(), None);
    assert!(matches!(
      CorpusType::from_cell("Smell-based"),
      Err(Error::UnknownCorpusType(_))
    ));
  }

  #[test]
  fn timestamp_keeps_unparsed_cells() {
    let at = Timestamp::from_cell("2024-05-01 12:00:00");
    assert!(at.parsed().is_some());
    assert_eq!(at.to_string(), "2024-05-01 12:00:00");

    for cell in ["2024-05-01T12:00:00", "2024-5-1 12:00:00", "yesterday", ""] {
      let t = Timestamp::from_cell(cell);
      assert_eq!(t, Timestamp::Raw(cell.to_owned()));
      assert_eq!(t.to_string(), cell);
    }
  }

  #[test]
  fn empty_corpus_type_displays_as_text() {
    assert_eq!(record("x", None).effective_corpus_type(), CorpusType::Text);
  }

  #[test]
  fn normalized_trims_title_only() {
    let mut r = record("  Mango Lassi \t", Some(CorpusType::Text));
    r.description = "  keep  ".into();
    let r = r.normalized();
    assert_eq!(r.title, "Mango Lassi");
    assert_eq!(r.description, "  keep  ");
    assert_eq!(r.clone().normalized(), r);
  }

  #[test]
  fn primary_media_follows_corpus_type() {
    let mut r = record("x", Some(CorpusType::Audio));
    r.image_ref = Some("lassi.jpg".into());
    r.video_ref = Some("stray.mp4".into());
    assert_eq!(r.primary_media().unwrap().kind, MediaKind::Image);

    r.audio_ref = Some("lassi.wav".into());
    let media = r.primary_media().unwrap();
    assert_eq!(media.kind, MediaKind::Audio);
    assert_eq!(media.name, "lassi.wav");
  }

  #[test]
  fn sentinel_is_not_a_location() {
    let mut r = record("x", None);
    assert!(!r.has_geolocation());
    r.geolocation = "12.340000, 56.780000".into();
    assert!(r.has_geolocation());
  }
}
