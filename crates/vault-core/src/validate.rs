//! Corpus-type-aware validation of a submission draft.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::recipe::{CorpusType, RecipeRecord, Upload};

/// The submission form as entered. Nothing here is trimmed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRecord {
  pub full_name:   String,
  pub email:       String,
  pub category:    String,
  pub title:       String,
  pub description: String,
  pub corpus_type: CorpusType,
  pub ingredients: String,
  pub steps:       String,
  pub image:       Option<Upload>,
  pub audio:       Option<Upload>,
  pub video:       Option<Upload>,
}

impl Default for DraftRecord {
  fn default() -> Self {
    Self {
      full_name:   String::new(),
      email:       String::new(),
      category:    String::new(),
      title:       String::new(),
      description: String::new(),
      corpus_type: CorpusType::Text,
      ingredients: String::new(),
      steps:       String::new(),
      image:       None,
      audio:       None,
      video:       None,
    }
  }
}

/// Values the draft does not carry itself.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionContext<'a> {
  pub username:     &'a str,
  /// Current acquisition value, or the sentinel.
  pub geolocation:  &'a str,
  pub submitted_at: NaiveDateTime,
}

/// One violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("Please fill in all general recipe details (missing: {}).", .0.join(", "))]
  MissingGeneralFields(Vec<&'static str>),

  #[error("For 'Text-based' corpus, {} required.", .0.join(" and "))]
  MissingTextInstructions(Vec<&'static str>),

  #[error("For 'Audio-based' corpus, an Audio file is required.")]
  MissingAudio,

  #[error("For 'Video-based' corpus, a Video file is required.")]
  MissingVideo,
}

/// A record ready to append, plus the blobs it references.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRecord {
  pub record:  RecipeRecord,
  pub uploads: Vec<Upload>,
}

fn blank(s: &str) -> bool { s.trim().is_empty() }

fn present(upload: &Option<Upload>) -> Option<&Upload> {
  upload.as_ref().filter(|u| !blank(&u.name))
}

/// Check every rule and build the record.
///
/// All rules are evaluated so the caller can report every problem at once.
/// Uploads for a medium other than the declared corpus type are dropped.
pub fn validate(
  draft: DraftRecord,
  ctx: &SubmissionContext<'_>,
) -> Result<ValidRecord, Vec<ValidationError>> {
  let mut errors = Vec::new();

  let missing: Vec<&'static str> = [
    ("Full Name", &draft.full_name),
    ("Email", &draft.email),
    ("Category", &draft.category),
    ("Title", &draft.title),
    ("Description", &draft.description),
  ]
  .into_iter()
  .filter(|(_, value)| blank(value))
  .map(|(label, _)| label)
  .collect();
  if !missing.is_empty() {
    errors.push(ValidationError::MissingGeneralFields(missing));
  }

  let audio = present(&draft.audio).filter(|_| draft.corpus_type == CorpusType::Audio);
  let video = present(&draft.video).filter(|_| draft.corpus_type == CorpusType::Video);

  match draft.corpus_type {
    CorpusType::Text => {
      let missing: Vec<&'static str> = [
        ("Ingredients", &draft.ingredients),
        ("Preparation Steps", &draft.steps),
      ]
      .into_iter()
      .filter(|(_, value)| blank(value))
      .map(|(label, _)| label)
      .collect();
      if !missing.is_empty() {
        errors.push(ValidationError::MissingTextInstructions(missing));
      }
    }
    CorpusType::Audio if audio.is_none() => errors.push(ValidationError::MissingAudio),
    CorpusType::Video if video.is_none() => errors.push(ValidationError::MissingVideo),
    _ => {}
  }

  if !errors.is_empty() {
    return Err(errors);
  }

  let image = present(&draft.image).cloned();
  let audio = audio.cloned();
  let video = video.cloned();

  let record = RecipeRecord {
    submitted_at: ctx.submitted_at.into(),
    username:     ctx.username.to_owned(),
    full_name:    draft.full_name.trim().to_owned(),
    email:        draft.email.trim().to_owned(),
    geolocation:  ctx.geolocation.to_owned(),
    category:     draft.category.trim().to_owned(),
    title:        draft.title.trim().to_owned(),
    description:  draft.description.trim().to_owned(),
    ingredients:  draft.ingredients.trim().to_owned(),
    steps:        draft.steps.trim().to_owned(),
    image_ref:    image.as_ref().map(|u| u.name.clone()),
    audio_ref:    audio.as_ref().map(|u| u.name.clone()),
    video_ref:    video.as_ref().map(|u| u.name.clone()),
    corpus_type:  Some(draft.corpus_type),
    corpus_cell:  None,
  };

  let uploads = [image, audio, video].into_iter().flatten().collect();

  Ok(ValidRecord { record, uploads })
}
