//! Food-mood chat: transcript types, prompt assembly and the text-generation
//! collaborator.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recipe::RecipeRecord;

pub const GREETING: &str =
  "Hello there! What kind of food are you in the mood for today? Tell me about your mood!";

const EMPTY_COLLECTION: &str = "No recipes available in your collection yet.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role:    Role,
  pub content: String,
}

impl ChatMessage {
  pub fn user(content: impl Into<String>) -> Self {
    Self {
      role:    Role::User,
      content: content.into(),
    }
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self {
      role:    Role::Assistant,
      content: content.into(),
    }
  }
}

// ─── Collaborator ────────────────────────────────────────────────────────────

/// Failure of the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
  /// The service answered with a non-success status.
  #[error("Error from AI: {code} - {body}")]
  Status { code: u16, body: String },

  /// The service answered 200 but without generated text where expected.
  #[error("unexpected response shape: {0}")]
  UnexpectedShape(String),

  /// The request never produced a response.
  #[error("{0}")]
  Transport(String),
}

/// An opaque prompt-to-text transform. No retries are attempted by callers.
pub trait TextGenerator {
  fn generate(
    &self,
    prompt: String,
  ) -> impl Future<Output = Result<String, UpstreamError>> + Send + '_;
}

// ─── Prompt ──────────────────────────────────────────────────────────────────

/// One `- Title (Category)` line per record, in store order.
pub fn recipe_listing(records: &[RecipeRecord]) -> String {
  if records.is_empty() {
    return EMPTY_COLLECTION.to_owned();
  }
  records
    .iter()
    .map(|r| format!("- {} ({})", r.title, r.category))
    .collect::<Vec<_>>()
    .join("\n")
}

/// The full prompt sent for one user message.
pub fn build_prompt(message: &str, listing: &str) -> String {
  format!(
    "The user's current message is: '{message}'.\n\
     Suggest a recipe from the list of available recipes below that suits the \
     user's mood or request. If nothing in the list fits, suggest a general \
     food or cuisine that matches the mood, but prefer the list.\n\
     \n\
     Available recipes:\n\
     {listing}\n\
     \n\
     Response rules:\n\
     - If the message is only a greeting (hello, hi, hey, good morning), greet \
     the user back and ask what they are in the mood for.\n\
     - Otherwise suggest one recipe from the list, if applicable, with a short \
     reason.\n\
     - Keep it to two or three sentences.\n\
     - Ask no follow-up questions except the mood question after a greeting.\n\
     - When suggesting a listed recipe, name it and say why it fits.\n"
  )
}

/// Assistant message appended to the transcript when generation fails.
pub fn apology(error: &UpstreamError) -> String {
  match error {
    UpstreamError::Status { .. } => error.to_string(),
    UpstreamError::UnexpectedShape(_) => {
      "Sorry, I couldn't generate a food suggestion right now. Unexpected response from the assistant."
        .to_owned()
    }
    UpstreamError::Transport(e) => format!("An error occurred: {e}. Please try again."),
  }
}
