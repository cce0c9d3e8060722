//! Per-connection session state, passed into and returned from every tick.

use serde::{Deserialize, Serialize};

use crate::{chat::ChatMessage, geo::GeolocationAcquisition, recipe::RecipeRecord};

/// The page the user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
  Submit,
  ListAll,
  RecordDetail,
  Chat,
  Report,
}

impl View {
  pub const ALL: [View; 5] = [
    Self::Submit,
    Self::ListAll,
    Self::RecordDetail,
    Self::Chat,
    Self::Report,
  ];

  /// List and detail share one navigation entry; moving between them is not
  /// a view change.
  pub fn same_family(self, other: View) -> bool {
    self == other || (self.is_browse() && other.is_browse())
  }

  fn is_browse(self) -> bool { matches!(self, Self::ListAll | Self::RecordDetail) }

  pub fn label(self) -> &'static str {
    match self {
      Self::Submit => "Submit a Recipe",
      Self::ListAll => "View Recipes",
      Self::RecordDetail => "Recipe Details",
      Self::Chat => "Food Chatbot",
      Self::Report => "Collection Report",
    }
  }
}

/// Everything the workflow remembers between ticks for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub authenticated:   bool,
  pub username:        String,
  pub view:            View,
  /// Trimmed title the user picked on the list view.
  pub selected_title:  Option<String>,
  /// The record resolved for `selected_title`.
  pub selected_record: Option<RecipeRecord>,
  pub geo:             GeolocationAcquisition,
  pub chat:            Vec<ChatMessage>,
}

impl Default for Session {
  fn default() -> Self {
    Self {
      authenticated:   false,
      username:        String::new(),
      view:            View::Submit,
      selected_title:  None,
      selected_record: None,
      geo:             GeolocationAcquisition::default(),
      chat:            Vec::new(),
    }
  }
}

impl Session {
  /// A fresh authenticated session on the submission page.
  pub fn login(username: impl Into<String>) -> Self {
    Self {
      authenticated: true,
      username: username.into(),
      ..Self::default()
    }
  }

  pub fn clear_selection(&mut self) {
    self.selected_title = None;
    self.selected_record = None;
  }
}
