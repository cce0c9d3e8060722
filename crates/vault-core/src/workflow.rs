//! Tick-driven workflow: page state machine and orchestration.
//!
//! Every external interaction is one [`Tick`]. The workflow takes the current
//! [`Session`] by value, applies navigation, advances a pending geolocation
//! request, dispatches the action to the active view and returns the updated
//! session together with a [`Frame`] of render instructions.

use std::path::PathBuf;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::{
  Error,
  auth::CredentialCheck,
  chat::{self, ChatMessage, GREETING, TextGenerator},
  geo::{GeoStatus, LocationSensor},
  recipe::{CorpusType, MediaKind, RecipeRecord, Timestamp, normalize_title},
  report::{self, CollectionReport},
  session::{Session, View},
  store::{BlobSink, RecipeStore, distinct_titles},
  validate::{self, DraftRecord, SubmissionContext},
};

// ─── Input ───────────────────────────────────────────────────────────────────

/// What the user did during this interaction, besides navigating.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Action {
  /// Re-render only (e.g. a scheduled refresh while waiting on the sensor).
  #[default]
  None,
  Login {
    username: String,
    password: String,
  },
  Logout,
  RequestLocation,
  Submit(DraftRecord),
  /// Pick a title on the list view.
  SelectTitle(String),
  ClearSelection,
  SendChat(String),
}

/// One external interaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tick {
  /// The view picked in the navigation selector, if it was touched.
  pub navigation: Option<View>,
  pub action:     Action,
}

impl Tick {
  pub fn idle() -> Self { Self::default() }

  pub fn navigate(view: View) -> Self {
    Self {
      navigation: Some(view),
      action:     Action::None,
    }
  }

  pub fn action(action: Action) -> Self {
    Self {
      navigation: None,
      action,
    }
  }
}

// ─── Output ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
  Success(String),
  Info(String),
  Warning(String),
  Error(String),
}

/// Location widget on the submission form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoPanel {
  pub status:       GeoStatus,
  pub display_text: String,
  pub error:        Option<String>,
}

/// One line of the list view's table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRow {
  /// 1-based row position in the store.
  pub position:     usize,
  pub submitted_at: Timestamp,
  pub username:     String,
  pub title:        String,
  pub category:     String,
  pub geolocation:  String,
  pub corpus_type:  Option<CorpusType>,
}

impl RecipeRow {
  fn new(position: usize, r: &RecipeRecord) -> Self {
    Self {
      position,
      submitted_at: r.submitted_at.clone(),
      username: r.username.clone(),
      title: r.title.clone(),
      category: r.category.clone(),
      geolocation: r.geolocation.clone(),
      corpus_type: r.corpus_type,
    }
  }
}

/// A blob the detail view can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
  pub kind: MediaKind,
  pub name: String,
  pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailPanel {
  pub record:                 RecipeRecord,
  pub media:                  Option<Media>,
  /// Ingredients and steps are secondary for audio and video records.
  pub instructions_collapsed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
  Login,
  Submit(GeoPanel),
  ListAll {
    rows:     Vec<RecipeRow>,
    titles:   Vec<String>,
    selected: Option<String>,
  },
  Detail(DetailPanel),
  Chat(Vec<ChatMessage>),
  /// `None` when the store could not be read.
  Report(Option<CollectionReport>),
}

/// Render instructions for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
  pub body:        Body,
  pub notices:     Vec<Notice>,
  /// The submission form should discard its draft.
  pub clear_draft: bool,
}

impl Frame {
  fn login(notices: Vec<Notice>) -> Self {
    Self {
      body: Body::Login,
      notices,
      clear_draft: false,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
  pub session: Session,
  pub frame:   Frame,
}

// ─── Workflow ────────────────────────────────────────────────────────────────

/// The collaborators a tick may touch.
pub struct Workflow<S, B, C, L, G> {
  pub store:       S,
  pub blobs:       B,
  pub credentials: C,
  pub sensor:      L,
  pub generator:   G,
}

impl<S, B, C, L, G> Workflow<S, B, C, L, G>
where
  S: RecipeStore,
  B: BlobSink,
  C: CredentialCheck,
  L: LocationSensor,
  G: TextGenerator,
{
  pub fn new(store: S, blobs: B, credentials: C, sensor: L, generator: G) -> Self {
    Self {
      store,
      blobs,
      credentials,
      sensor,
      generator,
    }
  }

  /// Run one tick to completion.
  pub async fn tick(&mut self, mut session: Session, tick: Tick) -> Outcome {
    if !session.authenticated {
      return self.tick_anonymous(session, tick.action);
    }
    if matches!(tick.action, Action::Logout) {
      info!(username = %session.username, "logout");
      return Outcome {
        session: Session::default(),
        frame:   Frame::login(vec![Notice::Info("You have been logged out.".into())]),
      };
    }

    let mut notices = Vec::new();

    if let Some(target) = tick.navigation {
      navigate(&mut session, target);
    }

    self.advance_geolocation(&mut session);

    let mut clear_draft = false;
    match tick.action {
      Action::None | Action::Logout => {}
      Action::Login { .. } => notices.push(Notice::Info(format!(
        "Already logged in as {}.",
        session.username
      ))),
      Action::RequestLocation => self.request_location(&mut session, &mut notices),
      Action::Submit(draft) => clear_draft = self.submit(&session, draft, &mut notices),
      Action::SelectTitle(title) => self.select_title(&mut session, &title, &mut notices),
      Action::ClearSelection => clear_selection(&mut session),
      Action::SendChat(message) => self.send_chat(&mut session, &message, &mut notices).await,
    }

    let body = self.render(&mut session, &mut notices);
    Outcome {
      session,
      frame: Frame {
        body,
        notices,
        clear_draft,
      },
    }
  }

  fn tick_anonymous(&self, session: Session, action: Action) -> Outcome {
    let Action::Login { username, password } = action else {
      return Outcome {
        session,
        frame: Frame::login(Vec::new()),
      };
    };

    if !self.credentials.verify(&username, &password) {
      warn!(%username, "login rejected");
      return Outcome {
        session,
        frame: Frame::login(vec![Notice::Error("Invalid username or password.".into())]),
      };
    }

    info!(%username, "login");
    let mut session = Session::login(username);
    let mut notices = vec![Notice::Success(format!("Hello, {}!", session.username))];
    let body = self.render(&mut session, &mut notices);
    Outcome {
      session,
      frame: Frame {
        body,
        notices,
        clear_draft: false,
      },
    }
  }

  // ── Geolocation ───────────────────────────────────────────────────────────

  /// Observe the sensor once per tick while a request is outstanding.
  fn advance_geolocation(&mut self, session: &mut Session) {
    if !session.geo.is_pending() {
      return;
    }
    let reading = self.sensor.poll();
    match session.geo.poll(reading) {
      Ok(GeoStatus::Failed) => {
        if let Some(failure) = session.geo.error() {
          warn!(%failure, "geolocation failed");
        }
      }
      Ok(_) => {}
      Err(e) => warn!(error = %e, "geolocation poll rejected"),
    }
  }

  fn request_location(&mut self, session: &mut Session, notices: &mut Vec<Notice>) {
    if session.view != View::Submit {
      notices.push(Notice::Warning(
        "Location can only be refreshed from the submission form.".into(),
      ));
      return;
    }
    match session.geo.request_refresh(&mut self.sensor) {
      Ok(()) => notices.push(Notice::Info(
        "Detecting location... Your browser may ask for permission.".into(),
      )),
      Err(e) => notices.push(Notice::Info(format!("Location request ignored: {e}."))),
    }
  }

  // ── Submission ────────────────────────────────────────────────────────────

  /// Validate, write blobs, then append. Returns whether the draft should be
  /// cleared.
  ///
  /// Every blob name is checked before anything is written, and the record is
  /// only appended once all blobs are stored.
  fn submit(&self, session: &Session, draft: DraftRecord, notices: &mut Vec<Notice>) -> bool {
    if session.view != View::Submit {
      notices.push(Notice::Warning(
        "Recipes can only be submitted from the submission form.".into(),
      ));
      return false;
    }

    let ctx = SubmissionContext {
      username:     &session.username,
      geolocation:  session.geo.value(),
      submitted_at: Local::now().naive_local(),
    };
    let valid = match validate::validate(draft, &ctx) {
      Ok(valid) => valid,
      Err(errors) => {
        debug!(count = errors.len(), "submission rejected");
        notices.extend(errors.into_iter().map(|e| Notice::Error(e.to_string())));
        return false;
      }
    };

    if let Some((upload, e)) = valid
      .uploads
      .iter()
      .find_map(|u| self.blobs.check(&u.name).err().map(|e| (u, e)))
    {
      debug!(error = %e, blob = %upload.name, "blob name rejected");
      notices.push(Notice::Error(format!(
        "Could not store the file {}: {e}",
        upload.name
      )));
      return false;
    }

    for upload in &valid.uploads {
      if let Err(e) = self.blobs.put(&upload.name, &upload.bytes) {
        warn!(error = %e, blob = %upload.name, "blob write failed");
        notices.push(Notice::Error(format!(
          "Could not store the file {}: {e}",
          upload.name
        )));
        return false;
      }
    }

    if let Err(e) = self.store.append(&valid.record) {
      warn!(error = %e, "append failed");
      notices.push(Notice::Error(format!("Could not save recipe: {e}")));
      return false;
    }
    info!(title = %valid.record.title, corpus_type = %valid.record.effective_corpus_type(), "recipe appended");

    notices.push(Notice::Success("Recipe submitted successfully!".into()));
    true
  }

  // ── Browsing ──────────────────────────────────────────────────────────────

  fn select_title(&self, session: &mut Session, title: &str, notices: &mut Vec<Notice>) {
    if !session.view.same_family(View::ListAll) {
      notices.push(Notice::Warning("Open the recipe list to pick a recipe.".into()));
      return;
    }

    let wanted = normalize_title(title);
    if wanted.is_empty() {
      clear_selection(session);
      return;
    }

    let unchanged = session.selected_title.as_deref() == Some(wanted);
    if unchanged && session.selected_record.is_some() {
      session.view = View::RecordDetail;
      return;
    }

    match self.store.find_by_title(wanted) {
      Ok(Some(record)) => {
        debug!(title = %wanted, "record selected");
        session.selected_title = Some(wanted.to_owned());
        session.selected_record = Some(record);
        session.view = View::RecordDetail;
      }
      Ok(None) => {
        let miss = Error::LookupMiss(wanted.to_owned());
        debug!(%miss, "lookup miss");
        notices.push(Notice::Error(format!(
          "{miss}. Please select an existing recipe from the list."
        )));
        session.clear_selection();
        session.view = View::ListAll;
      }
      Err(e) => {
        notices.push(Notice::Error(format!("Could not load recipes: {e}")));
        session.clear_selection();
        session.view = View::ListAll;
      }
    }
  }

  // ── Chat ──────────────────────────────────────────────────────────────────

  async fn send_chat(&self, session: &mut Session, message: &str, notices: &mut Vec<Notice>) {
    if session.view != View::Chat {
      notices.push(Notice::Warning("Open the chatbot to send a message.".into()));
      return;
    }
    let message = message.trim();
    if message.is_empty() {
      return;
    }

    seed_greeting(session);
    session.chat.push(ChatMessage::user(message));

    let listing = match self.store.load() {
      Ok(records) => chat::recipe_listing(&records),
      Err(e) => format!("Error loading recipes: {e}"),
    };
    let prompt = chat::build_prompt(message, &listing);

    let reply = match self.generator.generate(prompt).await {
      Ok(text) => text,
      Err(e) => {
        warn!(error = %e, "text generation failed");
        notices.push(Notice::Error(e.to_string()));
        chat::apology(&e)
      }
    };
    session.chat.push(ChatMessage::assistant(reply));
  }

  // ── Rendering ─────────────────────────────────────────────────────────────

  fn render(&self, session: &mut Session, notices: &mut Vec<Notice>) -> Body {
    match session.view {
      View::Submit => Body::Submit(GeoPanel {
        status:       session.geo.status(),
        display_text: session.geo.display_text().to_owned(),
        error:        session.geo.error().map(|e| e.to_string()),
      }),
      View::ListAll => self.render_list(session, notices),
      View::RecordDetail => match session.selected_record.clone() {
        Some(record) => Body::Detail(self.detail_panel(record, notices)),
        None => {
          notices.push(Notice::Warning(
            "No recipe selected for details. Showing all recipes.".into(),
          ));
          session.view = View::ListAll;
          session.clear_selection();
          self.render_list(session, notices)
        }
      },
      View::Chat => {
        seed_greeting(session);
        Body::Chat(session.chat.clone())
      }
      View::Report => match self.store.load() {
        Ok(records) => Body::Report(Some(report::summarize(&records))),
        Err(e) => {
          notices.push(Notice::Error(format!("Could not load recipes: {e}")));
          Body::Report(None)
        }
      },
    }
  }

  fn render_list(&self, session: &mut Session, notices: &mut Vec<Notice>) -> Body {
    let records = self.store.load().unwrap_or_else(|e| {
      notices.push(Notice::Error(format!("Could not load recipes: {e}")));
      Vec::new()
    });

    let titles: Vec<String> = distinct_titles(&records).into_iter().collect();
    if records.is_empty() {
      notices.push(Notice::Info("No recipes have been submitted yet.".into()));
    } else if titles.is_empty() {
      notices.push(Notice::Info(
        "No recipes with titles available to select for detailed viewing.".into(),
      ));
      session.clear_selection();
    }

    Body::ListAll {
      rows: records
        .iter()
        .enumerate()
        .map(|(i, r)| RecipeRow::new(i + 1, r))
        .collect(),
      titles,
      selected: session.selected_title.clone(),
    }
  }

  fn detail_panel(&self, record: RecipeRecord, notices: &mut Vec<Notice>) -> DetailPanel {
    let media = record.primary_media().and_then(|m| match self.blobs.locate(m.name) {
      Some(path) => Some(Media {
        kind: m.kind,
        name: m.name.to_owned(),
        path,
      }),
      None => {
        notices.push(Notice::Info(format!("{} file not found: {}", m.kind, m.name)));
        None
      }
    });
    let instructions_collapsed = record.effective_corpus_type() != CorpusType::Text;
    DetailPanel {
      record,
      media,
      instructions_collapsed,
    }
  }
}

// ─── Transitions ─────────────────────────────────────────────────────────────

/// Apply the navigation selector. Leaving a view family drops the selection.
fn navigate(session: &mut Session, target: View) {
  if session.view.same_family(target) {
    return;
  }
  debug!(from = ?session.view, to = ?target, "view changed");
  session.view = target;
  session.clear_selection();
}

fn clear_selection(session: &mut Session) {
  session.clear_selection();
  if session.view == View::RecordDetail {
    session.view = View::ListAll;
  }
}

fn seed_greeting(session: &mut Session) {
  if session.chat.is_empty() {
    session.chat.push(ChatMessage::assistant(GREETING));
  }
}
