//! Line-oriented shell: one input line becomes one workflow tick.

use std::path::Path;

use anyhow::{Context, Result, bail};
use vault_core::{
  auth::CredentialCheck,
  chat::TextGenerator,
  geo::LocationSensor,
  recipe::{CorpusType, MediaKind, Upload},
  session::{Session, View},
  store::{BlobSink, RecipeStore},
  validate::DraftRecord,
  workflow::{Action, Tick, Workflow},
};

use crate::ui;

// ─── Commands ────────────────────────────────────────────────────────────────

/// A submission form field that `set` can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  FullName,
  Email,
  Category,
  Title,
  Description,
  CorpusType,
  Ingredients,
  Steps,
}

impl Field {
  fn parse(s: &str) -> Result<Self> {
    Ok(match s {
      "name" | "full_name" => Self::FullName,
      "email" => Self::Email,
      "category" => Self::Category,
      "title" => Self::Title,
      "description" => Self::Description,
      "corpus" | "corpus_type" => Self::CorpusType,
      "ingredients" => Self::Ingredients,
      "steps" => Self::Steps,
      other => bail!("unknown field {other:?}"),
    })
  }
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
  Help,
  Quit,
  /// Show the submission draft.
  Form,
  Set(Field, String),
  Attach(MediaKind, String),
  Detach(MediaKind),
  Submit,
  /// Everything else maps directly onto a tick.
  Tick(Tick),
}

fn parse_view(s: &str) -> Result<View> {
  Ok(match s {
    "submit" => View::Submit,
    "list" | "recipes" => View::ListAll,
    "detail" => View::RecordDetail,
    "chat" => View::Chat,
    "report" => View::Report,
    other => bail!("unknown view {other:?} (submit, list, detail, chat, report)"),
  })
}

fn parse_kind(s: &str) -> Result<MediaKind> {
  Ok(match s {
    "image" => MediaKind::Image,
    "audio" => MediaKind::Audio,
    "video" => MediaKind::Video,
    other => bail!("unknown media kind {other:?} (image, audio, video)"),
  })
}

/// `text`, `audio`, `video` or the stored literal.
fn parse_corpus(s: &str) -> Result<CorpusType> {
  match s.to_ascii_lowercase().as_str() {
    "text" => Ok(CorpusType::Text),
    "audio" => Ok(CorpusType::Audio),
    "video" => Ok(CorpusType::Video),
    _ => s.parse().map_err(Into::into),
  }
}

/// Parse one line. Blank input is an idle tick, which also lets a pending
/// location request resolve.
pub fn parse_line(line: &str) -> Result<Command> {
  let line = line.trim();
  let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
  let rest = rest.trim();

  let tick = |action| Ok(Command::Tick(Tick::action(action)));

  match verb {
    "" | "refresh" => tick(Action::None),
    "help" | "?" => Ok(Command::Help),
    "quit" | "exit" => Ok(Command::Quit),
    "form" => Ok(Command::Form),
    "submit" => Ok(Command::Submit),
    "login" => {
      let Some((username, password)) = rest.split_once(char::is_whitespace) else {
        bail!("usage: login <username> <password>");
      };
      tick(Action::Login {
        username: username.to_owned(),
        password: password.trim().to_owned(),
      })
    }
    "logout" => tick(Action::Logout),
    "go" => Ok(Command::Tick(Tick::navigate(parse_view(rest)?))),
    "locate" => tick(Action::RequestLocation),
    "select" => tick(Action::SelectTitle(rest.to_owned())),
    "clear" => tick(Action::ClearSelection),
    "chat" => {
      if rest.is_empty() {
        bail!("usage: chat <message>");
      }
      tick(Action::SendChat(rest.to_owned()))
    }
    "set" => {
      let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
      // `\n` in the value stands for a line break.
      Ok(Command::Set(Field::parse(field)?, value.trim().replace("\\n", "\n")))
    }
    "attach" => {
      let Some((kind, path)) = rest.split_once(char::is_whitespace) else {
        bail!("usage: attach <image|audio|video> <path>");
      };
      Ok(Command::Attach(parse_kind(kind)?, path.trim().to_owned()))
    }
    "detach" => Ok(Command::Detach(parse_kind(rest)?)),
    other => bail!("unknown command {other:?}; try 'help'"),
  }
}

pub const HELP: &str = "\
Commands:
  login <username> <password>   log in
  logout                        log out
  go <view>                     submit | list | detail | chat | report
  set <field> <value>           name, email, category, title, description,
                                corpus (text|audio|video), ingredients, steps
                                (write \\n for a line break)
  attach <kind> <path>          attach an image, audio or video file
  detach <kind>                 remove an attachment
  form                          show the current draft
  submit                        submit the draft
  locate                        detect the current location
  select <title>                show a recipe's details
  clear                         clear the selection
  chat <message>                talk to the food chatbot
  <enter> | refresh             redraw (and pick up a pending location)
  quit                          leave";

// ─── App ─────────────────────────────────────────────────────────────────────

/// What the caller should do after a line was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
  Print(String),
  Quit,
}

/// Shell state: the workflow, the current session and the form draft.
pub struct App<S, B, C, L, G> {
  pub workflow: Workflow<S, B, C, L, G>,
  pub session:  Session,
  pub draft:    DraftRecord,
}

impl<S, B, C, L, G> App<S, B, C, L, G>
where
  S: RecipeStore,
  B: BlobSink,
  C: CredentialCheck,
  L: LocationSensor,
  G: TextGenerator,
{
  pub fn new(workflow: Workflow<S, B, C, L, G>) -> Self {
    Self {
      workflow,
      session: Session::default(),
      draft: DraftRecord::default(),
    }
  }

  /// Handle one input line. Bad input is reported, never fatal.
  pub async fn handle_line(&mut self, line: &str) -> Step {
    match self.try_handle(line).await {
      Ok(step) => step,
      Err(e) => Step::Print(format!("[error] {e:#}")),
    }
  }

  async fn try_handle(&mut self, line: &str) -> Result<Step> {
    let tick = match parse_line(line)? {
      Command::Help => return Ok(Step::Print(HELP.to_owned())),
      Command::Quit => return Ok(Step::Quit),
      Command::Form => return Ok(Step::Print(ui::draft(&self.draft))),
      Command::Set(field, value) => {
        self.set(field, value)?;
        return Ok(Step::Print(ui::draft(&self.draft)));
      }
      Command::Attach(kind, path) => {
        *self.slot(kind) = Some(read_upload(Path::new(&path))?);
        return Ok(Step::Print(ui::draft(&self.draft)));
      }
      Command::Detach(kind) => {
        *self.slot(kind) = None;
        return Ok(Step::Print(ui::draft(&self.draft)));
      }
      Command::Submit => Tick::action(Action::Submit(self.draft.clone())),
      Command::Tick(tick) => tick,
    };
    Ok(Step::Print(self.tick(tick).await))
  }

  /// Run a tick and render its frame.
  pub async fn tick(&mut self, tick: Tick) -> String {
    let session = std::mem::take(&mut self.session);
    let outcome = self.workflow.tick(session, tick).await;
    self.session = outcome.session;
    if outcome.frame.clear_draft || !self.session.authenticated {
      self.draft = DraftRecord::default();
    }
    ui::frame(&self.session, &outcome.frame)
  }

  fn set(&mut self, field: Field, value: String) -> Result<()> {
    let d = &mut self.draft;
    match field {
      Field::FullName => d.full_name = value,
      Field::Email => d.email = value,
      Field::Category => d.category = value,
      Field::Title => d.title = value,
      Field::Description => d.description = value,
      Field::CorpusType => d.corpus_type = parse_corpus(&value)?,
      Field::Ingredients => d.ingredients = value,
      Field::Steps => d.steps = value,
    }
    Ok(())
  }

  fn slot(&mut self, kind: MediaKind) -> &mut Option<Upload> {
    match kind {
      MediaKind::Image => &mut self.draft.image,
      MediaKind::Audio => &mut self.draft.audio,
      MediaKind::Video => &mut self.draft.video,
    }
  }
}

/// Read a file to attach; the blob is named after the file's base name.
fn read_upload(path: &Path) -> Result<Upload> {
  let name = path
    .file_name()
    .and_then(|n| n.to_str())
    .with_context(|| format!("{} has no usable file name", path.display()))?;
  let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
  Ok(Upload::new(name, bytes))
}

#[cfg(test)]
mod tests {
  use vault_core::{
    auth::{StaticCredentials, hash_password},
    chat::UpstreamError,
    geo::SensorReading,
  };
  use vault_store_csv::{CsvStore, DirBlobSink};

  use super::*;

  // ── Parsing ───────────────────────────────────────────────────────────────

  #[test]
  fn parses_ticks() {
    assert!(matches!(
      parse_line("  ").unwrap(),
      Command::Tick(Tick { navigation: None, action: Action::None })
    ));
    assert!(matches!(
      parse_line("go list").unwrap(),
      Command::Tick(Tick { navigation: Some(View::ListAll), .. })
    ));
    assert!(matches!(
      parse_line("login admin  pass word").unwrap(),
      Command::Tick(Tick { action: Action::Login { ref username, ref password }, .. })
        if username == "admin" && password == "pass word"
    ));
    assert!(matches!(
      parse_line("select   Mango Lassi ").unwrap(),
      Command::Tick(Tick { action: Action::SelectTitle(ref t), .. }) if t == "Mango Lassi"
    ));
  }

  #[test]
  fn parses_form_edits() {
    assert_eq!(
      parse_line("set steps blend\\nchill").unwrap(),
      Command::Set(Field::Steps, "blend\nchill".into())
    );
    assert_eq!(
      parse_line("attach audio ~/dal.mp3").unwrap(),
      Command::Attach(MediaKind::Audio, "~/dal.mp3".into())
    );
    assert_eq!(parse_line("detach video").unwrap(), Command::Detach(MediaKind::Video));
  }

  #[test]
  fn rejects_bad_input() {
    for line in ["dance", "go kitchen", "login admin", "set colour red", "attach gif x", "chat"] {
      assert!(parse_line(line).is_err(), "{line}");
    }
  }

  #[test]
  fn corpus_accepts_short_and_stored_names() {
    assert_eq!(parse_corpus("Audio").unwrap(), CorpusType::Audio);
    assert_eq!(parse_corpus("Video-based").unwrap(), CorpusType::Video);
    assert!(parse_corpus("smell").is_err());
  }

  // ── End to end ────────────────────────────────────────────────────────────

  /// Answers on the first poll after a request.
  #[derive(Default)]
  struct FixedSensor {
    requested: bool,
  }

  impl LocationSensor for FixedSensor {
    fn request_once(&mut self) { self.requested = true; }

    fn poll(&mut self) -> Option<SensorReading> {
      std::mem::take(&mut self.requested).then(|| SensorReading::at(12.5, 77.25))
    }
  }

  struct Offline;

  impl TextGenerator for Offline {
    async fn generate(&self, _prompt: String) -> Result<String, UpstreamError> {
      Err(UpstreamError::Transport("offline".into()))
    }
  }

  type TestApp = App<CsvStore, DirBlobSink, StaticCredentials, FixedSensor, Offline>;

  fn app(dir: &Path) -> TestApp {
    App::new(Workflow::new(
      CsvStore::open(dir.join("recipes.csv")).unwrap(),
      DirBlobSink::open(dir.join("uploads")).unwrap(),
      StaticCredentials::from_digests([("admin", hash_password("password123"))]),
      FixedSensor::default(),
      Offline,
    ))
  }

  async fn run(app: &mut TestApp, line: &str) -> String {
    match app.handle_line(line).await {
      Step::Print(out) => out,
      Step::Quit => panic!("unexpected quit on {line:?}"),
    }
  }

  #[tokio::test]
  async fn login_submit_and_browse() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app(dir.path());

    assert!(run(&mut app, "go list").await.contains("login"));
    assert!(run(&mut app, "login admin nope").await.contains("Invalid username or password"));
    assert!(run(&mut app, "login admin password123").await.contains("Hello, admin!"));

    run(&mut app, "locate").await;
    assert!(run(&mut app, "").await.contains("12.500000, 77.250000"));

    for line in [
      "set name Asha Rao",
      "set email asha@example.com",
      "set category Drink",
      "set title   Mango Lassi  ",
      "set description Cold and sweet",
      "set ingredients mango, yogurt",
      "set steps blend",
    ] {
      run(&mut app, line).await;
    }
    let out = run(&mut app, "submit").await;
    assert!(out.contains("Recipe submitted successfully!"), "{out}");
    assert_eq!(app.draft, DraftRecord::default());

    let out = run(&mut app, "go list").await;
    assert!(out.contains("Mango Lassi"), "{out}");
    assert!(out.contains("12.500000, 77.250000"), "{out}");

    let out = run(&mut app, "select  Mango Lassi ").await;
    assert_eq!(app.session.view, View::RecordDetail);
    assert!(out.contains("mango, yogurt"), "{out}");

    let out = run(&mut app, "select Ghost Recipe").await;
    assert!(out.contains("not found"), "{out}");
    assert_eq!(app.session.view, View::ListAll);
    assert_eq!(app.session.selected_title, None);
  }

  #[tokio::test]
  async fn invalid_submission_keeps_draft() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app(dir.path());
    run(&mut app, "login admin password123").await;
    run(&mut app, "set title Dal").await;
    run(&mut app, "set corpus audio").await;

    let out = run(&mut app, "submit").await;
    assert!(out.contains("an Audio file is required"), "{out}");
    assert_eq!(app.draft.title, "Dal");
    assert!(std::fs::read_to_string(dir.path().join("recipes.csv")).unwrap().lines().count() == 1);
  }

  #[tokio::test]
  async fn attached_audio_is_stored_and_shown() {
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("dal.mp3");
    std::fs::write(&clip, b"ID3").unwrap();
    let mut app = app(dir.path());
    run(&mut app, "login admin password123").await;

    for line in [
      "set name Ravi",
      "set email ravi@example.com",
      "set category Main",
      "set title Dal",
      "set description Lentils",
      "set corpus audio",
    ] {
      run(&mut app, line).await;
    }
    run(&mut app, &format!("attach audio {}", clip.display())).await;
    let out = run(&mut app, "submit").await;
    assert!(out.contains("Recipe submitted successfully!"), "{out}");
    assert!(dir.path().join("uploads").join("dal.mp3").is_file());

    run(&mut app, "go list").await;
    let out = run(&mut app, "select Dal").await;
    assert!(out.contains("Audio: "), "{out}");
    assert!(out.contains("dal.mp3"), "{out}");
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn unstorable_file_name_saves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("dal\\song.wav");
    std::fs::write(&clip, b"RIFF").unwrap();
    let mut app = app(dir.path());
    run(&mut app, "login admin password123").await;

    for line in [
      "set name Ravi",
      "set email ravi@example.com",
      "set category Main",
      "set title Dal",
      "set description Lentils",
      "set corpus audio",
    ] {
      run(&mut app, line).await;
    }
    run(&mut app, &format!("attach audio {}", clip.display())).await;
    let out = run(&mut app, "submit").await;
    assert!(out.contains("refusing blob name"), "{out}");
    assert!(!out.contains("successfully"), "{out}");
    assert_eq!(app.draft.title, "Dal");

    let table = std::fs::read_to_string(dir.path().join("recipes.csv")).unwrap();
    assert_eq!(table.lines().count(), 1);
    assert_eq!(std::fs::read_dir(dir.path().join("uploads")).unwrap().count(), 0);
  }

  #[tokio::test]
  async fn chat_degrades_when_offline() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app(dir.path());
    run(&mut app, "login admin password123").await;
    run(&mut app, "go chat").await;

    let out = run(&mut app, "chat I feel cosy").await;
    assert!(out.contains("I feel cosy"), "{out}");
    assert!(out.contains("offline"), "{out}");
    assert_eq!(app.session.chat.len(), 3);
  }

  #[tokio::test]
  async fn logout_and_quit() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app(dir.path());
    run(&mut app, "login admin password123").await;
    run(&mut app, "set title Dal").await;

    assert!(run(&mut app, "logout").await.contains("logged out"));
    assert!(!app.session.authenticated);
    assert_eq!(app.draft, DraftRecord::default());
    assert_eq!(app.handle_line("quit").await, Step::Quit);
  }

  #[tokio::test]
  async fn bad_command_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app(dir.path());
    let out = run(&mut app, "attach image /definitely/missing.png").await;
    assert!(out.starts_with("[error] reading /definitely/missing.png"), "{out}");
  }
}
