//! Plain-text rendering of workflow frames.

pub mod recipe_detail;
pub mod recipe_list;

use vault_core::{
  chat::{ChatMessage, Role},
  geo::GeoStatus,
  recipe::CorpusType,
  report::CollectionReport,
  session::Session,
  validate::DraftRecord,
  workflow::{Body, Frame, GeoPanel, Notice},
};

// ─── Root ────────────────────────────────────────────────────────────────────

/// Everything printed after a tick: header, notices, then the body.
pub fn frame(session: &Session, frame: &Frame) -> String {
  let mut out = vec![header(session)];
  out.extend(frame.notices.iter().map(notice));
  out.push(String::new());
  out.extend(body(&frame.body));
  out.join("\n")
}

fn header(session: &Session) -> String {
  if session.authenticated {
    format!("== {} == (logged in as {})", session.view.label(), session.username)
  } else {
    "== Recipe Vault ==".to_owned()
  }
}

fn notice(n: &Notice) -> String {
  match n {
    Notice::Success(m) => format!("[ok] {m}"),
    Notice::Info(m) => format!("[info] {m}"),
    Notice::Warning(m) => format!("[warn] {m}"),
    Notice::Error(m) => format!("[error] {m}"),
  }
}

fn body(body: &Body) -> Vec<String> {
  match body {
    Body::Login => vec!["Please log in: login <username> <password>".to_owned()],
    Body::Submit(geo) => submit(geo),
    Body::ListAll {
      rows,
      titles,
      selected,
    } => recipe_list::render(rows, titles, selected.as_deref()),
    Body::Detail(panel) => recipe_detail::render(panel),
    Body::Chat(messages) => chat(messages),
    Body::Report(Some(report)) => collection_report(report),
    Body::Report(None) => Vec::new(),
  }
}

// ─── Submit ──────────────────────────────────────────────────────────────────

fn submit(geo: &GeoPanel) -> Vec<String> {
  let mut out = vec![format!("Location: {}", geo.display_text)];
  match (geo.status, &geo.error) {
    (GeoStatus::Pending, _) => out.push("Press enter to check on the location request.".into()),
    (GeoStatus::Failed, Some(e)) => out.push(format!("Location not detected: {e}")),
    _ => {}
  }
  out.push("Fill in the form with 'set', then 'submit'. 'form' shows the draft.".into());
  out
}

/// The submission draft as currently entered.
pub fn draft(d: &DraftRecord) -> String {
  let attachment = |u: &Option<vault_core::recipe::Upload>| match u {
    Some(u) => format!("{} ({} bytes)", u.name, u.bytes.len()),
    None => "-".to_owned(),
  };
  let mut out = vec![
    format!("Full Name:   {}", d.full_name),
    format!("Email:       {}", d.email),
    format!("Category:    {}", d.category),
    format!("Title:       {}", d.title),
    format!("Description: {}", d.description),
    format!("Corpus Type: {}", d.corpus_type),
  ];
  match d.corpus_type {
    CorpusType::Text => {
      out.push(format!("Ingredients: {}", d.ingredients));
      out.push(format!("Steps:       {}", d.steps));
    }
    CorpusType::Audio => out.push(format!("Audio:       {}", attachment(&d.audio))),
    CorpusType::Video => out.push(format!("Video:       {}", attachment(&d.video))),
  }
  out.push(format!("Image:       {}", attachment(&d.image)));
  out.join("\n")
}

// ─── Chat ────────────────────────────────────────────────────────────────────

fn chat(messages: &[ChatMessage]) -> Vec<String> {
  messages
    .iter()
    .map(|m| match m.role {
      Role::User => format!("you> {}", m.content),
      Role::Assistant => format!("bot> {}", m.content),
    })
    .collect()
}

// ─── Report ──────────────────────────────────────────────────────────────────

fn collection_report(r: &CollectionReport) -> Vec<String> {
  let mut out = vec![format!("Recipes: {}", r.total)];
  out.extend(
    r.by_corpus_type
      .iter()
      .map(|(ct, n)| format!("  {ct}: {n}")),
  );
  out.push(format!("With location: {}", r.with_location));
  if !r.by_category.is_empty() {
    out.push("By category:".into());
    out.extend(r.by_category.iter().map(|(c, n)| format!("  {c}: {n}")));
  }
  if let Some(latest) = r.latest {
    out.push(format!(
      "Latest submission: {}",
      latest.format(vault_core::recipe::TIMESTAMP_FORMAT)
    ));
  }
  out
}
