//! A single recipe.

use vault_core::workflow::DetailPanel;

pub fn render(panel: &DetailPanel) -> Vec<String> {
  let r = &panel.record;
  let mut out = vec![
    format!("# {}", r.title),
    format!(
      "Submitted by: {} ({}) at {} from {}",
      r.full_name,
      r.username,
      r.submitted_at,
      r.geolocation
    ),
    format!("Category: {}", r.category),
    format!("Corpus Type: {}", r.effective_corpus_type()),
    format!("Description: {}", r.description),
  ];

  if let Some(media) = &panel.media {
    out.push(format!("{}: {}", media.kind, media.path.display()));
  }

  let has_text = !r.ingredients.trim().is_empty() || !r.steps.trim().is_empty();
  if panel.instructions_collapsed {
    if has_text {
      out.push(String::new());
      out.push("Text instructions (supplementary):".into());
      out.extend(instructions(&r.ingredients, &r.steps));
    }
  } else {
    out.push(String::new());
    out.extend(instructions(&r.ingredients, &r.steps));
  }
  out
}

fn instructions(ingredients: &str, steps: &str) -> Vec<String> {
  let mut out = vec!["Ingredients:".to_owned()];
  out.extend(ingredients.lines().map(|l| format!("  {l}")));
  out.push("Steps:".to_owned());
  out.extend(steps.lines().map(|l| format!("  {l}")));
  out
}
