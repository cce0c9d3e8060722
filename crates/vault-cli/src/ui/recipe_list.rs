//! The "View Recipes" table.

use vault_core::{recipe::CorpusType, workflow::RecipeRow};

const HEADINGS: [&str; 7] = ["#", "Timestamp", "Username", "Title", "Category", "Geolocation", "CorpusType"];

fn cells(row: &RecipeRow) -> [String; 7] {
  [
    row.position.to_string(),
    row.submitted_at.to_string(),
    row.username.clone(),
    row.title.clone(),
    row.category.clone(),
    row.geolocation.clone(),
    // Legacy rows carry no corpus type and count as text.
    row.corpus_type.unwrap_or(CorpusType::Text).to_string(),
  ]
}

fn line<S: AsRef<str>>(cells: impl IntoIterator<Item = S>, widths: &[usize]) -> String {
  cells
    .into_iter()
    .zip(widths.iter().copied())
    .map(|(c, w)| format!("{:<w$}", c.as_ref()))
    .collect::<Vec<_>>()
    .join("  ")
    .trim_end()
    .to_owned()
}

/// Left-aligned columns, each as wide as its widest cell.
pub fn render(rows: &[RecipeRow], titles: &[String], selected: Option<&str>) -> Vec<String> {
  if rows.is_empty() {
    return Vec::new();
  }

  let table: Vec<[String; 7]> = rows.iter().map(cells).collect();
  let mut widths = HEADINGS.map(|h| h.chars().count());
  for row in &table {
    for (w, cell) in widths.iter_mut().zip(row) {
      *w = (*w).max(cell.chars().count());
    }
  }

  let mut out = vec![line(HEADINGS, &widths)];
  out.extend(table.iter().map(|r| line(r, &widths)));

  if !titles.is_empty() {
    out.push(String::new());
    out.push(format!("Titles: {}", titles.join(" | ")));
    out.push(match selected {
      Some(t) => format!("Selected: {t}"),
      None => "Pick one with 'select <title>'.".to_owned(),
    });
  }
  out
}
