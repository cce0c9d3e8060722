//! Collection summary shown on the report view.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::recipe::{CorpusType, RecipeRecord};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionReport {
  pub total:          usize,
  /// Legacy rows without a corpus type are counted as text.
  pub by_corpus_type: BTreeMap<CorpusType, usize>,
  /// Keyed by trimmed category; blank categories are skipped.
  pub by_category:    BTreeMap<String, usize>,
  pub with_location:  usize,
  pub latest:         Option<NaiveDateTime>,
}

pub fn summarize(records: &[RecipeRecord]) -> CollectionReport {
  let mut report = CollectionReport {
    total: records.len(),
    by_corpus_type: CorpusType::ALL.into_iter().map(|c| (c, 0)).collect(),
    ..CollectionReport::default()
  };

  for r in records {
    *report
      .by_corpus_type
      .entry(r.effective_corpus_type())
      .or_default() += 1;

    let category = r.category.trim();
    if !category.is_empty() {
      *report.by_category.entry(category.to_owned()).or_default() += 1;
    }
    if r.has_geolocation() {
      report.with_location += 1;
    }
    report.latest = report.latest.max(r.submitted_at.parsed());
  }

  report
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;
  use crate::{
    recipe::Timestamp,
    testing::{now, record},
  };

  #[test]
  fn empty_store() {
    let report = summarize(&[]);
    assert_eq!(report.total, 0);
    assert_eq!(report.by_corpus_type.values().sum::<usize>(), 0);
    assert_eq!(report.by_corpus_type.len(), 3);
    assert_eq!(report.latest, None);
  }

  #[test]
  fn counts_and_latest() {
    let mut a = record("A", None);
    a.geolocation = "1.000000, 2.000000".into();
    let mut b = record("B", Some(CorpusType::Video));
    b.category = " Dessert ".into();
    b.submitted_at = (now() + Duration::hours(3)).into();
    let mut c = record("C", Some(CorpusType::Text));
    c.category = "  ".into();
    // Unparsed timestamps are counted but never the latest.
    c.submitted_at = Timestamp::Raw("2099-01-01T00:00:00".into());

    let report = summarize(&[a, b.clone(), c]);
    assert_eq!(report.total, 3);
    assert_eq!(report.by_corpus_type[&CorpusType::Text], 2);
    assert_eq!(report.by_corpus_type[&CorpusType::Video], 1);
    assert_eq!(report.by_corpus_type[&CorpusType::Audio], 0);
    assert_eq!(report.by_category.get("Drink"), Some(&1));
    assert_eq!(report.by_category.get("Dessert"), Some(&1));
    assert_eq!(report.by_category.len(), 2);
    assert_eq!(report.with_location, 1);
    assert_eq!(report.latest, b.submitted_at.parsed());
    assert_eq!(report.latest, Some(now() + Duration::hours(3)));
  }
}
