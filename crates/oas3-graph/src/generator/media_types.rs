use itertools::Itertools;
use mediatype::MediaType;
use regex::{Regex, RegexBuilder};

use super::GeneratorError;

/// Lower-cased `type/subtype` of a media type, without parameters.
#[must_use]
pub fn essence(media_type: &str) -> String {
  match MediaType::parse(media_type) {
    Ok(media) => media.essence().to_string().to_ascii_lowercase(),
    Err(_) => media_type
      .split(';')
      .next()
      .unwrap_or_default()
      .trim()
      .to_ascii_lowercase(),
  }
}

#[derive(Debug, Clone)]
enum Preference {
  Literal(String),
  Pattern(Regex),
}

impl Preference {
  fn parse(entry: &str) -> Result<Self, GeneratorError> {
    let tokens = entry.split_whitespace().collect_vec();
    let [pattern, flags] = tokens.as_slice() else {
      return Ok(Self::Literal(essence(entry)));
    };

    let mut builder = RegexBuilder::new(pattern);
    builder.case_insensitive(true);
    for flag in flags.chars() {
      match flag {
        'i' => builder.case_insensitive(true),
        'm' => builder.multi_line(true),
        's' => builder.dot_matches_new_line(true),
        'x' => builder.ignore_whitespace(true),
        'u' => builder.unicode(true),
        other => {
          tracing::warn!(pattern = entry, flag = %other, "ignoring unknown media type pattern flag");
          &mut builder
        }
      };
    }

    builder
      .build()
      .map(Self::Pattern)
      .map_err(|source| GeneratorError::InvalidMediaTypePattern {
        pattern: entry.to_string(),
        source,
      })
  }

  fn matches(&self, media_type: &str) -> bool {
    match self {
      Self::Literal(literal) => essence(media_type) == *literal,
      Self::Pattern(regex) => regex.is_match(&media_type.to_ascii_lowercase()),
    }
  }
}

/// Ordered media type preference list.
#[derive(Debug, Clone)]
pub struct MediaTypeRanker {
  preferences: Vec<Preference>,
}

impl MediaTypeRanker {
  pub fn new<S: AsRef<str>>(entries: &[S]) -> Result<Self, GeneratorError> {
    let preferences = entries
      .iter()
      .map(|entry| Preference::parse(entry.as_ref()))
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self { preferences })
  }

  /// Index of the first preference matching `media_type`.
  #[must_use]
  pub fn rank_of(&self, media_type: &str) -> Option<usize> {
    self
      .preferences
      .iter()
      .position(|preference| preference.matches(media_type))
  }

  /// Keeps the candidates that match some preference, ordered by the rank of the
  /// first preference each one matches. Candidates of equal rank keep their input
  /// order; unmatched candidates are dropped.
  pub fn rank<'a, I>(&self, candidates: I) -> Vec<&'a str>
  where
    I: IntoIterator<Item = &'a str>,
  {
    candidates
      .into_iter()
      .filter_map(|candidate| self.rank_of(candidate).map(|rank| (rank, candidate)))
      .sorted_by_key(|(rank, _)| *rank)
      .map(|(_, candidate)| candidate)
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::generator::config::DEFAULT_MEDIA_TYPE_PREFERENCES;

  #[test]
  fn test_unmatched_candidates_are_dropped() {
    let ranker = MediaTypeRanker::new(&["application/json", "text/plain"]).unwrap();
    assert_eq!(
      ranker.rank(["application/xml", "application/json"]),
      vec!["application/json"]
    );
  }

  #[test]
  fn test_candidates_sorted_by_preference() {
    let ranker = MediaTypeRanker::new(&["application/json", "text/plain"]).unwrap();
    assert_eq!(
      ranker.rank(["text/plain", "application/json; charset=utf-8"]),
      vec!["application/json; charset=utf-8", "text/plain"]
    );
  }

  #[test]
  fn test_pattern_entries_match_case_insensitively() {
    let ranker = MediaTypeRanker::new(&[r"^application/[^;]+\+json i"]).unwrap();
    assert_eq!(
      ranker.rank(["Application/Problem+JSON", "application/json", "application/vnd.api+json"]),
      vec!["Application/Problem+JSON", "application/vnd.api+json"]
    );
  }

  #[test]
  fn test_equal_rank_keeps_input_order() {
    let ranker = MediaTypeRanker::new(DEFAULT_MEDIA_TYPE_PREFERENCES).unwrap();
    assert_eq!(
      ranker.rank(["text/csv", "text/html", "application/json"]),
      vec!["application/json", "text/csv", "text/html"]
    );
  }

  #[test]
  fn test_invalid_pattern_is_reported() {
    let error = MediaTypeRanker::new(&["^application/(json i"]).unwrap_err();
    assert!(matches!(
      error,
      GeneratorError::InvalidMediaTypePattern { ref pattern, .. } if pattern == "^application/(json i"
    ));
  }

  #[test]
  fn test_essence_strips_parameters() {
    assert_eq!(essence("Application/JSON; charset=utf-8"), "application/json");
    assert_eq!(essence("not a media type"), "not a media type");
  }
}
