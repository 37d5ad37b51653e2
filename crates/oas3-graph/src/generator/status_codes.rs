use http::Method;
use itertools::Itertools;

/// Sort key that places `default` right after the `2XX` block.
const DEFAULT_SORT_KEY: &str = "2YY";

fn sort_key(code: &str) -> String {
  if code.eq_ignore_ascii_case("default") {
    return DEFAULT_SORT_KEY.to_string();
  }
  let mut key = code.to_ascii_uppercase();
  while key.len() < 3 {
    key.push('X');
  }
  key
}

/// Codes moved to the front for a method, highest priority first.
fn pulled_forward(method: &Method) -> &'static [&'static str] {
  match *method {
    Method::HEAD | Method::GET => &["204", "200"],
    Method::POST => &["200", "201"],
    Method::PUT => &["204", "200", "201"],
    Method::DELETE => &["200", "204", "202"],
    _ => &[],
  }
}

/// Orders the status keys of an operation's responses.
///
/// Keys are deduplicated case-insensitively (first spelling wins), sorted by
/// their three-character class key, and then the method's preferred success
/// codes are pulled to the front.
pub fn preferred_response_codes<'a, I>(method: &Method, codes: I) -> Vec<&'a str>
where
  I: IntoIterator<Item = &'a str>,
{
  let sorted = codes
    .into_iter()
    .unique_by(|code| code.to_ascii_lowercase())
    .sorted_by_cached_key(|code| sort_key(code))
    .collect_vec();

  let preferred = pulled_forward(method);
  let front = preferred
    .iter()
    .filter_map(|wanted| sorted.iter().copied().find(|code| code == wanted));
  let rest = sorted
    .iter()
    .copied()
    .filter(|code| !preferred.iter().any(|wanted| wanted == code));
  front.chain(rest).collect()
}
