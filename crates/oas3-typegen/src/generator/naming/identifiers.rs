use std::{collections::BTreeSet, sync::LazyLock};

use any_ascii::any_ascii;
use inflections::Inflect;
use regex::Regex;

static RUST_KEYWORDS: LazyLock<BTreeSet<&str>> = LazyLock::new(|| {
  [
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "async", "await", "dyn", "try", "abstract", "become", "box", "do",
    "final", "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "gen",
  ]
  .into_iter()
  .collect()
});

/// Type names that would shadow prelude items or are not valid type identifiers.
static RESERVED_TYPE_NAMES: LazyLock<BTreeSet<&str>> = LazyLock::new(|| {
  [
    "Box", "Clone", "Copy", "Default", "Display", "Option", "Result", "Self", "Send", "String", "Sync", "Type", "Vec",
  ]
  .into_iter()
  .collect()
});

static INVALID_CHARS_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("static regex is valid"));
static MULTI_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").expect("static regex is valid"));

/// Transliterates to ASCII, turns runs of invalid characters into a single
/// underscore and trims underscores from both ends.
pub(crate) fn sanitize(input: &str) -> String {
  if input.is_empty() {
    return String::new();
  }

  let ascii = any_ascii(input);
  let replaced = INVALID_CHARS_RE.replace_all(&ascii, "_");
  let collapsed = MULTI_UNDERSCORE_RE.replace_all(&replaced, "_");

  collapsed.trim_matches('_').to_string()
}

/// Converts a property name into a `snake_case` field name.
///
/// A leading `-` becomes `negative_`, keywords get the raw prefix `r#`,
/// `self` becomes `self_`, a leading digit gets `_`, and an empty result is `_`.
pub(crate) fn to_rust_field_name(name: &str) -> String {
  let (negative, rest) = match name.strip_prefix('-') {
    Some(stripped) => (true, stripped),
    None => (false, name),
  };

  let mut ident = sanitize(rest).to_snake_case();
  if ident.is_empty() {
    return "_".to_string();
  }
  if negative {
    ident.insert_str(0, "negative_");
  }

  match ident.as_str() {
    "self" => "self_".to_string(),
    keyword if RUST_KEYWORDS.contains(keyword) => format!("r#{keyword}"),
    _ => {
      if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
      }
      ident
    }
  }
}

/// Converts a name into a `PascalCase` type name.
///
/// Already mixed-case names without separators keep their capitalization
/// (`XMLHttpRequest` stays as is); anything else is split into words at
/// separators and case boundaries. A leading `-` becomes `Negative`, reserved
/// names get a `Type` suffix, a leading digit gets a `T` prefix and an empty
/// result is `Unnamed`.
pub(crate) fn to_rust_type_name(name: &str) -> String {
  let (negative, rest) = match name.strip_prefix('-') {
    Some(stripped) => (true, stripped),
    None => (false, name),
  };
  let ascii = any_ascii(rest);

  let has_separators = ascii.contains(|c: char| !c.is_ascii_alphanumeric());
  let mixed_case = ascii.contains(|c: char| c.is_ascii_uppercase()) && ascii.contains(|c: char| c.is_ascii_lowercase());

  let mut ident = if mixed_case && !has_separators {
    let mut chars = ascii.chars();
    chars
      .next()
      .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
      .unwrap_or_default()
  } else {
    pascal_words(&ascii)
  };

  if ident.is_empty() {
    return "Unnamed".to_string();
  }
  if negative {
    ident.insert_str(0, "Negative");
  }
  if RESERVED_TYPE_NAMES.contains(ident.as_str()) {
    ident.push_str("Type");
  }
  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, 'T');
  }

  ident
}

/// Capitalizes the first letter of each word and lowercases the rest, where
/// words start after a non-alphanumeric character, at a lower-to-upper
/// transition, or at the last capital of an acronym (`HTTPServer` -> `HttpServer`).
fn pascal_words(input: &str) -> String {
  let chars: Vec<char> = input.chars().collect();
  let mut out = String::with_capacity(chars.len());
  let mut word_start = true;
  let mut prev_lower = false;

  for (i, &c) in chars.iter().enumerate() {
    if !c.is_ascii_alphanumeric() {
      word_start = true;
      prev_lower = false;
      continue;
    }

    let upper = c.is_ascii_uppercase();
    let next_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
    if word_start || (prev_lower && upper) || (upper && next_lower) {
      out.push(c.to_ascii_uppercase());
    } else {
      out.push(c.to_ascii_lowercase());
    }

    prev_lower = c.is_ascii_lowercase();
    word_start = false;
  }

  out
}

/// Returns `base_name` if unused, otherwise the first free `base_name2`, `base_name3`, ...
pub(crate) fn ensure_unique(base_name: &str, used_names: &BTreeSet<String>) -> String {
  if !used_names.contains(base_name) {
    return base_name.to_string();
  }
  (2..)
    .map(|i| format!("{base_name}{i}"))
    .find(|candidate| !used_names.contains(candidate))
    .unwrap_or_else(|| base_name.to_string())
}

/// Stable id for an operation that declares none: `get /pets/{id}` -> `get_pets_by_id`.
pub(crate) fn fallback_operation_id(method: &http::Method, path: &str) -> String {
  let method = method.as_str().to_ascii_lowercase();
  let parts: Vec<&str> = path
    .split('/')
    .filter(|segment| !segment.is_empty())
    .map(|segment| {
      if segment.starts_with('{') && segment.ends_with('}') {
        "by_id"
      } else {
        segment
      }
    })
    .collect();

  if parts.is_empty() {
    method
  } else {
    format!("{method}_{}", parts.join("_"))
  }
}

/// Type-name fragment for a path template: `/pets/{petId}/toys` -> `PetsPetIdToys`.
pub(crate) fn path_template_name(path: &str) -> String {
  let words: Vec<String> = path
    .split('/')
    .map(|segment| segment.trim_matches(|c| c == '{' || c == '}'))
    .filter(|segment| !segment.is_empty())
    .map(to_rust_type_name)
    .collect();

  if words.is_empty() {
    "Root".to_string()
  } else {
    words.concat()
  }
}

/// Type-name fragment for a response status key: `200` and `2XX` stay as they
/// are, `default` becomes `Default`.
pub(crate) fn status_code_name(status: &str) -> String {
  let status = status.trim();
  if !status.is_empty() && status.starts_with(|c: char| c.is_ascii_digit()) && status.chars().all(|c| c.is_ascii_alphanumeric()) {
    status.to_ascii_uppercase()
  } else {
    pascal_words(&any_ascii(status))
  }
}
