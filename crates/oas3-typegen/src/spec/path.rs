use std::fmt;

use serde::{Serialize, Serializer};

use super::ComponentSection;

/// Location of a node inside a document, as an ordered list of segments.
///
/// The string form joins segments with `/` and does not escape them, so
/// `["paths", "/pets", "get"]` renders as `paths//pets/get`. Paths are values:
/// extending one produces a new path.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentPath(Vec<String>);

impl DocumentPath {
  pub fn new<I, S>(segments: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self(segments.into_iter().map(Into::into).collect())
  }

  pub fn component(section: ComponentSection, name: &str) -> Self {
    Self(vec!["components".to_string(), section.to_string(), name.to_string()])
  }

  pub fn operation(path: &str, method: &http::Method) -> Self {
    Self(vec!["paths".to_string(), path.to_string(), method.as_str().to_ascii_lowercase()])
  }

  #[must_use]
  pub fn child(&self, segment: impl Into<String>) -> Self {
    let mut segments = self.0.clone();
    segments.push(segment.into());
    Self(segments)
  }

  #[must_use]
  pub fn join<I, S>(&self, segments: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut joined = self.0.clone();
    joined.extend(segments.into_iter().map(Into::into));
    Self(joined)
  }

  pub fn segments(&self) -> &[String] {
    &self.0
  }

  pub fn starts_with(&self, prefix: &DocumentPath) -> bool {
    self.0.starts_with(&prefix.0)
  }
}

impl fmt::Display for DocumentPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0.join("/"))
  }
}

impl Serialize for DocumentPath {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}
