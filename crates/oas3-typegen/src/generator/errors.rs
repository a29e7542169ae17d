use crate::{generator::converter::merger::MergeError, utils::RefError};

/// Fatal conditions raised by the generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
  #[error("unsupported OpenAPI version '{0}': expected 3.0.x or 3.1.x")]
  UnsupportedVersion(String),

  #[error("{path}: {source}")]
  Reference {
    path: String,
    #[source]
    source: RefError,
  },

  #[error("{path}: cannot merge schemas: {source}")]
  Merge {
    path: String,
    #[source]
    source: MergeError,
  },

  #[error("{path}: extension '{key}' {message}")]
  Extension { path: String, key: String, message: String },

  #[error("{path}: no resolved type name for reference '{ref_path}'")]
  UnnamedReference { path: String, ref_path: String },

  #[error("name resolution did not converge after {iterations} passes; still colliding: {collisions:?}")]
  NameResolutionDiverged { iterations: usize, collisions: Vec<String> },
}

impl GeneratorError {
  pub fn reference(path: impl ToString, source: RefError) -> Self {
    Self::Reference {
      path: path.to_string(),
      source,
    }
  }

  pub fn merge(path: impl ToString, source: MergeError) -> Self {
    Self::Merge {
      path: path.to_string(),
      source,
    }
  }
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;
