pub(crate) mod candidates;
pub mod content_types;
pub mod identifiers;
pub mod resolver;

pub use resolver::{NameDecision, NameMap, NameResolution, NamingStrategy, resolve_names};

#[cfg(test)]
mod tests;
