//! Schema merging, nullability and translation into type descriptors.

pub mod merger;
pub mod nullability;
pub mod translate;
pub mod type_mapping;

pub use merger::{MergeError, MergeKind, merge_schemas};
pub use nullability::{is_nullable, permits_null};
pub use translate::Translator;
pub use type_mapping::{TypeCustomization, TypeMapping, TypeMappingOverrides};

#[cfg(test)]
mod tests;
