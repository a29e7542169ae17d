pub mod refs;
pub mod schema_ext;
pub mod spec;

pub(crate) use refs::{RefCollector, RefError, RefTarget};
pub(crate) use schema_ext::SchemaExt;
