mod content_types;
mod identifiers;
