mod merger;
mod support;
mod type_mapping;
