#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
//! Schema resolution core for OpenAPI 3.0/3.1 code generators.
//!
//! The pipeline prunes a document to what its operations reach, gathers every
//! schema-bearing location, assigns each one a unique Rust type name, merges
//! `allOf` compositions, and translates every schema into a [`TypeDescriptor`]
//! that emitters render.
//!
//! [`TypeDescriptor`]: generator::ast::TypeDescriptor

pub mod generator;
pub mod spec;
pub mod ui;
pub mod utils;
