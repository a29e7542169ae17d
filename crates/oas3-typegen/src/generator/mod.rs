pub mod ast;
pub mod config;
pub mod converter;
pub mod errors;
pub mod extensions;
pub mod gather;
pub mod metrics;
pub mod naming;
pub mod operations;
pub mod orchestrator;
pub mod prune;
pub mod schema_graph;

#[cfg(test)]
mod tests;
