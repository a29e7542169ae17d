mod gather;
mod schema_graph;
mod support;
