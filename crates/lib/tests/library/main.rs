//! Integration tests for modgraph-lib: whole builds from package records to
//! the resolved graph.

mod common;
mod defaults_tests;
mod determinism_tests;
mod end_to_end_tests;
mod files_tests;
mod namespaces_tests;
mod variants_tests;
