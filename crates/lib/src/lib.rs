//! modgraph-lib: module graph transformation engine
//!
//! This crate turns a tree of declarative module descriptions into a fully
//! resolved build graph:
//! - `property`: typed, schema-checked property trees with merge and selection
//! - `namespace`: namespaces, name resolution and visibility rules
//! - `graph`: the module/variant arena and its dependency edges
//! - `mutator`: the staged bottom-up/top-down rewrite pipeline
//! - `defaults`: defaults propagation, run before every other mutator
//! - `resolved`: the final graph handed to lowering

pub mod config;
pub mod consts;
pub mod context;
pub mod defaults;
pub mod delegation;
pub mod error;
pub mod graph;
pub mod input;
pub mod module_types;
pub mod mutator;
pub mod namespace;
pub mod platform;
pub mod property;
pub mod resolved;
pub mod util;

pub use config::Config;
pub use context::{Context, resolve_packages};
pub use error::{BuildError, ErrorList};
pub use input::PackageSet;
pub use resolved::ResolvedGraph;
