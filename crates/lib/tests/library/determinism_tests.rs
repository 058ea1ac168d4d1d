//! Resolved graphs do not depend on worker scheduling.

use modgraph_lib::util::hash::Hashable;
use modgraph_lib::{Config, ResolvedGraph};
use proptest::prelude::*;
use serde_json::json;

use super::common::{config, resolve};

fn with_parallelism(parallelism: usize) -> Config {
  Config {
    parallelism,
    ..config()
  }
}

/// `count` libraries where library `i` links the libraries named by `links[i]`,
/// each pointing at a lower index so the graph stays acyclic.
fn library_chain(links: &[Vec<usize>]) -> serde_json::Value {
  let modules: Vec<_> = links
    .iter()
    .enumerate()
    .map(|(i, deps)| {
      let mut targets: Vec<String> = deps.iter().filter(|d| **d < i).map(|d| format!("lib{d}")).collect();
      targets.sort();
      targets.dedup();
      json!({
        "type": "cc_library",
        "name": format!("lib{i}"),
        "properties": { "shared_libs": targets, "cflags": [format!("-DLIB{i}")] }
      })
    })
    .collect();
  json!([{ "path": "p", "modules": modules }])
}

fn resolve_with(parallelism: usize, build: serde_json::Value) -> ResolvedGraph {
  resolve(with_parallelism(parallelism), build).unwrap()
}

#[test]
fn repeated_runs_hash_identically() {
  let build = library_chain(&[vec![], vec![0], vec![0, 1], vec![2], vec![1, 3]]);
  let first = resolve_with(1, build.clone());
  let second = resolve_with(8, build.clone());
  let third = resolve_with(8, build);

  assert_eq!(first, second);
  assert_eq!(first.compute_hash().unwrap(), second.compute_hash().unwrap());
  assert_eq!(second.compute_hash().unwrap(), third.compute_hash().unwrap());
  assert_eq!(
    serde_json::to_string(&first).unwrap(),
    serde_json::to_string(&third).unwrap()
  );
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(24))]

  #[test]
  fn parallelism_never_changes_the_result(
    links in prop::collection::vec(prop::collection::vec(0usize..12, 0..4), 1..12)
  ) {
    let build = library_chain(&links);
    let serial = resolve_with(1, build.clone());
    let parallel = resolve_with(6, build);
    prop_assert_eq!(serial.compute_hash().unwrap(), parallel.compute_hash().unwrap());
    prop_assert_eq!(serial, parallel);
  }
}
