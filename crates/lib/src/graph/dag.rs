//! Traversal order over the live variants.
//!
//! The variant graph is rebuilt as a petgraph `DiGraph` with edges running
//! from dependency to dependent, then levelled with Kahn's algorithm: each
//! wave only holds variants whose dependencies are all in earlier waves, so
//! the variants of one wave can be processed in parallel.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::{ModuleGraph, VariantId};

/// A dependency cycle: each variant depends on the next, and the last
/// element repeats the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
  pub path: Vec<VariantId>,
}

struct VariantDag {
  graph: DiGraph<VariantId, ()>,
}

impl VariantDag {
  fn build(modules: &ModuleGraph) -> Self {
    let mut graph = DiGraph::new();
    let mut nodes: BTreeMap<VariantId, NodeIndex> = BTreeMap::new();

    // Nodes are added in variant id order, so node index order matches it.
    for variant in modules.live_variants() {
      nodes.insert(variant.id, graph.add_node(variant.id));
    }

    for variant in modules.live_variants() {
      let dependent = nodes[&variant.id];
      for dep in &variant.deps {
        for target in &dep.targets {
          if let Some(&dependency) = nodes.get(target) {
            graph.add_edge(dependency, dependent, ());
          }
        }
      }
    }

    Self { graph }
  }

  fn waves(&self) -> Option<Vec<Vec<VariantId>>> {
    let mut in_degree: BTreeMap<NodeIndex, usize> = self
      .graph
      .node_indices()
      .map(|idx| (idx, self.graph.neighbors_directed(idx, Direction::Incoming).count()))
      .collect();
    let mut remaining: BTreeSet<NodeIndex> = self.graph.node_indices().collect();
    let mut waves = Vec::new();

    while !remaining.is_empty() {
      let ready: Vec<NodeIndex> = remaining.iter().filter(|idx| in_degree[*idx] == 0).copied().collect();
      if ready.is_empty() {
        return None;
      }

      for idx in &ready {
        remaining.remove(idx);
        for dependent in self.graph.neighbors_directed(*idx, Direction::Outgoing) {
          if let Some(deg) = in_degree.get_mut(&dependent) {
            *deg = deg.saturating_sub(1);
          }
        }
      }

      waves.push(ready.into_iter().map(|idx| self.graph[idx]).collect());
    }

    Some(waves)
  }

  fn cycle(&self) -> Option<Cycle> {
    let nodes = find_cycles(&self.graph, Direction::Incoming).into_iter().next()?;
    Some(Cycle {
      path: nodes.into_iter().map(|idx| self.graph[idx]).collect(),
    })
  }
}

/// One cycle per strongly connected component of `graph`, ordered by their
/// lowest node index.
///
/// `direction` is the edge direction leading from a node to the nodes it
/// depends on. Each cycle starts at the component's lowest node and repeats
/// it at the end.
pub(crate) fn find_cycles<N, E>(graph: &DiGraph<N, E>, direction: Direction) -> Vec<Vec<NodeIndex>> {
  let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(graph)
    .into_iter()
    .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
    .collect();
  components.iter_mut().for_each(|scc| scc.sort());
  components.sort();

  components
    .into_iter()
    .filter_map(|scc| cycle_through(graph, &scc.into_iter().collect(), direction))
    .collect()
}

fn cycle_through<N, E>(graph: &DiGraph<N, E>, members: &BTreeSet<NodeIndex>, direction: Direction) -> Option<Vec<NodeIndex>> {
  let start = *members.first()?;

  // Breadth-first walk along dependency direction until back at `start`.
  let mut parent: BTreeMap<NodeIndex, NodeIndex> = BTreeMap::new();
  let mut queue = VecDeque::from([start]);
  while let Some(node) = queue.pop_front() {
    let mut next_nodes: Vec<NodeIndex> = graph
      .neighbors_directed(node, direction)
      .filter(|n| members.contains(n))
      .collect();
    next_nodes.sort();
    next_nodes.dedup();

    for next in next_nodes {
      if next == start {
        let mut back = vec![node];
        let mut cursor = node;
        while let Some(&p) = parent.get(&cursor) {
          back.push(p);
          cursor = p;
        }
        if back.last() == Some(&start) {
          back.pop();
        }
        let mut path = vec![start];
        path.extend(back.into_iter().rev());
        path.push(start);
        return Some(path);
      }
      if !parent.contains_key(&next) {
        parent.insert(next, node);
        queue.push_back(next);
      }
    }
  }
  None
}

impl ModuleGraph {
  /// Live variants grouped into bottom-up waves: every variant comes after
  /// all of its dependencies. Reversing the waves gives a top-down order.
  pub fn bottom_up_waves(&self) -> Result<Vec<Vec<VariantId>>, Cycle> {
    let dag = VariantDag::build(self);
    match dag.waves() {
      Some(waves) => Ok(waves),
      None => Err(dag.cycle().unwrap_or(Cycle { path: Vec::new() })),
    }
  }

  /// The first dependency cycle among live variants, if any.
  pub fn find_cycle(&self) -> Option<Cycle> {
    VariantDag::build(self).cycle()
  }
}
