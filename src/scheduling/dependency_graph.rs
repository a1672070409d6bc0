//! Completion-tracking task DAG with stratification and batching.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use super::errors::GraphError;

/// Directed acyclic graph of tasks with a mutable completion set.
///
/// Nodes are opaque caller-supplied ids (the planner uses contour indices).
/// Edges encode "must finish before": an edge `a → b` means `b` may only
/// start once `a` is complete.
///
/// # Invariants
///
/// - The graph stays acyclic;
///   [`add_node_with_deps`](Self::add_node_with_deps) rejects edges that
///   would close a cycle
/// - `roots()` are the nodes with no predecessors
/// - `can_start(n)` iff every predecessor of `n` is complete
#[derive(Debug, Clone)]
pub struct DependencyGraph<N>
where
    N: Copy + Eq + Hash + Ord + Debug,
{
    graph: DiGraph<N, ()>,
    indices: HashMap<N, NodeIndex>,
    order: Vec<N>,
    completed: HashSet<N>,
}

impl<N> Default for DependencyGraph<N>
where
    N: Copy + Eq + Hash + Ord + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> DependencyGraph<N>
where
    N: Copy + Eq + Hash + Ord + Debug,
{
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            indices: HashMap::new(),
            order: Vec::new(),
            completed: HashSet::new(),
        }
    }

    /// Inserts a node without dependencies. No-op if already present.
    pub fn add_node(&mut self, node: N) {
        if !self.indices.contains_key(&node) {
            let idx = self.graph.add_node(node);
            self.indices.insert(node, idx);
            self.order.push(node);
        }
    }

    /// Inserts a node that depends on `parents`, inserting any parent not
    /// yet present.
    ///
    /// # Errors
    ///
    /// [`GraphError::CycleDetected`] if any of the new edges would close a
    /// cycle (including a self-dependency). The node and its parents remain
    /// inserted; the offending edge is not.
    pub fn add_node_with_deps(&mut self, node: N, parents: &[N]) -> Result<(), GraphError> {
        self.add_node(node);
        for parent in parents {
            self.add_node(*parent);
            let from = self.indices[parent];
            let to = self.indices[&node];
            if from == to || has_path_connecting(&self.graph, to, from, None) {
                return Err(GraphError::CycleDetected);
            }
            self.graph.update_edge(from, to, ());
        }
        Ok(())
    }

    pub fn contains(&self, node: N) -> bool {
        self.indices.contains_key(&node)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.order.iter().copied()
    }

    pub fn mark_complete(&mut self, node: N) {
        self.completed.insert(node);
    }

    pub fn is_complete(&self, node: N) -> bool {
        self.completed.contains(&node)
    }

    /// True iff every predecessor of `node` is complete.
    pub fn can_start(&self, node: N) -> bool {
        let Some(&idx) = self.indices.get(&node) else {
            return false;
        };
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .all(|p| self.completed.contains(&self.graph[p]))
    }

    /// Nodes not yet complete, in insertion order.
    pub fn pending_tasks(&self) -> Vec<N> {
        self.order
            .iter()
            .filter(|n| !self.completed.contains(n))
            .copied()
            .collect()
    }

    /// Nodes with no predecessors, in insertion order.
    pub fn roots(&self) -> Vec<N> {
        self.order
            .iter()
            .filter(|n| {
                self.graph
                    .neighbors_directed(self.indices[n], Direction::Incoming)
                    .next()
                    .is_none()
            })
            .copied()
            .collect()
    }

    /// Clears the completion set.
    pub fn reset(&mut self) {
        self.completed.clear();
    }

    /// Direct successors of `node`, ascending.
    pub fn successors(&self, node: N) -> Vec<N> {
        let Some(&idx) = self.indices.get(&node) else {
            return Vec::new();
        };
        let mut succ: Vec<N> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|i| self.graph[i])
            .collect();
        succ.sort_unstable();
        succ
    }

    /// Direct predecessors of `node`, ascending.
    pub fn predecessors(&self, node: N) -> Vec<N> {
        let Some(&idx) = self.indices.get(&node) else {
            return Vec::new();
        };
        let mut pred: Vec<N> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|i| self.graph[i])
            .collect();
        pred.sort_unstable();
        pred
    }

    pub fn out_degree(&self, node: N) -> usize {
        self.indices.get(&node).map_or(0, |&idx| {
            self.graph
                .neighbors_directed(idx, Direction::Outgoing)
                .count()
        })
    }

    /// Topological generation of every node: the longest path length from
    /// any root.
    fn generations(&self) -> HashMap<N, usize> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|i| {
                (
                    i,
                    self.graph.neighbors_directed(i, Direction::Incoming).count(),
                )
            })
            .collect();

        let mut depth: HashMap<N, usize> = HashMap::new();
        let mut queue: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|i| in_degree[i] == 0)
            .collect();
        for idx in &queue {
            depth.insert(self.graph[*idx], 0);
        }

        while let Some(idx) = queue.pop_front() {
            let node_depth = depth[&self.graph[idx]];
            for succ in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                let entry = depth.entry(self.graph[succ]).or_insert(0);
                *entry = (*entry).max(node_depth + 1);
                let remaining = in_degree.get_mut(&succ).expect("known node");
                *remaining -= 1;
                if *remaining == 0 {
                    queue.push_back(succ);
                }
            }
        }
        depth
    }

    /// The subgraph induced by `members`: nodes in insertion order, plus
    /// every edge whose endpoints are both members.
    fn induced_subgraph(&self, members: &HashSet<N>) -> DependencyGraph<N> {
        let mut sub = DependencyGraph::new();
        for node in &self.order {
            if members.contains(node) {
                sub.add_node(*node);
            }
        }
        for edge in self.graph.edge_references() {
            let from = self.graph[edge.source()];
            let to = self.graph[edge.target()];
            if members.contains(&from) && members.contains(&to) {
                sub.add_node_with_deps(to, &[from])
                    .expect("subgraph of a DAG is acyclic");
            }
        }
        sub
    }

    /// Splits the graph into subgraphs of `delta` consecutive topological
    /// generations each.
    ///
    /// Generation `i` holds the nodes whose longest path from any root has
    /// length `i`; nodes within a generation never depend on each other.
    pub fn stratify(&self, delta: usize) -> Vec<DependencyGraph<N>> {
        assert!(delta > 0, "stratification depth must be positive");
        let depths = self.generations();
        let Some(max_depth) = depths.values().copied().max() else {
            return Vec::new();
        };

        let mut subgraphs = Vec::new();
        let mut first = 0;
        while first <= max_depth {
            let members: HashSet<N> = depths
                .iter()
                .filter(|(_, d)| (first..first + delta).contains(d))
                .map(|(n, _)| *n)
                .collect();
            subgraphs.push(self.induced_subgraph(&members));
            first += delta;
        }
        subgraphs
    }

    /// Greedily partitions nodes (in insertion order) into groups of at most
    /// `max_nodes` and induces the subgraph on each group.
    ///
    /// Edges crossing group boundaries are dropped: this is a coarse
    /// partition for parallel planning, not a precedence-preserving
    /// decomposition. Callers plan the batches in order.
    pub fn batch(&self, max_nodes: usize) -> Vec<DependencyGraph<N>> {
        assert!(max_nodes > 0, "batch size must be positive");
        self.order
            .chunks(max_nodes)
            .map(|chunk| {
                let members: HashSet<N> = chunk.iter().copied().collect();
                self.induced_subgraph(&members)
            })
            .collect()
    }
}
