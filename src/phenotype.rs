use std::collections::HashSet;

use crate::connection::ConnectionGene;
use crate::error::NeatError;
use crate::node::{NodeGene, NodeKind};

/// spec.md §4.D: a recursive feed-forward evaluator over an organism's
/// nodes and enabled connections. Grounded on
/// `examples/original_source/nn/network.py::FeedForwardNetwork` — kept the
/// clear-then-recurse-from-outputs shape, generalized from the teacher's
/// toposort-based `Genome::output` (`genome.rs`) back to the spec's own
/// recursive `compute_root`, which is what makes the documented
/// cycle-breaking extension (spec.md §4.D Policy, §9) expressible at all:
/// toposort simply fails on a cycle, recursion-with-a-visited-set doesn't.
pub struct Phenotype {
    n_inputs: usize,
    nodes: Vec<NodeGene>,
    enabled_connections: Vec<ConnectionGene>,
}

impl Phenotype {
    pub fn new(n_inputs: usize, nodes: Vec<NodeGene>, connections: &[ConnectionGene]) -> Self {
        let enabled_connections = connections.iter().filter(|c| c.enabled).cloned().collect();
        Self {
            n_inputs,
            nodes,
            enabled_connections,
        }
    }

    fn clear_nodes(&mut self) {
        for node in &mut self.nodes {
            node.clear();
        }
    }

    fn node_index(&self, id: u32) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// spec.md §4.D `computeRoot`. `visited` guards against the cycles
    /// mutation does not forbid (spec.md §9): a second visit to the same
    /// node contributes 0 instead of recursing forever.
    fn compute_root(&mut self, node_id: u32, visited: &mut HashSet<u32>) {
        let idx = match self.node_index(node_id) {
            Some(idx) => idx,
            None => return,
        };
        if self.nodes[idx].value.is_some() {
            return;
        }
        if !visited.insert(node_id) {
            tracing::warn!(node_id, "cycle detected during propagation, treating as 0");
            return;
        }

        let branches: Vec<(u32, f64)> = self
            .enabled_connections
            .iter()
            .filter(|c| c.end_id == node_id)
            .map(|c| (c.start_id, c.weight))
            .collect();

        let mut sum = 0.0;
        for (start_id, weight) in branches {
            self.compute_root(start_id, visited);
            let start_value = self
                .node_index(start_id)
                .and_then(|i| self.nodes[i].value)
                .unwrap_or(0.0);
            sum += weight * start_value;
        }

        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == node_id) {
            node.activate(sum);
        }
        visited.remove(&node_id);
    }

    /// spec.md §4.D `propagate`.
    pub fn propagate(&mut self, inputs: &[f64]) -> Result<Vec<f64>, NeatError> {
        if inputs.len() != self.n_inputs {
            return Err(NeatError::ShapeMismatch {
                expected: self.n_inputs,
                actual: inputs.len(),
            });
        }

        self.clear_nodes();

        for (i, &value) in inputs.iter().enumerate() {
            if let Some(node) = self.nodes.iter_mut().find(|n| n.id == i as u32) {
                node.activate(value);
            }
        }

        let output_ids: Vec<u32> = self
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Output)
            .map(|n| n.id)
            .collect();

        let mut outputs = Vec::with_capacity(output_ids.len());
        for id in output_ids {
            let mut visited = HashSet::new();
            self.compute_root(id, &mut visited);
            let value = self.node_index(id).and_then(|i| self.nodes[i].value).unwrap_or(0.0);
            outputs.push(value);
        }

        Ok(outputs)
    }
}
