use crate::node::{NodeGene, NodeKind};

/// spec.md §3. Nodes are referenced by id, not by value — connections live
/// alongside `NodeGene`s in `Organism`'s owning collections (spec.md §9).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConnectionGene {
    pub start_id: u32,
    pub end_id: u32,
    pub weight: f64,
    pub enabled: bool,
    pub innovation: u32,
}

impl ConnectionGene {
    pub fn new(start_id: u32, end_id: u32, weight: f64, innovation: u32) -> Self {
        Self {
            start_id,
            end_id,
            weight,
            enabled: true,
            innovation,
        }
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn is_connected_to(&self, node_id: u32) -> bool {
        self.start_id == node_id || self.end_id == node_id
    }

    /// Randomize weight, optionally scaled by `factor`. spec.md §4.C uses
    /// `uniform(-1,1)*0.2` for the parametric-mutation branch.
    pub fn randomize_weight(&mut self, rng: &mut impl rand::Rng, factor: f64) {
        self.weight = rng.random_range(-1.0..1.0) * factor;
    }
}

/// Equal iff the unordered `{start, end}` pair matches — spec.md §3.
impl PartialEq for ConnectionGene {
    fn eq(&self, other: &Self) -> bool {
        (self.start_id == other.start_id && self.end_id == other.end_id)
            || (self.start_id == other.end_id && self.end_id == other.start_id)
    }
}

/// Reorient a prospective `(start, end)` pair per spec.md §3's orientation
/// rule: inputs are never destinations, outputs are never sources,
/// HIDDEN→HIDDEN is ordered by id.
pub fn reorient(start: &NodeGene, end: &NodeGene) -> (u32, u32) {
    if end.kind == NodeKind::Input {
        (end.id, start.id)
    } else if start.kind == NodeKind::Output {
        (end.id, start.id)
    } else if start.kind == NodeKind::Hidden && end.kind == NodeKind::Hidden && start.id > end.id {
        (end.id, start.id)
    } else {
        (start.id, end.id)
    }
}

impl std::fmt::Display for ConnectionGene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "inv: {} | enabled: {} | {} -> {} | w: {}",
            self.innovation, self.enabled, self.start_id, self.end_id, self.weight
        )
    }
}
