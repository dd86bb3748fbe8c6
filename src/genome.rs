use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use uuid::Uuid;

use crate::config::{OrganismConfig, SpeciationConfig};
use crate::connection::{reorient, ConnectionGene};
use crate::error::NeatError;
use crate::innovation::InnovationRegistry;
use crate::node::{NodeGene, NodeKind};
use crate::util::chance;

/// spec.md §3's Organism (= Genome). Grounded on the data-model shapes in
/// `genes.rs`/`src/specie.rs`'s `representative: Individual` field and, for
/// the exact mutation/crossover-alignment algorithms, on
/// `examples/original_source/genetics/organism.py`. Node ids are a monotone
/// per-organism counter (`next_node_id`), not `nodes.len()` at creation
/// time, per the Design Notes in spec.md §9 ("id sparsity after deletion").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Organism {
    pub id: Uuid,
    pub species_id: Uuid,
    pub nodes: Vec<NodeGene>,
    pub genome: Vec<ConnectionGene>,
    pub fitness: f64,
    pub adjusted_fitness: f64,
    #[serde(skip)]
    next_node_id: u32,
}

impl Organism {
    /// Constructs a parentless organism: `inputs` INPUT + `outputs` OUTPUT
    /// nodes with ids `[0..inputs+outputs)`, empty genome (spec.md §3).
    pub fn new(species_id: Uuid, config: &OrganismConfig, rng: &mut impl Rng) -> Self {
        let mut nodes = Vec::with_capacity(config.inputs + config.outputs);
        for i in 0..config.inputs {
            nodes.push(NodeGene::new(i as u32, NodeKind::Input, rng));
        }
        for i in 0..config.outputs {
            nodes.push(NodeGene::new((config.inputs + i) as u32, NodeKind::Output, rng));
        }
        let next_node_id = (config.inputs + config.outputs) as u32;
        Self {
            id: Uuid::new_v4(),
            species_id,
            nodes,
            genome: Vec::new(),
            fitness: 0.0,
            adjusted_fitness: 0.0,
            next_node_id,
        }
    }

    /// Used by crossover: an offspring built from an explicit node/gene set
    /// rather than the parentless constructor. `next_node_id` must exceed
    /// every id present in `nodes`.
    pub fn from_parts(
        species_id: Uuid,
        nodes: Vec<NodeGene>,
        genome: Vec<ConnectionGene>,
    ) -> Self {
        let next_node_id = nodes.iter().map(|n| n.id + 1).max().unwrap_or(0);
        Self {
            id: Uuid::new_v4(),
            species_id,
            nodes,
            genome,
            fitness: 0.0,
            adjusted_fitness: 0.0,
            next_node_id,
        }
    }

    fn new_node_id(&mut self) -> u32 {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }

    fn node(&self, id: u32) -> Option<&NodeGene> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn has_hidden(&self) -> bool {
        self.nodes.iter().any(|n| n.kind == NodeKind::Hidden)
    }

    fn contains_equal(&self, connection: &ConnectionGene) -> bool {
        self.genome.iter().any(|c| c == connection)
    }

    /// spec.md §4.C `addRandomConnection`. Copies `nodes`, shuffles, pops the
    /// first as `start`, then finds the first subsequent node whose kind
    /// differs as `end`. Returns `false` (no-op) if no such pair exists or
    /// if the reoriented connection already exists in the genome.
    pub fn add_random_connection(
        &mut self,
        rng: &mut impl Rng,
        registry: &mut InnovationRegistry,
    ) -> bool {
        let mut pool: Vec<NodeGene> = self.nodes.clone();
        pool.shuffle(rng);
        let Some(start) = pool.first().cloned() else {
            return false;
        };
        let pool = &pool[1..];
        let Some(end) = pool.iter().find(|n| n.kind != start.kind) else {
            return false;
        };

        let (start_id, end_id) = reorient(&start, end);
        let start_node = self.node(start_id).expect("reoriented start exists").clone();
        let end_node = self.node(end_id).expect("reoriented end exists").clone();
        let innovation = registry.get_or_assign(start_node.id, end_node.id);
        let weight = rng.random_range(-1.0..1.0);
        let candidate = ConnectionGene::new(start_node.id, end_node.id, weight, innovation);

        if self.contains_equal(&candidate) {
            return false;
        }
        self.genome.push(candidate);
        true
    }

    fn add_node_mutation(&mut self, rng: &mut impl Rng, registry: &mut InnovationRegistry) {
        let new_id = self.new_node_id();
        let new_node = NodeGene::new(new_id, NodeKind::Hidden, rng);
        self.nodes.push(new_node);

        if self.genome.is_empty() {
            return;
        }

        let idx = (0..self.genome.len()).choose(rng).expect("genome non-empty");
        let (start_id, end_id, weight) = {
            let c = &mut self.genome[idx];
            c.disable();
            (c.start_id, c.end_id, c.weight)
        };

        let left_innovation = registry.get_or_assign(start_id, new_id);
        self.genome
            .push(ConnectionGene::new(start_id, new_id, 1.0, left_innovation));

        let right_innovation = registry.get_or_assign(new_id, end_id);
        self.genome
            .push(ConnectionGene::new(new_id, end_id, weight, right_innovation));
    }

    fn remove_node_mutation(&mut self, rng: &mut impl Rng) {
        let hidden_ids: Vec<u32> = self
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Hidden)
            .map(|n| n.id)
            .collect();
        let Some(&victim) = hidden_ids.choose(rng) else {
            return;
        };
        self.nodes.retain(|n| n.id != victim);
        self.genome.retain(|c| !c.is_connected_to(victim));
    }

    /// spec.md §4.C `mutate`.
    pub fn mutate(
        &mut self,
        rng: &mut impl Rng,
        registry: &mut InnovationRegistry,
        config: &OrganismConfig,
    ) {
        if chance(rng, config.structural_mutation_chance) {
            if chance(rng, config.structural_connection_mutation_chance) {
                if self.genome.is_empty() || chance(rng, config.structural_connection_addition_chance) {
                    self.add_random_connection(rng, registry);
                } else if let Some(idx) = (0..self.genome.len()).choose(rng) {
                    self.genome.remove(idx);
                }
            } else if !self.has_hidden() || chance(rng, config.structural_node_addition_chance) {
                self.add_node_mutation(rng, registry);
            } else {
                self.remove_node_mutation(rng);
            }
        } else if self.has_hidden() && chance(rng, config.activation_function_mutation_chance) {
            let hidden_ids: Vec<u32> = self
                .nodes
                .iter()
                .filter(|n| n.kind == NodeKind::Hidden)
                .map(|n| n.id)
                .collect();
            if let Some(&target) = hidden_ids.choose(rng) {
                if let Some(node) = self.nodes.iter_mut().find(|n| n.id == target) {
                    node.roll_activation(rng);
                }
            }
        } else if !self.genome.is_empty() {
            if let Some(idx) = (0..self.genome.len()).choose(rng) {
                self.genome[idx].randomize_weight(rng, 0.2);
            }
        }
    }

    /// spec.md §4.C `geneDistribution`. Aligns two genomes by innovation
    /// number; `larger`/`smaller` are picked by connection count (ties favor
    /// `self`), the returned node list comes from whichever organism has
    /// more nodes (ties favor `self`).
    pub fn gene_distribution(
        &self,
        other: &Organism,
    ) -> (
        Vec<NodeGene>,
        Vec<(ConnectionGene, ConnectionGene)>,
        Vec<ConnectionGene>,
        Vec<ConnectionGene>,
    ) {
        let (larger, smaller) = if other.genome.len() > self.genome.len() {
            (other, self)
        } else {
            (self, other)
        };
        let nodes = if other.nodes.len() > self.nodes.len() {
            other.nodes.clone()
        } else {
            self.nodes.clone()
        };

        let max_smaller_innovation = smaller.genome.iter().map(|c| c.innovation).max().unwrap_or(0);

        let mut shared = Vec::new();
        let mut excess = Vec::new();
        let mut disjoint = Vec::new();
        let mut smaller_leftover = smaller.genome.clone();

        for c1 in &larger.genome {
            if let Some(pos) = smaller_leftover.iter().position(|c2| c2 == c1) {
                let c2 = smaller_leftover.remove(pos);
                shared.push((c1.clone(), c2));
            } else if c1.innovation > max_smaller_innovation {
                excess.push(c1.clone());
            } else {
                disjoint.push(c1.clone());
            }
        }

        disjoint.extend(smaller_leftover);

        (nodes, shared, disjoint, excess)
    }

    /// spec.md §4.F's compatibility distance formula, grounded on
    /// `examples/original_source/genetics/population.py::compatibility`.
    pub fn compatibility(&self, other: &Organism, speciation: &SpeciationConfig) -> f64 {
        if self.genome.is_empty() && other.genome.is_empty() {
            return 0.0;
        }

        let (_, shared, disjoint, excess) = self.gene_distribution(other);
        let n = usize::max(self.genome.len(), other.genome.len()) as f64;

        let mut weight_diff_sum = 0.0;
        let mut weight_diff_count = 0usize;
        for (c1, c2) in &shared {
            if speciation.include_disabled_in_weight_average || (c1.enabled && c2.enabled) {
                weight_diff_sum += (c1.weight - c2.weight).abs();
                weight_diff_count += 1;
            }
        }
        let w = if weight_diff_count > 0 {
            weight_diff_sum / weight_diff_count as f64
        } else {
            0.0
        };

        (excess.len() as f64 * speciation.excess_factor + disjoint.len() as f64 * speciation.disjoint_factor) / n
            + w * speciation.weight_factor
    }

    /// Diagnostic only (spec.md §4.D policy / §9): whether the genome's
    /// enabled connections currently form a cycle. Does not affect
    /// evaluation semantics — `Phenotype::propagate` always terminates via
    /// its visited set.
    pub fn has_cycle(&self) -> bool {
        use petgraph::algo::is_cyclic_directed;
        use petgraph::graph::DiGraph;

        let mut graph = DiGraph::<u32, ()>::new();
        let mut indices = std::collections::HashMap::new();
        for node in &self.nodes {
            indices.insert(node.id, graph.add_node(node.id));
        }
        for c in self.genome.iter().filter(|c| c.enabled) {
            if let (Some(&s), Some(&e)) = (indices.get(&c.start_id), indices.get(&c.end_id)) {
                graph.add_edge(s, e, ());
            }
        }
        is_cyclic_directed(&graph)
    }

    /// spec.md §7 `InvalidConnection`: every connection must reference node
    /// ids present in `nodes`. Called on crossover offspring
    /// (`Species::crossover`) since `gene_distribution` picks the node list
    /// from whichever parent has more nodes independently of which parent's
    /// genome contributed the connections, so the two are not guaranteed to
    /// agree.
    pub fn validate(&self) -> Result<(), NeatError> {
        for c in &self.genome {
            if self.node(c.start_id).is_none() || self.node(c.end_id).is_none() {
                return Err(NeatError::InvalidConnection);
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Organism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Organism ({}): nodes ({}) | connections ({})",
            self.id,
            self.nodes.len(),
            self.genome.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn organism_config() -> OrganismConfig {
        OrganismConfig {
            inputs: 3,
            outputs: 1,
            mutation_chance: 0.2,
            structural_mutation_chance: 0.3,
            structural_connection_mutation_chance: 0.7,
            structural_connection_addition_chance: 0.7,
            structural_node_addition_chance: 0.7,
            activation_function_mutation_chance: 0.4,
        }
    }

    #[test]
    fn new_has_expected_node_ids_and_empty_genome() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = organism_config();
        let organism = Organism::new(Uuid::new_v4(), &config, &mut rng);
        assert_eq!(organism.nodes.len(), 4);
        assert!(organism.genome.is_empty());
        let ids: Vec<u32> = organism.nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn compatibility_with_self_is_zero() {
        let mut rng = StdRng::seed_from_u64(2);
        let config = organism_config();
        let mut registry = InnovationRegistry::new();
        let mut organism = Organism::new(Uuid::new_v4(), &config, &mut rng);
        for _ in 0..5 {
            organism.mutate(&mut rng, &mut registry, &config);
        }
        let clone = organism.clone();
        let speciation = SpeciationConfig {
            target_species: 5,
            threshold_step: 1.0,
            excess_factor: 1.0,
            disjoint_factor: 1.0,
            weight_factor: 0.4,
            include_disabled_in_weight_average: true,
        };
        assert_eq!(organism.compatibility(&clone, &speciation), 0.0);
    }

    #[test]
    fn compatibility_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = organism_config();
        let mut registry = InnovationRegistry::new();
        let mut a = Organism::new(Uuid::new_v4(), &config, &mut rng);
        let mut b = Organism::new(Uuid::new_v4(), &config, &mut rng);
        for _ in 0..8 {
            a.mutate(&mut rng, &mut registry, &config);
        }
        for _ in 0..3 {
            b.mutate(&mut rng, &mut registry, &config);
        }
        let speciation = SpeciationConfig {
            target_species: 5,
            threshold_step: 1.0,
            excess_factor: 1.0,
            disjoint_factor: 1.0,
            weight_factor: 0.4,
            include_disabled_in_weight_average: true,
        };
        let d1 = a.compatibility(&b, &speciation);
        let d2 = b.compatibility(&a, &speciation);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn node_removal_leaves_no_dangling_connection() {
        let mut rng = StdRng::seed_from_u64(9);
        let config = organism_config();
        let mut registry = InnovationRegistry::new();
        let mut organism = Organism::new(Uuid::new_v4(), &config, &mut rng);
        for _ in 0..200 {
            organism.mutate(&mut rng, &mut registry, &config);
        }
        for c in &organism.genome {
            assert!(organism.node(c.start_id).is_some());
            assert!(organism.node(c.end_id).is_some());
        }
    }

    #[test]
    fn gene_distribution_partitions_are_disjoint_and_complete() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = organism_config();
        let mut registry = InnovationRegistry::new();
        let mut a = Organism::new(Uuid::new_v4(), &config, &mut rng);
        let mut b = a.clone();
        for _ in 0..10 {
            a.mutate(&mut rng, &mut registry, &config);
        }
        for _ in 0..4 {
            b.mutate(&mut rng, &mut registry, &config);
        }

        let (_, shared, disjoint, excess) = a.gene_distribution(&b);
        let larger_len = usize::max(a.genome.len(), b.genome.len());
        let smaller_len = usize::min(a.genome.len(), b.genome.len());
        let leftover = smaller_len - shared.len();
        assert_eq!(shared.len() + disjoint.len() + excess.len(), larger_len + leftover);
    }

    /// S5 — adding a node splits an existing connection in two: the
    /// original is kept but disabled, and the new node sits between its
    /// original endpoints with the right half inheriting its weight.
    #[test]
    fn s5_node_addition_splits_a_connection() {
        let mut rng = StdRng::seed_from_u64(123);
        let config = organism_config();
        let mut registry = InnovationRegistry::new();

        let mut organism = Organism::new(Uuid::new_v4(), &config, &mut rng);
        while organism.genome.is_empty() {
            organism.add_random_connection(&mut rng, &mut registry);
        }
        let split = organism.genome[0].clone();
        let before_node_count = organism.nodes.len();

        organism.add_node_mutation(&mut rng, &mut registry);

        assert_eq!(organism.nodes.len(), before_node_count + 1);
        let new_node = organism
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::Hidden && n.id >= before_node_count as u32)
            .expect("a new hidden node was added");

        let left = organism
            .genome
            .iter()
            .find(|c| c.start_id == split.start_id && c.end_id == new_node.id)
            .expect("left half of split connection exists");
        let right = organism
            .genome
            .iter()
            .find(|c| c.start_id == new_node.id && c.end_id == split.end_id)
            .expect("right half of split connection exists");
        assert!(left.enabled);
        assert!(right.enabled);
        assert_eq!(right.weight, split.weight);

        let original = organism
            .genome
            .iter()
            .find(|c| c.start_id == split.start_id && c.end_id == split.end_id)
            .expect("original connection is retained, disabled");
        assert!(!original.enabled);
    }

    /// spec.md §9 "mutation does not forbid cycles": `has_cycle` must flag a
    /// genome whose enabled connections loop back on themselves, and must
    /// not flag a plain feed-forward one.
    #[test]
    fn has_cycle_detects_a_loop_among_hidden_nodes() {
        let config = organism_config();
        let mut rng = StdRng::seed_from_u64(21);
        let mut organism = Organism::new(Uuid::new_v4(), &config, &mut rng);

        let h1 = organism.new_node_id();
        let h2 = organism.new_node_id();
        organism.nodes.push(NodeGene::new(h1, NodeKind::Hidden, &mut rng));
        organism.nodes.push(NodeGene::new(h2, NodeKind::Hidden, &mut rng));
        organism.genome.push(ConnectionGene::new(h1, h2, 0.5, 0));
        organism.genome.push(ConnectionGene::new(h2, h1, 0.5, 1));
        assert!(organism.has_cycle());
    }

    #[test]
    fn has_cycle_is_false_for_a_feed_forward_genome() {
        let config = organism_config();
        let mut rng = StdRng::seed_from_u64(22);
        let mut organism = Organism::new(Uuid::new_v4(), &config, &mut rng);
        organism.add_random_connection(&mut rng, &mut InnovationRegistry::new());
        assert!(!organism.has_cycle());
    }

    #[test]
    fn validate_rejects_a_connection_to_a_missing_node() {
        let config = organism_config();
        let mut rng = StdRng::seed_from_u64(23);
        let mut organism = Organism::new(Uuid::new_v4(), &config, &mut rng);
        assert!(organism.validate().is_ok());

        organism.genome.push(ConnectionGene::new(0, 999, 0.3, 0));
        let err = organism.validate().unwrap_err();
        assert!(matches!(err, NeatError::InvalidConnection));
    }
}
