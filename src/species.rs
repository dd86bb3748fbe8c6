use rand::Rng;
use uuid::Uuid;

use crate::config::OrganismConfig;
use crate::error::NeatError;
use crate::genome::Organism;
use crate::innovation::InnovationRegistry;
use crate::util::chance;

/// spec.md §3/§4.E. Grounded on `specie.rs`'s shape (age, representative,
/// per-species fitness bookkeeping) and on
/// `examples/original_source/genetics/species.py` for the exact
/// `apply_adjusted_fitness`/`allowed_offspring`/`crossover` formulas.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Species {
    pub id: Uuid,
    pub organisms: Vec<Organism>,
    pub average_fitness: f64,
    pub total_fitness: f64,
    pub total_adjusted_fitness: f64,
    pub average_adjusted_fitness: f64,
}

impl Species {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            organisms: Vec::new(),
            average_fitness: 0.0,
            total_fitness: 0.0,
            total_adjusted_fitness: 0.0,
            average_adjusted_fitness: 0.0,
        }
    }

    pub fn add(&mut self, organism: Organism) {
        self.organisms.push(organism);
    }

    pub fn get(&self, index: usize) -> &Organism {
        &self.organisms[index]
    }

    pub fn remove(&mut self, index: usize) -> Organism {
        self.organisms.remove(index)
    }

    pub fn len(&self) -> usize {
        self.organisms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organisms.is_empty()
    }

    /// spec.md §4.E `applyAdjustedFitness`.
    pub fn apply_adjusted_fitness(&mut self) {
        let n = self.organisms.len();
        if n == 0 {
            self.average_fitness = 0.0;
            self.average_adjusted_fitness = 0.0;
            self.total_fitness = 0.0;
            self.total_adjusted_fitness = 0.0;
            return;
        }

        let mut total_fitness = 0.0;
        let mut total_adjusted_fitness = 0.0;
        for organism in &mut self.organisms {
            organism.adjusted_fitness = organism.fitness / n as f64;
            total_fitness += organism.fitness;
            total_adjusted_fitness += organism.adjusted_fitness;
        }

        self.average_fitness = total_fitness / n as f64;
        self.average_adjusted_fitness = total_adjusted_fitness / n as f64;
        self.total_fitness = total_fitness;
        self.total_adjusted_fitness = total_adjusted_fitness;
    }

    /// spec.md §4.E `allowedOffspring`.
    pub fn allowed_offspring(
        &self,
        pop_total_adjusted_fitness: f64,
        population_size: usize,
    ) -> Result<i64, NeatError> {
        if pop_total_adjusted_fitness == 0.0 {
            return Err(NeatError::DegenerateFitness);
        }
        let proportion = self.total_adjusted_fitness / pop_total_adjusted_fitness;
        Ok((proportion * population_size as f64).round() as i64)
    }

    /// spec.md §4.E `crossover`. `gene_distribution` picks the child's node
    /// list from whichever parent has more nodes independently of which
    /// parent's genome contributed the connections above, so a shared/
    /// disjoint/excess connection can in principle reference a node id
    /// absent from that node list; `validate` catches that before the child
    /// is handed back rather than letting `Phenotype` silently drop the
    /// dangling endpoint later.
    pub fn crossover(
        &self,
        p1: &Organism,
        p2: &Organism,
        config: &OrganismConfig,
        rng: &mut impl Rng,
        registry: &mut InnovationRegistry,
    ) -> Result<Organism, NeatError> {
        let (nodes, shared, disjoint, excess) = p1.gene_distribution(p2);

        let mut child_genome = disjoint;
        child_genome.extend(excess);

        for (c1, c2) in shared {
            if chance(rng, 0.5) {
                child_genome.push(c1);
            } else {
                child_genome.push(c2);
            }
        }

        let mut child = Organism::from_parts(self.id, nodes, child_genome);
        child.validate()?;

        if chance(rng, config.mutation_chance) {
            child.mutate(rng, registry, config);
        }

        Ok(child)
    }
}

impl Default for Species {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Species ({}): organisms ({}) | avg fit: {} | adj sum: {}",
            self.id,
            self.organisms.len(),
            self.average_fitness,
            self.total_adjusted_fitness
        )
    }
}
