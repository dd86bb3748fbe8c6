use rand::Rng;
use rayon::prelude::*;
use uuid::Uuid;

use crate::config::PopulationConfig;
use crate::error::NeatError;
use crate::genome::Organism;
use crate::innovation::{InnovationRegistry, InnovationStore, MemoryStore};
use crate::species::Species;
use crate::util::{chance, random_exclude, NeatRng};

/// spec.md §3/§4.F: owns the species list and the innovation registry
/// handle exclusively (spec.md §5). Grounded on `neat.rs::Neat`'s top-level
/// shape (config + population_size + innovation_record + species + champion)
/// and, for the exact generation control flow, on
/// `examples/original_source/genetics/population.py::evolve`.
pub struct Population {
    pub name: String,
    pub carrying_capacity: usize,
    pub species: Vec<Species>,
    pub compatibility_threshold: f64,
    pub total_adjusted_fitness: f64,
    config: PopulationConfig,
    registry: InnovationRegistry,
    rng: NeatRng,
    generation: u64,
}

impl Population {
    /// `initial_threshold` is not part of `PopulationConfig` (spec.md §6
    /// never lists it — only `threshold_step` and `target_species`); S4 in
    /// spec.md §8 starts a fresh population at threshold 0, so that is the
    /// suggested default for callers that don't have a reason to pick
    /// another starting point.
    pub fn new(config: PopulationConfig, initial_threshold: f64, rng: NeatRng) -> Self {
        Self::with_store(config, initial_threshold, rng, &MemoryStore)
    }

    /// spec.md §6: "The store is cleared on population creation." A
    /// population never resumes a prior registry implicitly; callers that
    /// want durable innovation numbers across process restarts call
    /// `registry().load_from`/`save_to` explicitly around this.
    pub fn with_store(
        config: PopulationConfig,
        initial_threshold: f64,
        mut rng: NeatRng,
        store: &dyn InnovationStore,
    ) -> Self {
        let registry = InnovationRegistry::new();
        let _ = registry.save_to(store);

        let mut species = Species::new();
        for _ in 0..config.carrying_capacity {
            let organism = Organism::new(species.id, &config.organism, &mut rng.0);
            species.add(organism);
        }

        Self {
            name: config.name.clone(),
            carrying_capacity: config.carrying_capacity,
            species: vec![species],
            compatibility_threshold: initial_threshold,
            total_adjusted_fitness: 0.0,
            config,
            registry,
            rng,
            generation: 0,
        }
    }

    pub fn registry(&self) -> &InnovationRegistry {
        &self.registry
    }

    pub fn organism_count(&self) -> usize {
        self.species.iter().map(Species::len).sum()
    }

    /// spec.md §4.F `evolve`, one generation, serial fitness evaluation.
    pub fn evolve(&mut self, fitness_fn: impl Fn(&Organism) -> f64) -> Result<(), NeatError> {
        for species in &mut self.species {
            for organism in &mut species.organisms {
                organism.fitness = fitness_fn(organism);
            }
        }
        self.evolve_after_fitness(&fitness_fn)
    }

    /// spec.md §5's permitted parallel-fitness extension: evaluation runs
    /// through rayon since it mutates neither the registry nor any other
    /// shared state; steps 2-5 remain serial.
    pub fn evolve_parallel(
        &mut self,
        fitness_fn: impl Fn(&Organism) -> f64 + Sync,
    ) -> Result<(), NeatError> {
        for species in &mut self.species {
            let fitnesses: Vec<f64> = species.organisms.par_iter().map(&fitness_fn).collect();
            for (organism, fit) in species.organisms.iter_mut().zip(fitnesses) {
                organism.fitness = fit;
            }
        }
        self.evolve_after_fitness(&fitness_fn)
    }

    fn evolve_after_fitness(&mut self, fitness_fn: &impl Fn(&Organism) -> f64) -> Result<(), NeatError> {
        self.generation += 1;
        let span = tracing::info_span!("generation", gen = self.generation);
        let _enter = span.enter();

        // Step 2: adapt threshold, using the species count this generation
        // was entered with (the previous generation's re-speciation result,
        // or the single initial species).
        let species_count = self.species.len();
        let target = self.config.speciation.target_species;
        if species_count > target {
            self.compatibility_threshold += self.config.speciation.threshold_step;
        } else if species_count < target {
            self.compatibility_threshold -= self.config.speciation.threshold_step;
        }
        // spec.md §9 Design Notes: the step is unbounded below in the
        // source; clamped at 0 here for robustness.
        self.compatibility_threshold = self.compatibility_threshold.max(0.0);
        tracing::debug!(
            threshold = self.compatibility_threshold,
            species_count,
            target,
            "adapted compatibility threshold"
        );

        // Step 3: re-speciate the whole population from scratch.
        let mut pool: Vec<Organism> = self.species.drain(..).flat_map(|s| s.organisms).collect();
        let mut new_species: Vec<Species> = Vec::new();
        while !pool.is_empty() {
            let idx = self.rng.0.random_range(0..pool.len());
            let representative = pool.remove(idx);
            let mut species = Species::new();
            let distance_reference = representative.clone();
            species.add(representative);

            let mut i = 0;
            while i < pool.len() {
                let distance = distance_reference.compatibility(&pool[i], &self.config.speciation);
                if distance < self.compatibility_threshold {
                    let mut organism = pool.remove(i);
                    organism.species_id = species.id;
                    species.add(organism);
                } else {
                    i += 1;
                }
            }
            new_species.push(species);
        }
        self.species = new_species;
        tracing::debug!(species_count = self.species.len(), "re-speciated population");

        // Step 4: fitness-share.
        self.total_adjusted_fitness = 0.0;
        for species in &mut self.species {
            species.apply_adjusted_fitness();
            self.total_adjusted_fitness += species.total_adjusted_fitness;
        }

        // Step 5: tournament selection, crossover, mutation.
        for species in &mut self.species {
            let quota = species
                .allowed_offspring(self.total_adjusted_fitness, self.carrying_capacity)?
                .max(0) as usize;

            let mut new_organisms = Vec::with_capacity(quota);

            if species.len() < 2 {
                if let Some(only) = species.organisms.first().cloned() {
                    for _ in 0..quota {
                        let mut child = only.clone();
                        child.id = Uuid::new_v4();
                        if chance(&mut self.rng.0, self.config.organism.mutation_chance) {
                            child.mutate(&mut self.rng.0, &mut self.registry, &self.config.organism);
                        }
                        new_organisms.push(child);
                    }
                }
            } else {
                let mut candidates = Vec::with_capacity(2 * quota);
                for _ in 0..2 * quota {
                    let p1_idx = self.rng.0.random_range(0..species.len());
                    let p2_idx = random_exclude(
                        &mut self.rng.0,
                        0,
                        species.len() as i64 - 1,
                        &[p1_idx as i64],
                    )? as usize;

                    let winner = if species.get(p1_idx).fitness > species.get(p2_idx).fitness {
                        species.get(p1_idx).clone()
                    } else {
                        species.get(p2_idx).clone()
                    };
                    candidates.push(winner);
                }

                let mid = candidates.len() / 2;
                let (first_half, second_half) = candidates.split_at(mid);
                for (p1, p2) in first_half.iter().zip(second_half.iter()) {
                    let mut child =
                        species.crossover(p1, p2, &self.config.organism, &mut self.rng.0, &mut self.registry)?;
                    child.fitness = fitness_fn(&child);
                    new_organisms.push(child);
                }
            }

            species.organisms = new_organisms;
        }

        let before = self.species.len();
        self.species.retain(|s| !s.is_empty());
        if self.species.len() != before {
            tracing::debug!(dropped = before - self.species.len(), "dropped empty species");
        }

        Ok(())
    }

    /// spec.md §4.F `best`.
    pub fn best(&self) -> Option<&Organism> {
        self.species
            .iter()
            .flat_map(|s| s.organisms.iter())
            .max_by(|a, b| a.fitness.partial_cmp(&b.fitness).unwrap_or(std::cmp::Ordering::Equal))
    }
}
