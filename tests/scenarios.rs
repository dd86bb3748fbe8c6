use neat_evo_core::{NeatRng, Population, PopulationConfig, Species};

/// S4 — threshold adaptation: target=2, step=1, starting threshold 0; a
/// generation producing 5 species raises the threshold to 1, and a
/// following generation producing 1 species lowers it back to 0.
#[test]
fn s4_threshold_adapts_toward_target_species_count() {
    let mut config = PopulationConfig::defaults("s4", 3, 1);
    config.carrying_capacity = 40;
    config.speciation.target_species = 2;
    config.speciation.threshold_step = 1.0;

    let mut population = Population::new(config, 0.0, NeatRng::from_seed(99));

    let organisms: Vec<_> = population.species.drain(..).flat_map(|s| s.organisms).collect();
    let mut five_species = Vec::new();
    for chunk in organisms.chunks(organisms.len() / 5) {
        let mut species = Species::new();
        for organism in chunk {
            species.add(organism.clone());
        }
        five_species.push(species);
    }
    five_species.truncate(5);
    population.species = five_species;
    assert_eq!(population.species.len(), 5);

    population.evolve(|_| 1.0).expect("uniform fitness is non-degenerate");
    assert_eq!(population.compatibility_threshold, 1.0);

    let organisms: Vec<_> = population.species.drain(..).flat_map(|s| s.organisms).collect();
    let mut one_species = Species::new();
    for organism in organisms {
        one_species.add(organism);
    }
    population.species = vec![one_species];
    assert_eq!(population.species.len(), 1);

    population.evolve(|_| 1.0).expect("uniform fitness is non-degenerate");
    assert_eq!(population.compatibility_threshold, 0.0);
}

/// End-to-end smoke test: a population runs several generations against a
/// simple fitness function without panicking or producing a degenerate
/// state, and `best` always names an organism actually present somewhere
/// in the population.
#[test]
fn population_runs_several_generations_end_to_end() {
    let mut config = PopulationConfig::defaults("smoke", 2, 1);
    config.carrying_capacity = 30;
    let mut population = Population::new(config, 0.0, NeatRng::from_seed(7));

    for _ in 0..5 {
        population
            .evolve(|organism| 1.0 + organism.genome.len() as f64 * 0.01)
            .expect("fitness function never returns all zero");
    }

    let best = population.best().expect("population is never empty");
    let found = population
        .species
        .iter()
        .flat_map(|s| s.organisms.iter())
        .any(|o| o.id == best.id);
    assert!(found);
}
