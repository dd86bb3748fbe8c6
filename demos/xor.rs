use neat_evo_core::{NeatRng, Organism, Phenotype, Population, PopulationConfig};

const CASES: [([f64; 2], f64); 4] = [
    ([0.0, 0.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
];

fn fitness(organism: &Organism) -> f64 {
    let mut phenotype = Phenotype::new(2, organism.nodes.clone(), &organism.genome);
    let mut error = 0.0;
    for (inputs, expected) in CASES {
        let outputs = phenotype.propagate(&inputs).expect("fixed input shape");
        error += (outputs[0] - expected).powi(2);
    }
    4.0 - error
}

fn main() {
    tracing_subscriber::fmt::init();

    let config = PopulationConfig::defaults("xor", 2, 1);
    let mut population = Population::new(config, 0.0, NeatRng::from_entropy());

    for generation in 0..100 {
        population.evolve(fitness).expect("non-degenerate fitness");
        let best = population.best().expect("population is never empty");
        tracing::info!(generation, fitness = best.fitness, "generation complete");
        if best.fitness >= 3.9 {
            println!("solved XOR in {generation} generations with fitness {}", best.fitness);
            return;
        }
    }

    let best = population.best().expect("population is never empty");
    println!("stopped after 100 generations, best fitness {}", best.fitness);
}
