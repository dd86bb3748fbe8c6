//! A NEAT (NeuroEvolution of Augmenting Topologies) evolutionary core:
//! genomes, innovation tracking, feed-forward evaluation, speciation and
//! the population/evolution loop.

pub mod activation;
pub mod config;
pub mod connection;
pub mod error;
pub mod genome;
pub mod innovation;
pub mod node;
pub mod phenotype;
pub mod population;
pub mod species;
pub mod util;

pub use activation::ActivationFunction;
pub use config::{OrganismConfig, PopulationConfig, SpeciationConfig};
pub use connection::ConnectionGene;
pub use error::{ConfigLoadError, NeatError};
pub use genome::Organism;
pub use innovation::{InnovationRegistry, InnovationStore};
pub use node::{NodeGene, NodeKind};
pub use phenotype::Phenotype;
pub use population::Population;
pub use species::Species;
pub use util::NeatRng;
