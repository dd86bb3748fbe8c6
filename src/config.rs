use serde::{Deserialize, Serialize};

use crate::error::NeatError;

/// spec.md §6. Field names and nesting follow `config.py` /
/// `config/configuration.py` from the original Python implementation
/// (`organism`/`speciation` sub-records); default values are grounded on
/// the teacher's `context.rs::NeatConfig` and `neat.rs::NeatConfig`, whose
/// flat fields this record's two nested structs replace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    pub name: String,
    pub carrying_capacity: usize,
    pub speciation: SpeciationConfig,
    pub organism: OrganismConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciationConfig {
    pub target_species: usize,
    pub threshold_step: f64,
    pub excess_factor: f64,
    pub disjoint_factor: f64,
    pub weight_factor: f64,
    /// spec.md §9 "Shared-pair weight averaging": the source includes
    /// disabled connections when averaging shared-pair weight
    /// differences; exposed here as the documented config toggle the
    /// flagged TODO asks for. Defaults to `true` (source behavior).
    #[serde(default = "default_true")]
    pub include_disabled_in_weight_average: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganismConfig {
    pub inputs: usize,
    pub outputs: usize,
    pub mutation_chance: f64,
    pub structural_mutation_chance: f64,
    pub structural_connection_mutation_chance: f64,
    pub structural_connection_addition_chance: f64,
    pub structural_node_addition_chance: f64,
    pub activation_function_mutation_chance: f64,
}

impl PopulationConfig {
    /// Reasonable defaults matching the original's `config.py`.
    pub fn defaults(name: impl Into<String>, inputs: usize, outputs: usize) -> Self {
        Self {
            name: name.into(),
            carrying_capacity: 150,
            speciation: SpeciationConfig {
                target_species: 7,
                threshold_step: 1.0,
                excess_factor: 1.0,
                disjoint_factor: 1.0,
                weight_factor: 1.0,
                include_disabled_in_weight_average: true,
            },
            organism: OrganismConfig {
                inputs,
                outputs,
                mutation_chance: 0.2,
                structural_mutation_chance: 0.3,
                structural_connection_mutation_chance: 0.7,
                structural_connection_addition_chance: 0.7,
                structural_node_addition_chance: 0.7,
                activation_function_mutation_chance: 0.4,
            },
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, NeatError> {
        toml::from_str(contents).map_err(NeatError::Config)
    }

    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, NeatError> {
        let contents = std::fs::read_to_string(path).map_err(NeatError::Store)?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_roundtrip_through_toml() {
        let config = PopulationConfig::defaults("pop-1", 3, 1);
        let serialized = toml::to_string(&config).unwrap();
        let parsed = PopulationConfig::from_toml_str(&serialized).unwrap();
        assert_eq!(parsed.name, "pop-1");
        assert_eq!(parsed.organism.inputs, 3);
        assert_eq!(parsed.speciation.target_species, 7);
    }
}
