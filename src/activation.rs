use std::fmt;

use rand::Rng;

/// Named scalar activation functions, spec.md §4.A.
///
/// `Input` nodes always construct `Linear` (spec.md §3); every other node
/// picks one of the four at random unless constructed with an explicit
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ActivationFunction {
    Linear,
    Sigmoid,
    Tanh,
    ReLU,
}

impl ActivationFunction {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            ActivationFunction::Linear => x,
            ActivationFunction::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::ReLU => x.max(0.0),
        }
    }

    /// Uniform random selection over the four variants.
    pub fn random(rng: &mut impl Rng) -> Self {
        match rng.random_range(0..4) {
            0 => ActivationFunction::Linear,
            1 => ActivationFunction::Sigmoid,
            2 => ActivationFunction::Tanh,
            _ => ActivationFunction::ReLU,
        }
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivationFunction::Linear => "Linear",
            ActivationFunction::Sigmoid => "Sigmoid",
            ActivationFunction::Tanh => "Tanh",
            ActivationFunction::ReLU => "ReLU",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_is_identity() {
        assert_eq!(ActivationFunction::Linear.apply(0.37), 0.37);
        assert_eq!(ActivationFunction::Linear.apply(-4.2), -4.2);
    }

    #[test]
    fn sigmoid_bounds() {
        let v = ActivationFunction::Sigmoid.apply(0.0);
        assert!((v - 0.5).abs() < 1e-12);
    }

    #[test]
    fn relu_clamps_negative() {
        assert_eq!(ActivationFunction::ReLU.apply(-3.0), 0.0);
        assert_eq!(ActivationFunction::ReLU.apply(3.0), 3.0);
    }

    #[test]
    fn display_matches_variant_name() {
        assert_eq!(ActivationFunction::Tanh.to_string(), "Tanh");
    }
}
