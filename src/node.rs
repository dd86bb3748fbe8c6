use crate::activation::ActivationFunction;

/// spec.md §3: `kind` is immutable after construction; `INPUT` nodes are
/// always `Linear`. Grounded on the teacher's `NodeType` (which also
/// carries a `Bias` variant the spec does not — dropped, since spec.md's
/// node kinds are exactly `{INPUT, OUTPUT, HIDDEN}` and a bias node is not
/// named anywhere in spec.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    Input,
    Output,
    Hidden,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NodeGene {
    pub id: u32,
    pub kind: NodeKind,
    pub activation: ActivationFunction,
    #[serde(skip)]
    pub value: Option<f64>,
}

impl NodeGene {
    pub fn new(id: u32, kind: NodeKind, rng: &mut impl rand::Rng) -> Self {
        let activation = match kind {
            NodeKind::Input => ActivationFunction::Linear,
            _ => ActivationFunction::random(rng),
        };
        Self {
            id,
            kind,
            activation,
            value: None,
        }
    }

    pub fn with_activation(id: u32, kind: NodeKind, activation: ActivationFunction) -> Self {
        let activation = match kind {
            NodeKind::Input => ActivationFunction::Linear,
            _ => activation,
        };
        Self {
            id,
            kind,
            activation,
            value: None,
        }
    }

    /// Re-roll this node's activation function. Only meaningful for
    /// `Hidden`/`Output` nodes; `Input` stays `Linear` per spec.md §3.
    pub fn roll_activation(&mut self, rng: &mut impl rand::Rng) {
        if self.kind != NodeKind::Input {
            self.activation = ActivationFunction::random(rng);
        }
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn activate(&mut self, input: f64) -> f64 {
        let output = self.activation.apply(input);
        self.value = Some(output);
        output
    }
}

impl PartialEq for NodeGene {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl std::fmt::Display for NodeGene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "id: {} | kind: {:?} | f: {} | value: {:?}",
            self.id, self.kind, self.activation, self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn input_node_is_always_linear() {
        let mut rng = StdRng::seed_from_u64(1);
        let node = NodeGene::new(0, NodeKind::Input, &mut rng);
        assert_eq!(node.activation, ActivationFunction::Linear);
    }

    #[test]
    fn equality_is_by_id_only() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = NodeGene::new(3, NodeKind::Hidden, &mut rng);
        let b = NodeGene::with_activation(3, NodeKind::Output, ActivationFunction::Tanh);
        assert_eq!(a, b);
    }

    #[test]
    fn activate_sets_value() {
        let mut node = NodeGene::with_activation(0, NodeKind::Hidden, ActivationFunction::ReLU);
        assert!(node.value.is_none());
        let out = node.activate(-2.0);
        assert_eq!(out, 0.0);
        assert_eq!(node.value, Some(0.0));
    }
}
