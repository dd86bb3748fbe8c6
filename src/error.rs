use thiserror::Error;

/// Errors raised by the evolutionary core.
///
/// Kinds and recovery semantics mirror spec.md §7 exactly: `ShapeMismatch`
/// and `InvalidConnection` fail fast at the call site, `DegenerateFitness`
/// fails a whole generation, `InvalidArgument` is a caller error from the
/// PRNG helpers. `EmptySpecies` is not represented here — per spec.md §7 it
/// is "drop the species", not a propagated failure, and is logged instead
/// (see `population.rs`).
#[derive(Debug, Error)]
pub enum NeatError {
    #[error("phenotype expected {expected} inputs, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("population-wide total adjusted fitness is zero")]
    DegenerateFitness,

    #[error("connection references a node id not present in the genome")]
    InvalidConnection,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to load innovation records")]
    Store(#[source] std::io::Error),

    #[error("failed to (de)serialize innovation records")]
    Serde(#[source] serde_json::Error),

    #[error("failed to parse configuration")]
    Config(#[source] toml::de::Error),
}

/// User-facing wrapper for configuration loading, the one place a human
/// (not the evolution loop) reads the error — matches how the teacher's
/// own dependency on `miette` is meant to surface a diagnostic at an edge,
/// not inside the hot loop.
#[derive(Debug, Error, miette::Diagnostic)]
#[error("could not load population configuration")]
#[diagnostic(code(neat_evo_core::config))]
pub struct ConfigLoadError {
    #[source]
    pub source: NeatError,
}
