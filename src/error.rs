//! Error types for the simulator and blob field

use thiserror::Error;

use crate::sim::ParticleId;

/// Errors surfaced by the engine
#[derive(Error, Debug)]
pub enum SimError {
    /// A force produced a NaN/infinite acceleration (coincident participants,
    /// zero push radius). This is a configuration bug, not a recoverable state.
    #[error("non-finite acceleration on particle {particle} during {stage} (degenerate geometry)")]
    NonFiniteAcceleration {
        particle: ParticleId,
        stage: &'static str,
    },

    /// A merge/split/participant call named a blob key that does not exist
    #[error("unknown glob key: {0}")]
    UnknownGlob(String),

    /// Empty, composite ("A+B") or already registered atomic key
    #[error("invalid glob key: {0:?}")]
    InvalidKey(String),

    /// The key exists but is currently part of a transition
    #[error("glob {0} is mid-transition")]
    NotSteady(String),

    /// A split subset that is empty or covers every member
    #[error("invalid split of {key}: subset {subset:?}")]
    InvalidSplit { key: String, subset: Vec<String> },

    /// Particle id not owned by the addressed simulator/field
    #[error("unknown particle: {0}")]
    UnknownParticle(ParticleId),

    /// Invalid settings JSON
    #[error("invalid settings: {0}")]
    Config(#[from] serde_json::Error),
}
