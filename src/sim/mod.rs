//! Particle simulation module
//!
//! Pure and single-threaded:
//! - Forces evaluated against tick-start positions
//! - Owners learn new positions from returned `Moved` messages
//! - Degenerate geometry is a fatal `SimError`, never silently absorbed

pub mod forces;
pub mod particle;
pub mod shape;
pub mod simulator;
pub mod stage;

pub use particle::{Moved, NodeLike, Particle, ParticleId, PullRelationship};
pub use shape::{Boundary, Circle, DoubleCircle, ParticipantShape, Rect, Side};
pub use simulator::{ParticleSimulator, SimulatorId};
pub use stage::{FrameReport, Stage};
