//! Blob field module
//!
//! - `interp`: growth law, transition radii, encroachment, regime classification
//! - `point`: steady and transitional blob representations
//! - `field`: key registry, merge/split orchestration, participant hand-off

pub mod field;
pub mod interp;
pub mod point;

pub use field::{BlobField, Commit, compose_key};
pub use interp::Regime;
pub use point::{BlobPoint, SteadyBlob, TransitionBlob};
