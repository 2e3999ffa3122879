//! Globfield - constrained particle simulation with metaball merge/split rendering
//!
//! Core modules:
//! - `sim`: Particle simulator (containment, repulsion, friction, pulls) and the frame `Stage`
//! - `blob`: Named circular regions, merge/split transitions, ownership hand-off
//! - `renderer`: Drawing surface abstraction, metaball path geometry, command recorder
//! - `settings`: Data-driven tunables

pub mod blob;
pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use blob::{BlobField, BlobPoint, Commit, Regime};
pub use error::SimError;
pub use renderer::{Color, Recorder, Surface};
pub use settings::{MotionPreset, Settings};
pub use sim::{ParticleSimulator, Stage};

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    /// Default exponent of the radius growth law (2 = area conserving)
    pub const RADIUS_GROWTH_EXPONENT: f32 = 2.0;
    /// Separator used when composing blob keys ("A+B")
    pub const KEY_SEPARATOR: char = '+';
    /// Initial offset between the two motion particles of a split
    pub const SPLIT_SEED_OFFSET: f32 = 1.0;

    /// Participant simulator defaults
    pub const FRICTION: f32 = 0.1;
    pub const FRICTION_VELOCITY: f32 = 0.05;
    pub const MAX_VELOCITY: f32 = 20.0;
    pub const OBJECT_PUSH: f32 = 0.5;
    pub const DEFAULT_CHILD_RADIUS: f32 = 30.0;
    pub const BOUNDARY_FORCE: f32 = 4.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Linear interpolation, exact at both ends (`lerp(a, b, 0) == a`, `lerp(a, b, 1) == b`)
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_lerp_is_exact_at_ends() {
        assert_eq!(lerp(141.42136, 100.0, 0.0), 141.42136);
        assert_eq!(lerp(141.42136, 100.0, 1.0), 100.0);
        assert_eq!(lerp(0.0, 100.0, 0.5), 50.0);
    }

    #[test]
    fn test_polar_to_cartesian() {
        let p = polar_to_cartesian(2.0, FRAC_PI_2);
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 2.0).abs() < 1e-6);
    }
}
