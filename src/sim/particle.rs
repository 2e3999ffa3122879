//! Simulated point masses and their relationships

use std::collections::HashSet;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::shape::{ParticipantShape, Side};

/// Stable particle identifier, unique within a field/stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticleId(pub u32);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Spring-like attraction/repulsion toward another participant
///
/// Attracts while `distance > max_dist`, repels while `distance < min_dist`,
/// rests in between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PullRelationship {
    pub target: ParticleId,
    pub min_dist: f32,
    pub max_dist: f32,
    pub mult: f32,
}

impl PullRelationship {
    /// Pull that keeps closing the gap until the two coincide
    pub fn attract(target: ParticleId, mult: f32) -> Self {
        Self {
            target,
            min_dist: 0.0,
            max_dist: 0.0,
            mult,
        }
    }

    /// Pull that only pushes apart, up to `min_dist`
    pub fn repel(target: ParticleId, min_dist: f32, mult: f32) -> Self {
        Self {
            target,
            min_dist,
            max_dist: f32::INFINITY,
            mult,
        }
    }
}

/// Anything diagram-like that can stand in as a participant (graph nodes, word chips)
pub trait NodeLike {
    fn position(&self) -> Vec2;
    fn label(&self) -> &str;
    fn radius(&self) -> f32;
}

/// A participant of a [`ParticleSimulator`](super::ParticleSimulator)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Personal-space radius used by containment and circle repulsion
    pub push_radius: f32,
    pub shape: ParticipantShape,
    /// Participants this one never repels
    pub ignore: HashSet<ParticleId>,
    pub pulls: Vec<PullRelationship>,
    /// Explicit sub-circle membership while a double-circle boundary is active
    pub side: Option<Side>,
    /// Atomic blob key this participant belongs to
    pub group: Option<String>,
    /// Display label (node label, word)
    pub label: Option<String>,
}

impl Particle {
    pub fn new(id: ParticleId, position: Vec2, push_radius: f32) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            push_radius,
            shape: ParticipantShape::Circle,
            ignore: HashSet::new(),
            pulls: Vec::new(),
            side: None,
            group: None,
            label: None,
        }
    }

    /// Rectangular participant (e.g. a text chip); push radius is the half-diagonal
    pub fn rectangle(id: ParticleId, position: Vec2, half_extents: Vec2) -> Self {
        let mut particle = Self::new(id, position, half_extents.length());
        particle.shape = ParticipantShape::Rectangle { half_extents };
        particle
    }

    /// Participant mirroring a diagram node
    pub fn from_node(id: ParticleId, node: &impl NodeLike) -> Self {
        let mut particle = Self::new(id, node.position(), node.radius());
        particle.label = Some(node.label().to_string());
        particle
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Mutually exclude two participants from repulsion
    pub fn ignore_each_other(a: &mut Particle, b: &mut Particle) {
        a.ignore.insert(b.id);
        b.ignore.insert(a.id);
    }

    /// Whether the pair is exempt from repulsion (either side may hold the exemption)
    pub fn ignores(&self, other: &Particle) -> bool {
        self.ignore.contains(&other.id) || other.ignore.contains(&self.id)
    }
}

/// Position message emitted after integration, applied by the owner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Moved {
    pub id: ParticleId,
    pub position: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Chip {
        pos: Vec2,
        word: String,
    }

    impl NodeLike for Chip {
        fn position(&self) -> Vec2 {
            self.pos
        }
        fn label(&self) -> &str {
            &self.word
        }
        fn radius(&self) -> f32 {
            24.0
        }
    }

    #[test]
    fn test_from_node() {
        let chip = Chip {
            pos: Vec2::new(3.0, 4.0),
            word: "abba".into(),
        };
        let p = Particle::from_node(ParticleId(7), &chip);
        assert_eq!(p.position, Vec2::new(3.0, 4.0));
        assert_eq!(p.push_radius, 24.0);
        assert_eq!(p.label.as_deref(), Some("abba"));
    }

    #[test]
    fn test_ignore_is_symmetric() {
        let mut a = Particle::new(ParticleId(1), Vec2::ZERO, 10.0);
        let mut b = Particle::new(ParticleId(2), Vec2::X, 10.0);
        let c = Particle::new(ParticleId(3), Vec2::Y, 10.0);
        Particle::ignore_each_other(&mut a, &mut b);
        assert!(a.ignores(&b));
        assert!(b.ignores(&a));
        assert!(!a.ignores(&c));
    }

    #[test]
    fn test_rectangle_push_radius() {
        let p = Particle::rectangle(ParticleId(1), Vec2::ZERO, Vec2::new(3.0, 4.0));
        assert_eq!(p.push_radius, 5.0);
    }
}
