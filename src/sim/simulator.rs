//! Constrained particle simulator
//!
//! One tick: containment, pairwise repulsion, friction, pulls, then integration.
//! Forces are evaluated against tick-start positions so iteration order does
//! not bias the result.

use std::collections::HashMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::forces;
use super::particle::{Moved, Particle, ParticleId, PullRelationship};
use super::shape::Boundary;
use super::stage::Stage;
use crate::error::SimError;
use crate::settings::SimTunables;

/// Identifier used by the [`Stage`] attach list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimulatorId(pub u32);

impl fmt::Display for SimulatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sim{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleSimulator {
    id: SimulatorId,
    participants: Vec<Particle>,
    pub boundary: Boundary,
    pub tunables: SimTunables,
}

/// Fail the tick on NaN/infinite accelerations
#[inline]
fn checked(accel: Vec2, particle: ParticleId, stage: &'static str) -> Result<Vec2, SimError> {
    if accel.is_finite() {
        Ok(accel)
    } else {
        Err(SimError::NonFiniteAcceleration { particle, stage })
    }
}

impl ParticleSimulator {
    pub fn new(id: SimulatorId, boundary: Boundary, tunables: SimTunables) -> Self {
        Self {
            id,
            participants: Vec::new(),
            boundary,
            tunables,
        }
    }

    pub fn id(&self) -> SimulatorId {
        self.id
    }

    pub fn participants(&self) -> &[Particle] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.participants.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    /// Take ownership of a participant
    pub fn add_physics_child(&mut self, particle: Particle) {
        debug_assert!(!self.contains(particle.id), "particle added twice");
        self.participants.push(particle);
    }

    /// Create a participant with the default push radius
    pub fn spawn(&mut self, id: ParticleId, position: Vec2) -> &mut Particle {
        let radius = self.tunables.default_child_radius;
        self.participants.push(Particle::new(id, position, radius));
        let last = self.participants.len() - 1;
        &mut self.participants[last]
    }

    /// Release a participant back to the caller
    pub fn remove_physics_child(&mut self, id: ParticleId) -> Result<Particle, SimError> {
        let index = self
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or(SimError::UnknownParticle(id))?;
        Ok(self.participants.remove(index))
    }

    /// Hand every participant over (ownership migration)
    pub fn drain(&mut self) -> Vec<Particle> {
        std::mem::take(&mut self.participants)
    }

    /// Owner-side placement before the next tick (drag, snap)
    pub fn set_position(&mut self, id: ParticleId, position: Vec2) -> Result<(), SimError> {
        let particle = self.get_mut(id).ok_or(SimError::UnknownParticle(id))?;
        particle.position = position;
        Ok(())
    }

    pub fn add_pull(&mut self, from: ParticleId, pull: PullRelationship) -> Result<(), SimError> {
        let particle = self.get_mut(from).ok_or(SimError::UnknownParticle(from))?;
        particle.pulls.retain(|p| p.target != pull.target);
        particle.pulls.push(pull);
        Ok(())
    }

    /// Attach to the host tick
    pub fn start(&self, stage: &mut Stage) {
        stage.attach(self.id);
    }

    /// Detach from the host tick
    pub fn pause(&self, stage: &mut Stage) {
        stage.detach(self.id);
    }

    pub fn is_running(&self, stage: &Stage) -> bool {
        stage.is_attached(self.id)
    }

    /// Advance every participant by one tick
    ///
    /// Returns the new position of each participant for the owner to apply.
    pub fn physics_tick(&mut self, time_scale: f32) -> Result<Vec<Moved>, SimError> {
        let n = self.participants.len();
        let mut accel = vec![Vec2::ZERO; n];

        for (i, p) in self.participants.iter().enumerate() {
            accel[i] += checked(forces::containment(p, &self.boundary), p.id, "boundary")?;
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&self.participants[i], &self.participants[j]);
                if a.ignores(b) {
                    continue;
                }
                let (on_a, on_b) = forces::repulsion(a, b, self.tunables.object_push);
                accel[i] += checked(on_a, a.id, "repulsion")?;
                accel[j] += checked(on_b, b.id, "repulsion")?;
            }
        }

        let positions: HashMap<ParticleId, Vec2> =
            self.participants.iter().map(|p| (p.id, p.position)).collect();

        for (i, p) in self.participants.iter().enumerate() {
            let t = &self.tunables;
            accel[i] += checked(
                forces::friction(p.velocity, t.friction, t.friction_velocity),
                p.id,
                "friction",
            )?;
            for rel in &p.pulls {
                match positions.get(&rel.target) {
                    Some(&target) => {
                        accel[i] += checked(forces::pull(p.position, target, rel), p.id, "pull")?;
                    }
                    None => {
                        log::debug!("{}: pull target {} not owned here, skipped", self.id, rel.target);
                    }
                }
            }
        }

        let max_velocity = self.tunables.max_velocity;
        let mut moved = Vec::with_capacity(n);
        for (p, a) in self.participants.iter_mut().zip(accel) {
            p.acceleration = a;
            p.velocity = (p.velocity + a).clamp_length_max(max_velocity);
            p.position += p.velocity * time_scale;
            moved.push(Moved {
                id: p.id,
                position: p.position,
            });
        }

        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::shape::Circle;

    fn sim(boundary: Boundary) -> ParticleSimulator {
        ParticleSimulator::new(SimulatorId(1), boundary, SimTunables::default())
    }

    #[test]
    fn test_containment_moves_particle_inward() {
        let mut s = sim(Boundary::circle(Vec2::ZERO, 50.0, 4.0));
        s.add_physics_child(Particle::new(ParticleId(1), Vec2::new(25.0, 0.0), 30.0));
        let moved = s.physics_tick(1.0).unwrap();
        assert_eq!(moved.len(), 1);
        let p = s.get(ParticleId(1)).unwrap();
        assert!((p.acceleration.x - (-4.0 * 5.0 / 30.0)).abs() < 1e-5);
        assert!(moved[0].position.x < 25.0);
    }

    #[test]
    fn test_participants_settle_inside_circle() {
        let mut s = sim(Boundary::circle(Vec2::ZERO, 100.0, 4.0));
        s.spawn(ParticleId(1), Vec2::new(150.0, 0.0));
        s.spawn(ParticleId(2), Vec2::new(-10.0, 5.0));
        s.spawn(ParticleId(3), Vec2::new(0.0, -140.0));
        for _ in 0..400 {
            s.physics_tick(1.0).unwrap();
        }
        for p in s.participants() {
            assert!(p.position.length() + p.push_radius < 100.0 + 5.0, "{:?}", p.position);
        }
    }

    #[test]
    fn test_coincident_participants_abort_tick() {
        let mut s = sim(Boundary::Unbounded);
        s.spawn(ParticleId(1), Vec2::new(3.0, 3.0));
        s.spawn(ParticleId(2), Vec2::new(3.0, 3.0));
        let err = s.physics_tick(1.0).unwrap_err();
        assert!(matches!(
            err,
            SimError::NonFiniteAcceleration {
                stage: "repulsion",
                ..
            }
        ));
    }

    #[test]
    fn test_ignored_pair_may_coincide() {
        let mut s = sim(Boundary::Unbounded);
        let mut a = Particle::new(ParticleId(1), Vec2::ONE, 10.0);
        let mut b = Particle::new(ParticleId(2), Vec2::ONE, 10.0);
        Particle::ignore_each_other(&mut a, &mut b);
        s.add_physics_child(a);
        s.add_physics_child(b);
        assert!(s.physics_tick(1.0).is_ok());
    }

    #[test]
    fn test_velocity_clamped() {
        let mut s = sim(Boundary::Unbounded);
        s.tunables.max_velocity = 2.0;
        s.tunables.friction = 0.0;
        s.spawn(ParticleId(1), Vec2::ZERO).velocity = Vec2::new(50.0, 0.0);
        s.physics_tick(1.0).unwrap();
        let p = s.get(ParticleId(1)).unwrap();
        assert!((p.velocity.length() - 2.0).abs() < 1e-5);
        assert!((p.position.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_time_scale_scales_displacement() {
        let mut s = sim(Boundary::Unbounded);
        s.tunables.friction = 0.0;
        s.spawn(ParticleId(1), Vec2::ZERO).velocity = Vec2::new(4.0, 0.0);
        s.physics_tick(0.5).unwrap();
        assert!((s.get(ParticleId(1)).unwrap().position.x - 2.0).abs() < 1e-6);
        s.physics_tick(0.0).unwrap();
        assert!((s.get(ParticleId(1)).unwrap().position.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_pull_attracts_and_foreign_target_skipped() {
        let mut s = sim(Boundary::Unbounded);
        s.spawn(ParticleId(1), Vec2::ZERO);
        s.spawn(ParticleId(2), Vec2::new(200.0, 0.0));
        s.add_pull(ParticleId(1), PullRelationship::attract(ParticleId(2), 0.01))
            .unwrap();
        s.add_pull(ParticleId(1), PullRelationship::attract(ParticleId(99), 0.01))
            .unwrap();
        s.physics_tick(1.0).unwrap();
        assert!(s.get(ParticleId(1)).unwrap().position.x > 0.0);
        assert_eq!(s.get(ParticleId(2)).unwrap().position.x, 200.0);
    }

    #[test]
    fn test_remove_and_drain() {
        let mut s = sim(Boundary::Unbounded);
        s.spawn(ParticleId(1), Vec2::ZERO);
        s.spawn(ParticleId(2), Vec2::new(100.0, 0.0));
        let removed = s.remove_physics_child(ParticleId(1)).unwrap();
        assert_eq!(removed.id, ParticleId(1));
        assert!(matches!(
            s.remove_physics_child(ParticleId(1)),
            Err(SimError::UnknownParticle(_))
        ));
        let rest = s.drain();
        assert_eq!(rest.len(), 1);
        assert!(s.is_empty());
    }

    #[test]
    fn test_double_circle_keeps_sides_apart() {
        let first = Circle::new(Vec2::ZERO, 60.0);
        let second = Circle::new(Vec2::new(200.0, 0.0), 60.0);
        let mut s = sim(Boundary::double_circle(first, second, 4.0));
        let p = s.spawn(ParticleId(1), Vec2::new(100.0, 0.0));
        p.side = Some(crate::sim::Side::Second);
        for _ in 0..300 {
            s.physics_tick(1.0).unwrap();
        }
        let p = s.get(ParticleId(1)).unwrap();
        assert!(second.signed_distance(p.position) < 0.0);
    }

    #[test]
    fn test_start_pause_attach_list() {
        let mut stage = Stage::new();
        let s = sim(Boundary::Unbounded);
        assert!(!s.is_running(&stage));
        s.start(&mut stage);
        assert!(s.is_running(&stage));
        s.pause(&mut stage);
        assert!(!s.is_running(&stage));
    }
}
