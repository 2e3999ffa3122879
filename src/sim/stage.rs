//! Frame driver
//!
//! The stage is the explicit simulation context handed to everything that
//! ticks: it owns the global time scale and the ordered attach list. A
//! simulator is paused by detaching it, never by an internal flag.

use serde::Serialize;

use super::particle::Moved;
use super::simulator::{ParticleSimulator, SimulatorId};
use crate::blob::{BlobField, Commit};
use crate::error::SimError;
use crate::renderer::Surface;

/// What one frame produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    /// New positions of blob participants (not blob centers)
    pub moved: Vec<Moved>,
    /// Transitions committed during the draw pass
    pub commits: Vec<Commit>,
}

#[derive(Debug, Clone)]
pub struct Stage {
    time_scale: f32,
    attached: Vec<SimulatorId>,
    frame: u64,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    pub fn new() -> Self {
        Self {
            time_scale: 1.0,
            attached: Vec::new(),
            frame: 0,
        }
    }

    /// Global multiplier on per-tick displacement (0 freezes positions)
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Append to the attach order (no-op if already attached)
    pub fn attach(&mut self, id: SimulatorId) {
        if !self.attached.contains(&id) {
            self.attached.push(id);
        }
    }

    pub fn detach(&mut self, id: SimulatorId) {
        self.attached.retain(|a| *a != id);
    }

    pub fn is_attached(&self, id: SimulatorId) -> bool {
        self.attached.contains(&id)
    }

    /// Attached simulators in attach order
    pub fn attached(&self) -> &[SimulatorId] {
        &self.attached
    }

    /// Swap predecessors for their successors in the attach order
    ///
    /// Every `old` id is detached. The `new` ids take the slot of the first
    /// attached predecessor; if none was attached, neither are they.
    pub fn hand_off(&mut self, old: &[SimulatorId], new: &[SimulatorId]) {
        let slot = self.attached.iter().position(|a| old.contains(a));
        self.attached.retain(|a| !old.contains(a));
        if let Some(index) = slot {
            let fresh: Vec<SimulatorId> =
                new.iter().copied().filter(|n| !self.attached.contains(n)).collect();
            self.attached.splice(index..index, fresh);
            log::trace!("Hand-off {old:?} -> {new:?}");
        }
    }

    /// Tick a standalone simulator if it is attached
    pub fn tick(&self, sim: &mut ParticleSimulator) -> Result<Option<Vec<Moved>>, SimError> {
        if !self.is_attached(sim.id()) {
            return Ok(None);
        }
        sim.physics_tick(self.time_scale).map(Some)
    }

    /// One full frame: physics for every attached simulator, then draw
    pub fn frame(
        &mut self,
        field: &mut BlobField,
        surface: &mut dyn Surface,
    ) -> Result<FrameReport, SimError> {
        let moved = field.tick_physics(self).inspect_err(|e| {
            log::error!("Frame {} aborted: {}", self.frame, e);
        })?;
        let commits = field.draw(self, surface)?;
        self.frame += 1;
        Ok(FrameReport {
            frame: self.frame,
            moved,
            commits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_order_and_hand_off() {
        let mut stage = Stage::new();
        stage.attach(SimulatorId(3));
        stage.attach(SimulatorId(1));
        stage.attach(SimulatorId(3));
        assert_eq!(stage.attached(), &[SimulatorId(3), SimulatorId(1)]);

        stage.hand_off(&[SimulatorId(3)], &[SimulatorId(7)]);
        assert_eq!(stage.attached(), &[SimulatorId(7), SimulatorId(1)]);

        // Two predecessors collapse into one successor at the earlier slot
        stage.attach(SimulatorId(4));
        stage.hand_off(&[SimulatorId(1), SimulatorId(7)], &[SimulatorId(8)]);
        assert_eq!(stage.attached(), &[SimulatorId(8), SimulatorId(4)]);

        // One predecessor fans out
        stage.hand_off(&[SimulatorId(8)], &[SimulatorId(9), SimulatorId(10)]);
        assert_eq!(
            stage.attached(),
            &[SimulatorId(9), SimulatorId(10), SimulatorId(4)]
        );

        // A detached predecessor does not attach its successor
        stage.hand_off(&[SimulatorId(42)], &[SimulatorId(43)]);
        assert!(!stage.is_attached(SimulatorId(43)));
    }

    #[test]
    fn test_time_scale_never_negative() {
        let mut stage = Stage::new();
        stage.set_time_scale(-2.0);
        assert_eq!(stage.time_scale(), 0.0);
        stage.set_time_scale(0.25);
        assert_eq!(stage.time_scale(), 0.25);
    }

    #[test]
    fn test_detached_simulator_not_ticked() {
        use crate::settings::SimTunables;
        use crate::sim::{Boundary, ParticleId};
        use glam::Vec2;

        let mut stage = Stage::new();
        let mut sim = ParticleSimulator::new(SimulatorId(1), Boundary::Unbounded, SimTunables::default());
        sim.spawn(ParticleId(1), Vec2::ZERO).velocity = Vec2::new(1.0, 0.0);
        assert!(stage.tick(&mut sim).unwrap().is_none());
        sim.start(&mut stage);
        let moved = stage.tick(&mut sim).unwrap().unwrap();
        assert!(moved[0].position.x > 0.0);
    }
}
