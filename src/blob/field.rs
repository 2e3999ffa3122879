//! Named blobs, their transitions and the hand-off of participants
//!
//! Every blob owns one participant simulator. Blob centers are themselves
//! particles in a shared, unbounded motion simulator: merges pull two centers
//! together, splits push two centers apart, and the geometry is read back from
//! those positions each frame.

use std::collections::{BTreeMap, HashMap};

use glam::Vec2;
use serde::Serialize;

use super::interp::{self, Regime};
use super::point::{BlobPoint, SteadyBlob, TransitionBlob};
use crate::consts::{KEY_SEPARATOR, SPLIT_SEED_OFFSET};
use crate::error::SimError;
use crate::renderer::{Color, Surface};
use crate::settings::Settings;
use crate::sim::{
    Boundary, Moved, Particle, ParticleId, ParticleSimulator, PullRelationship, Side, SimulatorId,
    Stage,
};

/// A transition that completed during `draw`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Commit {
    Merged {
        key: String,
        from: [String; 2],
        radius: f32,
    },
    Split {
        from: String,
        into: [String; 2],
        radii: [f32; 2],
    },
}

pub fn compose_key<S: AsRef<str>>(members: &[S]) -> String {
    let mut key = String::new();
    for (i, m) in members.iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(m.as_ref());
    }
    key
}

pub struct BlobField {
    settings: Settings,
    points: BTreeMap<String, BlobPoint>,
    /// Carries every blob center
    motion: ParticleSimulator,
    /// Radius of each atomic key, the inputs of the growth law
    base_radii: HashMap<String, f32>,
    next_particle: u32,
    next_simulator: u32,
}

impl BlobField {
    /// Create the field and attach its motion simulator to `stage`
    pub fn new(settings: Settings, stage: &mut Stage) -> Self {
        let motion = ParticleSimulator::new(SimulatorId(0), Boundary::Unbounded, settings.motion);
        motion.start(stage);
        Self {
            settings,
            points: BTreeMap::new(),
            motion,
            base_radii: HashMap::new(),
            next_particle: 1,
            next_simulator: 1,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn allocate_particle_id(&mut self) -> ParticleId {
        let id = ParticleId(self.next_particle);
        self.next_particle += 1;
        id
    }

    fn new_simulator(&mut self, boundary: Boundary) -> ParticleSimulator {
        let id = SimulatorId(self.next_simulator);
        self.next_simulator += 1;
        ParticleSimulator::new(id, boundary, self.settings.simulator)
    }

    fn growth_radius<S: AsRef<str>>(&self, members: &[S]) -> f32 {
        let radii: Vec<f32> = members
            .iter()
            .map(|m| self.base_radii.get(m.as_ref()).copied().unwrap_or(0.0))
            .collect();
        interp::combined_radius(&radii, self.settings.blobs.radius_growth_exponent)
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn point(&self, key: &str) -> Option<&BlobPoint> {
        self.points.get(key)
    }

    pub fn steady(&self, key: &str) -> Option<&SteadyBlob> {
        self.points.get(key).and_then(BlobPoint::as_steady)
    }

    pub fn transition(&self, key: &str) -> Option<&TransitionBlob> {
        self.points.get(key).and_then(BlobPoint::as_transition)
    }

    /// Keys in draw order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.points.keys().map(String::as_str)
    }

    pub fn points(&self) -> impl Iterator<Item = (&str, &BlobPoint)> {
        self.points.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn motion(&self) -> &ParticleSimulator {
        &self.motion
    }

    pub fn motion_particle(&self, id: ParticleId) -> Option<&Particle> {
        self.motion.get(id)
    }

    pub fn participant(&self, id: ParticleId) -> Option<&Particle> {
        self.points.values().find_map(|p| p.simulator().get(id))
    }

    pub fn simulator_mut(&mut self, id: SimulatorId) -> Option<&mut ParticleSimulator> {
        if self.motion.id() == id {
            return Some(&mut self.motion);
        }
        self.points
            .values_mut()
            .map(BlobPoint::simulator_mut)
            .find(|s| s.id() == id)
    }

    fn key_of_member(&self, member: &str) -> Option<String> {
        self.points
            .iter()
            .find(|(_, p)| p.members().contains(&member))
            .map(|(k, _)| k.clone())
    }

    fn take_steady(&mut self, key: &str) -> Result<SteadyBlob, SimError> {
        match self.points.remove(key) {
            Some(BlobPoint::Steady(s)) => Ok(s),
            Some(other) => {
                self.points.insert(key.to_string(), other);
                Err(SimError::NotSteady(key.to_string()))
            }
            None => Err(SimError::UnknownGlob(key.to_string())),
        }
    }

    fn ensure_steady(&self, key: &str) -> Result<&SteadyBlob, SimError> {
        match self.points.get(key) {
            Some(BlobPoint::Steady(s)) => Ok(s),
            Some(BlobPoint::Transition(_)) => Err(SimError::NotSteady(key.to_string())),
            None => Err(SimError::UnknownGlob(key.to_string())),
        }
    }

    // ── Blobs and participants ───────────────────────────────────────────────

    /// Register an atomic blob and start its simulator
    pub fn add_glob(
        &mut self,
        key: &str,
        position: Vec2,
        radius: f32,
        color: Color,
        stage: &mut Stage,
    ) -> Result<(), SimError> {
        if key.is_empty() || key.contains(KEY_SEPARATOR) || self.key_of_member(key).is_some() {
            return Err(SimError::InvalidKey(key.to_string()));
        }
        let motion = self.spawn_motion(position, radius);
        let simulator = self.new_simulator(Boundary::circle(
            position,
            radius,
            self.settings.simulator.boundary_force,
        ));
        simulator.start(stage);
        self.base_radii.insert(key.to_string(), radius);
        self.points.insert(
            key.to_string(),
            BlobPoint::Steady(SteadyBlob {
                position,
                radius,
                color,
                members: vec![key.to_string()],
                double_border: None,
                motion,
                simulator,
            }),
        );
        log::debug!("Added glob {key} r={radius}");
        Ok(())
    }

    pub fn set_double_border(&mut self, key: &str, border: Option<Color>) -> Result<(), SimError> {
        match self.points.get_mut(key) {
            Some(BlobPoint::Steady(s)) => {
                s.double_border = border;
                Ok(())
            }
            Some(BlobPoint::Transition(_)) => Err(SimError::NotSteady(key.to_string())),
            None => Err(SimError::UnknownGlob(key.to_string())),
        }
    }

    fn spawn_motion(&mut self, position: Vec2, radius: f32) -> ParticleId {
        let id = self.allocate_particle_id();
        self.motion.add_physics_child(Particle::new(id, position, radius));
        id
    }

    /// Hand a participant to the blob that contains atomic key `member`
    pub fn add_participant(
        &mut self,
        member: &str,
        mut particle: Particle,
    ) -> Result<ParticleId, SimError> {
        let key = self
            .key_of_member(member)
            .ok_or_else(|| SimError::UnknownGlob(member.to_string()))?;
        particle.group = Some(member.to_string());
        let id = particle.id;
        match self.points.get_mut(&key) {
            Some(BlobPoint::Steady(s)) => s.simulator.add_physics_child(particle),
            Some(BlobPoint::Transition(t)) => {
                if !t.combining {
                    particle.side = Some(side_for(member, &t.members2));
                }
                t.simulator.add_physics_child(particle);
            }
            None => return Err(SimError::UnknownGlob(key)),
        }
        Ok(id)
    }

    /// Create a participant with the default push radius at `position`
    pub fn spawn_participant(&mut self, member: &str, position: Vec2) -> Result<ParticleId, SimError> {
        let id = self.allocate_particle_id();
        let particle = Particle::new(id, position, self.settings.simulator.default_child_radius);
        self.add_participant(member, particle)
    }

    pub fn remove_participant(&mut self, id: ParticleId) -> Result<Particle, SimError> {
        for point in self.points.values_mut() {
            let sim = point.simulator_mut();
            if sim.contains(id) {
                return sim.remove_physics_child(id);
            }
        }
        Err(SimError::UnknownParticle(id))
    }

    /// Detach every simulator this field owns
    pub fn dispose(&mut self, stage: &mut Stage) {
        self.motion.pause(stage);
        for point in self.points.values() {
            point.simulator().pause(stage);
        }
        self.points.clear();
        self.motion.drain();
        self.base_radii.clear();
        log::debug!("Blob field disposed");
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    /// Fuse steady blobs into one immediately; returns the new key
    pub fn initial_combine(
        &mut self,
        keys: &[&str],
        color: Option<Color>,
        stage: &mut Stage,
    ) -> Result<String, SimError> {
        if keys.is_empty() {
            return Err(SimError::UnknownGlob(String::new()));
        }
        for (i, key) in keys.iter().enumerate() {
            if keys[..i].contains(key) {
                return Err(SimError::InvalidKey(key.to_string()));
            }
            self.ensure_steady(key)?;
        }
        let mut sources = Vec::with_capacity(keys.len());
        for key in keys {
            sources.push(self.take_steady(key)?);
        }

        let exponent = self.settings.blobs.radius_growth_exponent;
        let members: Vec<String> = sources.iter().flat_map(|s| s.members.clone()).collect();
        let key = compose_key(&members);
        let radius = self.growth_radius(&members);

        let weights: Vec<f32> = sources.iter().map(|s| s.radius.powf(exponent)).collect();
        let total: f32 = weights.iter().sum();
        let position = if total > 0.0 {
            sources
                .iter()
                .zip(&weights)
                .fold(Vec2::ZERO, |acc, (s, w)| acc + s.position * *w)
                / total
        } else {
            sources[0].position
        };
        let colors: Vec<Color> = sources.iter().map(|s| s.color).collect();
        let color = color.or_else(|| Color::average(&colors)).unwrap_or(Color::WHITE);

        let mut simulator = self.new_simulator(Boundary::circle(
            position,
            radius,
            self.settings.simulator.boundary_force,
        ));
        let old_ids: Vec<SimulatorId> = sources.iter().map(|s| s.simulator.id()).collect();
        for source in &mut sources {
            for p in source.simulator.drain() {
                simulator.add_physics_child(p);
            }
            self.motion.remove_physics_child(source.motion)?;
        }
        stage.hand_off(&old_ids, &[simulator.id()]);

        let motion = self.spawn_motion(position, radius);
        self.points.insert(
            key.clone(),
            BlobPoint::Steady(SteadyBlob {
                position,
                radius,
                color,
                members,
                double_border: None,
                motion,
                simulator,
            }),
        );
        log::info!("Initial combine -> {key} r={radius:.2}");
        Ok(key)
    }

    /// Start an animated merge of two steady blobs; returns the transition key
    pub fn combine_globs(
        &mut self,
        key_a: &str,
        key_b: &str,
        target_radius: Option<f32>,
        target_color: Option<Color>,
        stage: &mut Stage,
    ) -> Result<String, SimError> {
        if key_a == key_b {
            return Err(SimError::InvalidKey(key_a.to_string()));
        }
        self.ensure_steady(key_a)?;
        self.ensure_steady(key_b)?;
        let mut a = self.take_steady(key_a)?;
        let mut b = self.take_steady(key_b)?;

        let all: Vec<String> = a.members.iter().chain(&b.members).cloned().collect();
        let join_radius1 = target_radius.unwrap_or_else(|| self.growth_radius(&all));
        let join_color = target_color
            .or_else(|| Color::average(&[a.color, b.color]))
            .unwrap_or(Color::WHITE);

        let mut simulator = self.new_simulator(Boundary::Unbounded);
        for mut p in a.simulator.drain().into_iter().chain(b.simulator.drain()) {
            // Members drift to whichever circle is nearest as the second one is absorbed
            p.side = None;
            simulator.add_physics_child(p);
        }
        stage.hand_off(&[a.simulator.id(), b.simulator.id()], &[simulator.id()]);

        let mult = self.settings.blobs.merge_pull;
        self.link_motion(a.motion, b.motion, |target| PullRelationship::attract(target, mult))?;

        let key = compose_key(&[key_a, key_b]);
        let mut transition = TransitionBlob {
            key1: key_a.to_string(),
            key2: key_b.to_string(),
            members1: a.members,
            members2: b.members,
            position1: a.position,
            position2: b.position,
            color1: a.color,
            color2: b.color,
            radius1: a.radius,
            radius2: b.radius,
            join_radius1,
            join_radius2: b.radius.min(join_radius1),
            split_radius1: a.radius,
            split_radius2: b.radius,
            join_color,
            combining: true,
            motion1: a.motion,
            motion2: b.motion,
            simulator,
        };
        transition.update_radii();
        transition.sync_boundary();
        self.points.insert(key.clone(), BlobPoint::Transition(transition));
        log::debug!("Merge started: {key_a} + {key_b} -> r={join_radius1:.2}");
        Ok(key)
    }

    /// Start an animated split of `key`; `subset` members leave as the second blob
    pub fn split_globs(
        &mut self,
        key: &str,
        subset: &[&str],
        color_a: Option<Color>,
        color_b: Option<Color>,
        stage: &mut Stage,
    ) -> Result<(), SimError> {
        let blob = self.ensure_steady(key)?;
        let (members2, members1): (Vec<String>, Vec<String>) = blob
            .members
            .iter()
            .cloned()
            .partition(|m| subset.contains(&m.as_str()));
        if members1.is_empty()
            || members2.is_empty()
            || subset.iter().any(|s| !blob.members.iter().any(|m| m == s))
        {
            return Err(SimError::InvalidSplit {
                key: key.to_string(),
                subset: subset.iter().map(|s| s.to_string()).collect(),
            });
        }

        let mut blob = self.take_steady(key)?;
        let split_radius1 = self.growth_radius(&members1);
        let split_radius2 = self.growth_radius(&members2);

        // Seed the second center toward the leaving participants
        let leaving: Vec<Vec2> = blob
            .simulator
            .participants()
            .iter()
            .filter(|p| p.group.as_deref().is_some_and(|g| members2.iter().any(|m| m == g)))
            .map(|p| p.position)
            .collect();
        let direction = if leaving.is_empty() {
            Vec2::X
        } else {
            let centroid = leaving.iter().copied().sum::<Vec2>() / leaving.len() as f32;
            (centroid - blob.position).try_normalize().unwrap_or(Vec2::X)
        };
        let position2 = blob.position + direction * SPLIT_SEED_OFFSET;

        let mut simulator = self.new_simulator(Boundary::Unbounded);
        for mut p in blob.simulator.drain() {
            p.side = Some(match p.group.as_deref() {
                Some(g) => side_for(g, &members2),
                None => Side::First,
            });
            simulator.add_physics_child(p);
        }
        stage.hand_off(&[blob.simulator.id()], &[simulator.id()]);

        let motion2 = self.spawn_motion(position2, split_radius2);
        if let Some(m) = self.motion.get(blob.motion) {
            let velocity = m.velocity;
            if let Some(m2) = self.motion.get_mut(motion2) {
                m2.velocity = velocity;
            }
        }
        let min_dist = split_radius1 + split_radius2 + self.settings.blobs.split_margin;
        let mult = self.settings.blobs.split_pull;
        self.link_motion(blob.motion, motion2, |target| {
            PullRelationship::repel(target, min_dist, mult)
        })?;

        let mut transition = TransitionBlob {
            key1: compose_key(&members1),
            key2: compose_key(&members2),
            members1,
            members2,
            position1: blob.position,
            position2,
            color1: color_a.unwrap_or(blob.color),
            color2: color_b.unwrap_or(blob.color),
            radius1: blob.radius,
            radius2: 0.0,
            join_radius1: blob.radius,
            join_radius2: split_radius2.min(blob.radius),
            split_radius1,
            split_radius2,
            join_color: blob.color,
            combining: false,
            motion1: blob.motion,
            motion2,
            simulator,
        };
        transition.update_radii();
        transition.sync_boundary();
        log::debug!(
            "Split started: {key} -> {} ({split_radius1:.2}) / {} ({split_radius2:.2})",
            transition.key1,
            transition.key2
        );
        self.points.insert(key.to_string(), BlobPoint::Transition(transition));
        Ok(())
    }

    /// Make two motion particles ignore each other and pull on each other
    fn link_motion(
        &mut self,
        a: ParticleId,
        b: ParticleId,
        pull: impl Fn(ParticleId) -> PullRelationship,
    ) -> Result<(), SimError> {
        let (pa, pb) = (pull(b), pull(a));
        self.motion.add_pull(a, pa)?;
        self.motion.add_pull(b, pb)?;
        self.motion.get_mut(a).ok_or(SimError::UnknownParticle(a))?.ignore.insert(b);
        self.motion.get_mut(b).ok_or(SimError::UnknownParticle(b))?.ignore.insert(a);
        Ok(())
    }

    /// Undo `link_motion` on a surviving particle
    fn unlink_motion(&mut self, survivor: ParticleId, other: ParticleId) {
        if let Some(p) = self.motion.get_mut(survivor) {
            p.pulls.retain(|r| r.target != other);
            p.ignore.remove(&other);
        }
    }

    // ── Per-frame ────────────────────────────────────────────────────────────

    /// Tick every attached simulator this field owns, in attach order
    ///
    /// Blob centers follow their motion particles; participant moves are returned.
    pub fn tick_physics(&mut self, stage: &Stage) -> Result<Vec<Moved>, SimError> {
        let scale = stage.time_scale();
        let mut moved = Vec::new();
        for &id in stage.attached() {
            if id == self.motion.id() {
                let centers = self.motion.physics_tick(scale)?;
                self.apply_motion(&centers);
            } else if let Some(sim) = self.simulator_mut(id) {
                moved.extend(sim.physics_tick(scale)?);
            }
        }
        Ok(moved)
    }

    fn apply_motion(&mut self, centers: &[Moved]) {
        let positions: HashMap<ParticleId, Vec2> =
            centers.iter().map(|m| (m.id, m.position)).collect();
        for point in self.points.values_mut() {
            match point {
                BlobPoint::Steady(s) => {
                    if let Some(p) = positions.get(&s.motion) {
                        s.position = *p;
                    }
                }
                BlobPoint::Transition(t) => {
                    if let Some(p) = positions.get(&t.motion1) {
                        t.position1 = *p;
                    }
                    if let Some(p) = positions.get(&t.motion2) {
                        t.position2 = *p;
                    }
                }
            }
        }
    }

    /// Render every blob, then commit finished transitions
    pub fn draw(&mut self, stage: &mut Stage, surface: &mut dyn Surface) -> Result<Vec<Commit>, SimError> {
        let settings = self.settings.blobs;
        let mut pending = Vec::new();

        for (key, point) in self.points.iter_mut() {
            match point {
                BlobPoint::Steady(s) => {
                    s.sync_boundary();
                    if let Some(m) = self.motion.get_mut(s.motion) {
                        m.push_radius = s.radius;
                    }
                    s.render(&settings, surface);
                }
                BlobPoint::Transition(t) => {
                    t.update_radii();
                    t.sync_boundary();
                    for (id, r) in [(t.motion1, t.radius1), (t.motion2, t.radius2)] {
                        if let Some(m) = self.motion.get_mut(id) {
                            m.push_radius = r;
                        }
                    }
                    let regime = t.regime();
                    t.render(regime, &settings, surface);
                    if t.commits_at(regime) {
                        pending.push((key.clone(), regime));
                    }
                }
            }
        }

        let mut commits = Vec::with_capacity(pending.len());
        for (key, regime) in pending {
            commits.push(self.commit(&key, regime, stage)?);
        }
        Ok(commits)
    }

    fn commit(&mut self, key: &str, regime: Regime, stage: &mut Stage) -> Result<Commit, SimError> {
        let Some(BlobPoint::Transition(mut t)) = self.points.remove(key) else {
            return Err(SimError::UnknownGlob(key.to_string()));
        };
        let force = self.settings.simulator.boundary_force;

        if t.combining {
            let (position, motion, absorbed) = match regime {
                Regime::Nested { outer: Side::Second } => (t.position2, t.motion2, t.motion1),
                _ => (t.position1, t.motion1, t.motion2),
            };
            let radius = t.join_radius1;
            let mut simulator = self.new_simulator(Boundary::circle(position, radius, force));
            for mut p in t.simulator.drain() {
                p.side = None;
                simulator.add_physics_child(p);
            }
            stage.hand_off(&[t.simulator.id()], &[simulator.id()]);
            self.motion.remove_physics_child(absorbed)?;
            self.unlink_motion(motion, absorbed);
            if let Some(m) = self.motion.get_mut(motion) {
                m.push_radius = radius;
            }

            let members: Vec<String> = t.members1.iter().chain(&t.members2).cloned().collect();
            self.points.insert(
                key.to_string(),
                BlobPoint::Steady(SteadyBlob {
                    position,
                    radius,
                    color: t.join_color,
                    members,
                    double_border: None,
                    motion,
                    simulator,
                }),
            );
            log::info!("Merge committed: {key} r={radius:.2}");
            Ok(Commit::Merged {
                key: key.to_string(),
                from: [t.key1, t.key2],
                radius,
            })
        } else {
            let mut first = self.new_simulator(Boundary::circle(t.position1, t.split_radius1, force));
            let mut second = self.new_simulator(Boundary::circle(t.position2, t.split_radius2, force));
            for mut p in t.simulator.drain() {
                let side = p.side.take().unwrap_or(Side::First);
                match side {
                    Side::First => first.add_physics_child(p),
                    Side::Second => second.add_physics_child(p),
                }
            }
            stage.hand_off(&[t.simulator.id()], &[first.id(), second.id()]);
            self.unlink_motion(t.motion1, t.motion2);
            self.unlink_motion(t.motion2, t.motion1);

            for (k, members, position, radius, color, motion, simulator) in [
                (&t.key1, &t.members1, t.position1, t.split_radius1, t.color1, t.motion1, first),
                (&t.key2, &t.members2, t.position2, t.split_radius2, t.color2, t.motion2, second),
            ] {
                if let Some(m) = self.motion.get_mut(motion) {
                    m.push_radius = radius;
                }
                self.points.insert(
                    k.clone(),
                    BlobPoint::Steady(SteadyBlob {
                        position,
                        radius,
                        color,
                        members: members.clone(),
                        double_border: None,
                        motion,
                        simulator,
                    }),
                );
            }
            log::info!(
                "Split committed: {key} -> {} ({:.2}) / {} ({:.2})",
                t.key1,
                t.split_radius1,
                t.key2,
                t.split_radius2
            );
            Ok(Commit::Split {
                from: key.to_string(),
                into: [t.key1, t.key2],
                radii: [t.split_radius1, t.split_radius2],
            })
        }
    }
}

fn side_for(member: &str, second: &[String]) -> Side {
    if second.iter().any(|m| m == member) {
        Side::Second
    } else {
        Side::First
    }
}
