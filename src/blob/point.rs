//! Blob representations: steady circle or in-flight merge/split

use glam::Vec2;
use serde::Serialize;

use super::interp::{self, Regime};
use crate::renderer::{Color, GradientStop, Metaball, Paint, Surface};
use crate::settings::BlobSettings;
use crate::sim::{Boundary, Circle, DoubleCircle, ParticleId, ParticleSimulator, Side};

/// One independent blob
#[derive(Debug, Clone, Serialize)]
pub struct SteadyBlob {
    pub position: Vec2,
    pub radius: f32,
    pub color: Color,
    /// Atomic keys this blob is made of
    pub members: Vec<String>,
    /// Second ring drawn just inside the rim
    pub double_border: Option<Color>,
    /// Particle in the field's motion simulator that carries `position`
    pub motion: ParticleId,
    pub simulator: ParticleSimulator,
}

impl SteadyBlob {
    pub fn circle(&self) -> Circle {
        Circle::new(self.position, self.radius)
    }

    /// Keep the participants' containment circle on the blob
    pub fn sync_boundary(&mut self) {
        let force = self.simulator.tunables.boundary_force;
        self.simulator.boundary = Boundary::circle(self.position, self.radius, force);
    }

    pub fn render(&self, settings: &BlobSettings, surface: &mut dyn Surface) {
        surface.fill_circle(self.position, self.radius, &Paint::Solid(self.color));
        if let Some(border) = self.double_border {
            let paint = Paint::Solid(border);
            surface.stroke_circle(self.position, self.radius, settings.stroke_width, &paint);
            let inner = (self.radius - settings.double_border_gap).max(0.0);
            surface.stroke_circle(self.position, inner, settings.stroke_width, &paint);
        }
    }
}

/// A merge (`combining`) or split in progress
#[derive(Debug, Clone, Serialize)]
pub struct TransitionBlob {
    pub key1: String,
    pub key2: String,
    pub members1: Vec<String>,
    pub members2: Vec<String>,
    pub position1: Vec2,
    pub position2: Vec2,
    pub color1: Color,
    pub color2: Color,
    pub radius1: f32,
    pub radius2: f32,
    pub join_radius1: f32,
    pub join_radius2: f32,
    pub split_radius1: f32,
    pub split_radius2: f32,
    pub join_color: Color,
    pub combining: bool,
    pub motion1: ParticleId,
    pub motion2: ParticleId,
    pub simulator: ParticleSimulator,
}

impl TransitionBlob {
    pub fn distance(&self) -> f32 {
        self.position1.distance(self.position2)
    }

    /// Recompute both radii from the current center distance
    pub fn update_radii(&mut self) {
        let [r1, r2] = interp::interpolate_radii(
            self.distance(),
            [self.join_radius1, self.join_radius2],
            [self.split_radius1, self.split_radius2],
        );
        self.radius1 = r1;
        self.radius2 = r2;
    }

    pub fn circles(&self) -> (Circle, Circle) {
        (
            Circle::new(self.position1, self.radius1),
            Circle::new(self.position2, self.radius2),
        )
    }

    pub fn regime(&self) -> Regime {
        interp::classify(self.position1, self.radius1, self.position2, self.radius2)
    }

    /// Whether this regime completes the transition
    pub fn commits_at(&self, regime: Regime) -> bool {
        match regime {
            Regime::Nested { .. } => self.combining,
            Regime::Disjoint => !self.combining,
            Regime::Overlapping => false,
        }
    }

    /// Side colors blended toward the join color by encroachment
    pub fn side_colors(&self) -> (Color, Color) {
        let d = self.distance();
        let e1 = interp::encroachment(self.radius1, self.radius2, d);
        let e2 = interp::encroachment(self.radius2, self.radius1, d);
        (
            self.color1.mix(self.join_color, e1),
            self.color2.mix(self.join_color, e2),
        )
    }

    /// Participants follow the two circles, lens included
    pub fn sync_boundary(&mut self) {
        let (first, second) = self.circles();
        let force = self.simulator.tunables.boundary_force;
        self.simulator.boundary = Boundary::DoubleCircle {
            circles: DoubleCircle::new(first, second),
            force,
        };
    }

    /// Draw the shape for `regime`
    pub fn render(&self, regime: Regime, settings: &BlobSettings, surface: &mut dyn Surface) {
        let (first, second) = self.circles();
        match regime {
            Regime::Disjoint => {
                let (c1, c2) = self.side_colors();
                surface.fill_circle(first.center, first.radius, &Paint::Solid(c1));
                surface.fill_circle(second.center, second.radius, &Paint::Solid(c2));
            }
            Regime::Nested { outer } => {
                let circle = match outer {
                    Side::First => first,
                    Side::Second => second,
                };
                surface.fill_circle(circle.center, circle.radius, &Paint::Solid(self.join_color));
            }
            Regime::Overlapping => {
                let Some(shape) = Metaball::build(
                    &first,
                    &second,
                    settings.bridge_spread,
                    settings.bridge_handle,
                ) else {
                    // Rims stopped crossing through rounding at a regime edge
                    return;
                };
                let paint = self.gradient();
                surface.fill_path(&shape.path, &paint);
                surface.stroke_path(&shape.path, settings.stroke_width, &paint);
            }
        }
    }

    /// Linear gradient along the center line, far rim to far rim
    pub fn gradient(&self) -> Paint {
        let (c1, c2) = self.side_colors();
        let axis = self.position2 - self.position1;
        let Some(dir) = axis.try_normalize() else {
            return Paint::Solid(self.join_color);
        };
        let start = self.position1 - dir * self.radius1;
        let end = self.position2 + dir * self.radius2;
        let span = start.distance(end);
        // Stops at the two centers; NaN offsets collapse to the ends
        let guard = |v: f32, fallback: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { fallback };
        let o1 = guard(self.radius1 / span, 0.0);
        let o2 = guard(1.0 - self.radius2 / span, 1.0).max(o1);
        Paint::LinearGradient {
            start,
            end,
            stops: vec![
                GradientStop { offset: o1, color: c1 },
                GradientStop { offset: o2, color: c2 },
            ],
        }
    }
}

/// Exactly one representation per key
#[derive(Debug, Clone, Serialize)]
pub enum BlobPoint {
    Steady(SteadyBlob),
    Transition(TransitionBlob),
}

impl BlobPoint {
    pub fn simulator(&self) -> &ParticleSimulator {
        match self {
            BlobPoint::Steady(s) => &s.simulator,
            BlobPoint::Transition(t) => &t.simulator,
        }
    }

    pub fn simulator_mut(&mut self) -> &mut ParticleSimulator {
        match self {
            BlobPoint::Steady(s) => &mut s.simulator,
            BlobPoint::Transition(t) => &mut t.simulator,
        }
    }

    pub fn as_steady(&self) -> Option<&SteadyBlob> {
        match self {
            BlobPoint::Steady(s) => Some(s),
            BlobPoint::Transition(_) => None,
        }
    }

    pub fn as_transition(&self) -> Option<&TransitionBlob> {
        match self {
            BlobPoint::Transition(t) => Some(t),
            BlobPoint::Steady(_) => None,
        }
    }

    /// Atomic keys covered by this point
    pub fn members(&self) -> Vec<&str> {
        match self {
            BlobPoint::Steady(s) => s.members.iter().map(String::as_str).collect(),
            BlobPoint::Transition(t) => t
                .members1
                .iter()
                .chain(&t.members2)
                .map(String::as_str)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Recorder;
    use crate::settings::SimTunables;
    use crate::sim::SimulatorId;

    fn transition(d: f32, combining: bool) -> TransitionBlob {
        let mut t = TransitionBlob {
            key1: "A".into(),
            key2: "B".into(),
            members1: vec!["A".into()],
            members2: vec!["B".into()],
            position1: Vec2::ZERO,
            position2: Vec2::new(d, 0.0),
            color1: Color::RED,
            color2: Color::BLUE,
            radius1: 0.0,
            radius2: 0.0,
            join_radius1: 2f32.sqrt() * 100.0,
            join_radius2: 100.0,
            split_radius1: 100.0,
            split_radius2: 100.0,
            join_color: Color::rgb(0.5, 0.0, 0.5),
            combining,
            motion1: ParticleId(1),
            motion2: ParticleId(2),
            simulator: ParticleSimulator::new(
                SimulatorId(1),
                Boundary::Unbounded,
                SimTunables::default(),
            ),
        };
        t.update_radii();
        t
    }

    #[test]
    fn test_commit_rules() {
        let merge = transition(300.0, true);
        let split = transition(300.0, false);
        let nested = Regime::Nested { outer: Side::First };
        assert!(merge.commits_at(nested));
        assert!(!merge.commits_at(Regime::Disjoint));
        assert!(split.commits_at(Regime::Disjoint));
        assert!(!split.commits_at(nested));
        assert!(!merge.commits_at(Regime::Overlapping));
        assert!(!split.commits_at(Regime::Overlapping));
    }

    #[test]
    fn test_overlapping_renders_gradient_metaball() {
        let t = transition(170.0, true);
        assert_eq!(t.regime(), Regime::Overlapping);
        let mut rec = Recorder::new();
        t.render(t.regime(), &BlobSettings::default(), &mut rec);
        let (path, paint) = rec.filled_paths().next().unwrap();
        assert!(path.is_finite());
        match paint {
            Paint::LinearGradient { stops, .. } => {
                assert_eq!(stops.len(), 2);
                assert!(stops[0].offset <= stops[1].offset);
            }
            other => panic!("expected gradient, got {other:?}"),
        }
    }

    #[test]
    fn test_side_colors_blend_with_encroachment() {
        let far = transition(400.0, true);
        assert_eq!(far.side_colors(), (Color::RED, Color::BLUE));
        let near = transition(170.0, true);
        let (c1, _) = near.side_colors();
        assert!(c1.b > 0.0 && c1.r < 1.0);
    }

    #[test]
    fn test_double_circle_boundary_shares_lens() {
        let mut t = transition(170.0, false);
        t.sync_boundary();
        let (first, second) = t.circles();
        match t.simulator.boundary {
            Boundary::DoubleCircle { circles, .. } => {
                assert_eq!(circles.lens, first.intersections(&second));
                assert!(circles.lens.is_some());
            }
            other => panic!("unexpected boundary {other:?}"),
        }
    }

    #[test]
    fn test_nested_renders_single_circle() {
        let t = transition(30.0, true);
        assert!(matches!(t.regime(), Regime::Nested { outer: Side::First }));
        let mut rec = Recorder::new();
        t.render(t.regime(), &BlobSettings::default(), &mut rec);
        assert_eq!(rec.commands.len(), 1);
        let (center, radius, _) = rec.filled_circles().next().unwrap();
        assert_eq!(center, Vec2::ZERO);
        assert_eq!(radius, t.join_radius1);
    }
}
