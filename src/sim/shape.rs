//! Boundary and participant shapes
//!
//! Containment regions are a closed set of variants; the simulator matches on
//! them instead of dispatching on a type tag.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Which of the two circles of a double-circle boundary a participant belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    First,
    Second,
}

/// Collision footprint of a participant
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ParticipantShape {
    /// Uses the particle's push radius
    #[default]
    Circle,
    /// Axis-aligned box centered on the particle position
    Rectangle { half_extents: Vec2 },
}

/// A circle in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Signed distance from the rim (negative inside)
    #[inline]
    pub fn signed_distance(&self, p: Vec2) -> f32 {
        (p - self.center).length() - self.radius
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        self.signed_distance(p) <= 0.0
    }

    /// The two points where the rims cross, ordered counter-clockwise from
    /// `self` looking toward `other` (left of the center line first).
    ///
    /// `None` when the circles are disjoint, nested or concentric.
    pub fn intersections(&self, other: &Circle) -> Option<[Vec2; 2]> {
        let delta = other.center - self.center;
        let d = delta.length();
        if d <= 0.0 || d > self.radius + other.radius || d < (self.radius - other.radius).abs() {
            return None;
        }
        let along = (self.radius * self.radius - other.radius * other.radius + d * d) / (2.0 * d);
        let h = (self.radius * self.radius - along * along).max(0.0).sqrt();
        let u = delta / d;
        let n = u.perp();
        let base = self.center + u * along;
        Some([base + n * h, base - n * h])
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Rect {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    pub fn corners(&self) -> [Vec2; 4] {
        let (lo, hi) = (self.min(), self.max());
        [
            lo,
            Vec2::new(hi.x, lo.y),
            hi,
            Vec2::new(lo.x, hi.y),
        ]
    }

    /// Overlap on each axis (positive on both axes means the rectangles intersect)
    pub fn overlap(&self, other: &Rect) -> Vec2 {
        let total = self.half_extents + other.half_extents;
        total - (other.center - self.center).abs()
    }
}

/// Two circles active while a merge/split is in flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoubleCircle {
    pub first: Circle,
    pub second: Circle,
    /// Rim crossings, present while the circles overlap
    pub lens: Option<[Vec2; 2]>,
}

impl DoubleCircle {
    pub fn new(first: Circle, second: Circle) -> Self {
        Self {
            first,
            second,
            lens: first.intersections(&second),
        }
    }

    pub fn circle(&self, side: Side) -> &Circle {
        match side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }

    /// Side a participant without explicit membership is contained by
    pub fn default_side(&self, p: Vec2) -> Side {
        if let Some([a, b]) = self.lens {
            if self.first.contains(p) && self.second.contains(p) {
                // Inside the lens: split along the chord through the crossings
                let axis = self.second.center - self.first.center;
                let chord_mid = (a + b) * 0.5;
                return if (p - chord_mid).dot(axis) > 0.0 {
                    Side::Second
                } else {
                    Side::First
                };
            }
        }
        if self.second.signed_distance(p) < self.first.signed_distance(p) {
            Side::Second
        } else {
            Side::First
        }
    }
}

/// Containment region of a simulator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Boundary {
    Circle { circle: Circle, force: f32 },
    Rectangle { rect: Rect, force: f32 },
    DoubleCircle { circles: DoubleCircle, force: f32 },
    /// No containment (blob centers)
    Unbounded,
}

impl Boundary {
    pub fn circle(center: Vec2, radius: f32, force: f32) -> Self {
        Boundary::Circle {
            circle: Circle::new(center, radius),
            force,
        }
    }

    pub fn rectangle(center: Vec2, half_extents: Vec2, force: f32) -> Self {
        Boundary::Rectangle {
            rect: Rect::new(center, half_extents),
            force,
        }
    }

    pub fn double_circle(first: Circle, second: Circle, force: f32) -> Self {
        Boundary::DoubleCircle {
            circles: DoubleCircle::new(first, second),
            force,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersections_symmetric_pair() {
        let a = Circle::new(Vec2::ZERO, 100.0);
        let b = Circle::new(Vec2::new(160.0, 0.0), 100.0);
        let [up, down] = a.intersections(&b).unwrap();
        assert!((up - Vec2::new(80.0, 60.0)).length() < 1e-3);
        assert!((down - Vec2::new(80.0, -60.0)).length() < 1e-3);
    }

    #[test]
    fn test_intersections_absent_when_disjoint_or_nested() {
        let a = Circle::new(Vec2::ZERO, 100.0);
        assert!(a.intersections(&Circle::new(Vec2::new(250.0, 0.0), 100.0)).is_none());
        assert!(a.intersections(&Circle::new(Vec2::new(10.0, 0.0), 20.0)).is_none());
        assert!(a.intersections(&Circle::new(Vec2::ZERO, 100.0)).is_none());
    }

    #[test]
    fn test_tangent_circles_touch_once() {
        let a = Circle::new(Vec2::ZERO, 100.0);
        let b = Circle::new(Vec2::new(200.0, 0.0), 100.0);
        let [up, down] = a.intersections(&b).unwrap();
        assert!((up - down).length() < 1e-3);
        assert!((up - Vec2::new(100.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_default_side_uses_chord_inside_lens() {
        let dc = DoubleCircle::new(
            Circle::new(Vec2::ZERO, 100.0),
            Circle::new(Vec2::new(100.0, 0.0), 40.0),
        );
        assert!(dc.lens.is_some());
        // Inside both circles but on the first circle's side of the chord
        assert_eq!(dc.default_side(Vec2::new(65.0, 0.0)), Side::First);
        assert_eq!(dc.default_side(Vec2::new(95.0, 0.0)), Side::Second);
        // Outside both: nearest rim wins
        assert_eq!(dc.default_side(Vec2::new(150.0, 0.0)), Side::Second);
        assert_eq!(dc.default_side(Vec2::new(-150.0, 0.0)), Side::First);
    }

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(Vec2::ZERO, Vec2::new(10.0, 5.0));
        let b = Rect::new(Vec2::new(15.0, 2.0), Vec2::new(10.0, 5.0));
        let o = a.overlap(&b);
        assert_eq!(o, Vec2::new(5.0, 8.0));
    }
}
