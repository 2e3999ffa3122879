//! Metaball outline of two overlapping circles
//!
//! The outline keeps each circle's arc outside the lens and replaces the two
//! sharp notches at the rim crossings with cubic bridges. Each bridge starts a
//! little before the crossing on one circle and ends a little after it on the
//! other, with handles along the arc tangents so the outline stays smooth.
//!
//! Angles are measured in the frame of the center line `c1 -> c2`:
//! - `phi1`: angle at `c1` between the center line and a crossing
//! - `phi2`: angle at `c2` between the reversed center line and a crossing
//!
//! Bridge spread shrinks to zero at external tangency and at nesting, so the
//! outline degenerates continuously into one or two plain circles.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;

use super::path::Path;
use crate::polar_to_cartesian;
use crate::sim::Circle;

/// Geometry of one overlapping pair
#[derive(Debug, Clone, PartialEq)]
pub struct Metaball {
    pub path: Path,
    /// Rim crossings, left of the center line first
    pub lens: [Vec2; 2],
    /// Where the four arcs end and the bridges begin
    pub bridge_ends: [Vec2; 4],
}

#[inline]
fn ccw_tangent(theta: f32) -> Vec2 {
    polar_to_cartesian(1.0, theta + FRAC_PI_2)
}

impl Metaball {
    /// Build the outline; `None` unless the rims cross
    pub fn build(first: &Circle, second: &Circle, spread: f32, handle: f32) -> Option<Self> {
        let lens = first.intersections(second)?;
        let (c1, r1) = (first.center, first.radius);
        let (c2, r2) = (second.center, second.radius);

        let axis = c2 - c1;
        let d = axis.length();
        let beta = axis.y.atan2(axis.x);
        let along = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
        let phi1 = (along / r1).clamp(-1.0, 1.0).acos();
        let phi2 = ((d - along) / r2).clamp(-1.0, 1.0).acos();

        let spread = spread.clamp(0.0, 1.0);
        let delta1 = spread * phi1.min(PI - phi1);
        let delta2 = spread * phi2.min(PI - phi2);

        // First circle: far side, counter-clockwise from upper to lower bridge
        let a1_start = beta + phi1 + delta1;
        let a1_end = beta + TAU - phi1 - delta1;
        // Second circle: far side, counter-clockwise from lower to upper bridge
        let a2_start = beta - PI + phi2 + delta2;
        let a2_end = beta + PI - phi2 - delta2;

        let q1_up = c1 + polar_to_cartesian(r1, a1_start);
        let q1_down = c1 + polar_to_cartesian(r1, a1_end);
        let q2_down = c2 + polar_to_cartesian(r2, a2_start);
        let q2_up = c2 + polar_to_cartesian(r2, a2_end);

        let lower_handle = (q2_down - q1_down).length() * handle;
        let upper_handle = (q1_up - q2_up).length() * handle;

        let mut path = Path::new();
        path.move_to(q1_up)
            .arc(c1, r1, a1_start, a1_end)
            .cubic_to(
                q1_down + ccw_tangent(a1_end) * lower_handle,
                q2_down - ccw_tangent(a2_start) * lower_handle,
                q2_down,
            )
            .arc(c2, r2, a2_start, a2_end)
            .cubic_to(
                q2_up + ccw_tangent(a2_end) * upper_handle,
                q1_up - ccw_tangent(a1_start) * upper_handle,
                q1_up,
            )
            .close();

        Some(Self {
            path,
            lens,
            bridge_ends: [q1_up, q1_down, q2_down, q2_up],
        })
    }
}
