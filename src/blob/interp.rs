//! Radius growth, transition interpolation, encroachment and regime classification

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::lerp;
use crate::sim::Side;

/// Geometric relationship of a transitioning pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    /// Rims do not touch
    Disjoint,
    /// Rims cross (or touch externally)
    Overlapping,
    /// One circle fully contains the other; `outer` is the containing side
    Nested { outer: Side },
}

/// `(Σ r^E)^(1/E)`; a single member keeps its radius exactly
pub fn combined_radius(radii: &[f32], exponent: f32) -> f32 {
    match radii {
        [] => 0.0,
        [only] => *only,
        _ => radii
            .iter()
            .map(|r| r.powf(exponent))
            .sum::<f32>()
            .powf(1.0 / exponent),
    }
}

/// Transition progress from fully joined (0) to fully split (1)
///
/// `(d - dJoin) / (dSplit - dJoin)` clamped; a degenerate span is a step at `dSplit`.
pub fn blend_ratio(distance: f32, join: [f32; 2], split: [f32; 2]) -> f32 {
    let d_join = (join[0] - join[1]).abs();
    let d_split = split[0] + split[1];
    let ratio = (distance - d_join) / (d_split - d_join);
    if ratio.is_nan() || ratio.is_infinite() {
        return if distance >= d_split { 1.0 } else { 0.0 };
    }
    ratio.clamp(0.0, 1.0)
}

/// Radii of both sides at the given center distance
pub fn interpolate_radii(distance: f32, join: [f32; 2], split: [f32; 2]) -> [f32; 2] {
    let t = blend_ratio(distance, join, split);
    [lerp(join[0], split[0], t), lerp(join[1], split[1], t)]
}

/// Signed depth of rim contact; negative when the circles are apart
#[inline]
pub fn first_encroached(r1: f32, r2: f32, distance: f32) -> f32 {
    r1 + r2 - distance
}

/// How far `radius`'s near rim has crossed into the other silhouette, 0..1
///
/// Reaches 1 once the circle is swallowed whole. A zero radius counts as swallowed.
pub fn encroachment(radius: f32, other: f32, distance: f32) -> f32 {
    let e = first_encroached(radius, other, distance) / (2.0 * radius);
    if e.is_nan() || e.is_infinite() {
        return 1.0;
    }
    e.clamp(0.0, 1.0)
}

/// Disjoint, then nested, else overlapping; strict inequalities, no hysteresis
pub fn classify(p1: Vec2, r1: f32, p2: Vec2, r2: f32) -> Regime {
    let d = p1.distance(p2);
    if first_encroached(r1, r2, d) < 0.0 {
        Regime::Disjoint
    } else if r1 - r2 >= d {
        Regime::Nested { outer: Side::First }
    } else if r2 - r1 >= d {
        Regime::Nested { outer: Side::Second }
    } else {
        Regime::Overlapping
    }
}
