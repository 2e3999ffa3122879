//! Per-participant force terms
//!
//! Every function returns an acceleration contribution; the simulator sums them
//! and checks each for finiteness.

use glam::Vec2;

use super::particle::{Particle, PullRelationship};
use super::shape::{Boundary, Circle, ParticipantShape, Rect};

/// Inward push when a participant pokes out of a circle
pub fn circle_containment(position: Vec2, push_radius: f32, circle: &Circle, force: f32) -> Vec2 {
    let offset = circle.center - position;
    let dist = offset.length();
    let penetration = dist + push_radius - circle.radius;
    if penetration <= 0.0 {
        return Vec2::ZERO;
    }
    // A particle exactly on the center has no inward direction to go
    offset.normalize_or_zero() * (force * penetration / push_radius)
}

/// Push back inside a rectangle
///
/// Circular participants are measured at their most violated edge, rectangular
/// ones at their most penetrated corner.
pub fn rect_containment(particle: &Particle, rect: &Rect, force: f32) -> Vec2 {
    let (lo, hi) = (rect.min(), rect.max());
    let mut worst = 0.0;
    let mut normal = Vec2::ZERO;
    let mut consider = |violation: f32, inward: Vec2| {
        if violation > worst {
            worst = violation;
            normal = inward;
        }
    };

    match particle.shape {
        ParticipantShape::Circle => {
            let p = particle.position;
            let r = particle.push_radius;
            consider(lo.x - (p.x - r), Vec2::X);
            consider((p.x + r) - hi.x, Vec2::NEG_X);
            consider(lo.y - (p.y - r), Vec2::Y);
            consider((p.y + r) - hi.y, Vec2::NEG_Y);
        }
        ParticipantShape::Rectangle { half_extents } => {
            for corner in Rect::new(particle.position, half_extents).corners() {
                consider(lo.x - corner.x, Vec2::X);
                consider(corner.x - hi.x, Vec2::NEG_X);
                consider(lo.y - corner.y, Vec2::Y);
                consider(corner.y - hi.y, Vec2::NEG_Y);
            }
        }
    }

    if worst <= 0.0 {
        return Vec2::ZERO;
    }
    normal * (force * worst / particle.push_radius)
}

/// Containment acceleration for any boundary variant
pub fn containment(particle: &Particle, boundary: &Boundary) -> Vec2 {
    match boundary {
        Boundary::Circle { circle, force } => {
            circle_containment(particle.position, particle.push_radius, circle, *force)
        }
        Boundary::Rectangle { rect, force } => rect_containment(particle, rect, *force),
        Boundary::DoubleCircle { circles, force } => {
            let side = particle
                .side
                .unwrap_or_else(|| circles.default_side(particle.position));
            circle_containment(
                particle.position,
                particle.push_radius,
                circles.circle(side),
                *force,
            )
        }
        Boundary::Unbounded => Vec2::ZERO,
    }
}

/// Mutual repulsion of an overlapping pair, returned as `(on_a, on_b)`
///
/// Coincident circular participants yield NaN; callers treat that as fatal.
pub fn repulsion(a: &Particle, b: &Particle, push: f32) -> (Vec2, Vec2) {
    match (a.shape, b.shape) {
        (
            ParticipantShape::Rectangle { half_extents: ha },
            ParticipantShape::Rectangle { half_extents: hb },
        ) => {
            let ra = Rect::new(a.position, ha);
            let rb = Rect::new(b.position, hb);
            let overlap = ra.overlap(&rb);
            if overlap.x <= 0.0 || overlap.y <= 0.0 {
                return (Vec2::ZERO, Vec2::ZERO);
            }
            let delta = b.position - a.position;
            // Separate along the axis of least overlap
            let dir = if overlap.x < overlap.y {
                Vec2::new(delta.x.signum(), 0.0)
            } else {
                Vec2::new(0.0, delta.y.signum())
            };
            let accel = dir * (push * overlap.x.min(overlap.y));
            (-accel, accel)
        }
        _ => {
            let delta = b.position - a.position;
            let dist = delta.length();
            let overlap = a.push_radius + b.push_radius - dist;
            if overlap <= 0.0 {
                return (Vec2::ZERO, Vec2::ZERO);
            }
            let accel = delta / dist * (push * overlap);
            (-accel, accel)
        }
    }
}

/// Velocity damping above the friction threshold
#[inline]
pub fn friction(velocity: Vec2, friction: f32, friction_velocity: f32) -> Vec2 {
    if velocity.length() > friction_velocity {
        -velocity * friction
    } else {
        Vec2::ZERO
    }
}

/// Spring toward/away from a pull target
pub fn pull(position: Vec2, target: Vec2, rel: &PullRelationship) -> Vec2 {
    let delta = target - position;
    let dist = delta.length();
    if dist > rel.max_dist {
        delta / dist * ((dist - rel.max_dist) * rel.mult)
    } else if dist < rel.min_dist {
        -delta / dist * ((rel.min_dist - dist) * rel.mult)
    } else {
        Vec2::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::particle::ParticleId;
    use crate::sim::shape::{DoubleCircle, Side};

    fn particle(id: u32, pos: Vec2, r: f32) -> Particle {
        Particle::new(ParticleId(id), pos, r)
    }

    #[test]
    fn test_circle_containment_pushes_inward() {
        let circle = Circle::new(Vec2::ZERO, 50.0);
        // 25 + 30 = 55 > 50: penetration 5
        let a = circle_containment(Vec2::new(25.0, 0.0), 30.0, &circle, 4.0);
        assert!((a.x - (-4.0 * 5.0 / 30.0)).abs() < 1e-6);
        assert_eq!(a.y, 0.0);
    }

    #[test]
    fn test_circle_containment_idle_inside() {
        let circle = Circle::new(Vec2::ZERO, 50.0);
        // 5 + 30 = 35 < 50: fully inside
        assert_eq!(circle_containment(Vec2::new(5.0, 0.0), 30.0, &circle, 4.0), Vec2::ZERO);
    }

    #[test]
    fn test_circle_containment_at_center_is_finite() {
        let circle = Circle::new(Vec2::ZERO, 10.0);
        let a = circle_containment(Vec2::ZERO, 30.0, &circle, 4.0);
        assert_eq!(a, Vec2::ZERO);
    }

    #[test]
    fn test_zero_push_radius_outside_is_non_finite() {
        let circle = Circle::new(Vec2::ZERO, 10.0);
        let a = circle_containment(Vec2::new(20.0, 0.0), 0.0, &circle, 4.0);
        assert!(!a.is_finite());
    }

    #[test]
    fn test_rect_containment_circle_nearest_edge() {
        let rect = Rect::new(Vec2::ZERO, Vec2::new(100.0, 50.0));
        let p = particle(1, Vec2::new(95.0, 0.0), 10.0);
        let a = rect_containment(&p, &rect, 2.0);
        assert!((a.x - (-2.0 * 5.0 / 10.0)).abs() < 1e-6);
        assert_eq!(a.y, 0.0);
    }

    #[test]
    fn test_rect_containment_rectangle_worst_corner() {
        let rect = Rect::new(Vec2::ZERO, Vec2::new(100.0, 50.0));
        let p = Particle::rectangle(ParticleId(1), Vec2::new(0.0, 48.0), Vec2::new(6.0, 8.0));
        let a = rect_containment(&p, &rect, 1.0);
        // Top corners poke 6 above the top edge; push radius is 10
        assert!(a.x.abs() < 1e-6);
        assert!((a.y - (-6.0 / 10.0)).abs() < 1e-6);
    }

    #[test]
    fn test_double_circle_respects_explicit_side() {
        let boundary = Boundary::DoubleCircle {
            circles: DoubleCircle::new(
                Circle::new(Vec2::ZERO, 50.0),
                Circle::new(Vec2::new(60.0, 0.0), 50.0),
            ),
            force: 1.0,
        };
        let mut p = particle(1, Vec2::new(70.0, 0.0), 10.0);
        // Nearest is the second circle: already contained
        assert_eq!(containment(&p, &boundary), Vec2::ZERO);
        // Forced into the first: pulled back left
        p.side = Some(Side::First);
        assert!(containment(&p, &boundary).x < 0.0);
    }

    #[test]
    fn test_circle_repulsion_symmetric() {
        let a = particle(1, Vec2::ZERO, 10.0);
        let b = particle(2, Vec2::new(15.0, 0.0), 10.0);
        let (fa, fb) = repulsion(&a, &b, 0.5);
        assert!((fa.x + 2.5).abs() < 1e-6);
        assert_eq!(fa, -fb);
    }

    #[test]
    fn test_coincident_repulsion_is_nan() {
        let a = particle(1, Vec2::ONE, 10.0);
        let b = particle(2, Vec2::ONE, 10.0);
        let (fa, _) = repulsion(&a, &b, 0.5);
        assert!(fa.is_nan());
    }

    #[test]
    fn test_rect_repulsion_least_axis() {
        let a = Particle::rectangle(ParticleId(1), Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Particle::rectangle(ParticleId(2), Vec2::new(18.0, 5.0), Vec2::new(10.0, 10.0));
        let (fa, fb) = repulsion(&a, &b, 1.0);
        // overlap x = 2, y = 15: separate along x
        assert_eq!(fb, Vec2::new(2.0, 0.0));
        assert_eq!(fa, Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn test_friction_threshold() {
        assert_eq!(friction(Vec2::new(0.01, 0.0), 0.1, 0.05), Vec2::ZERO);
        let f = friction(Vec2::new(2.0, 0.0), 0.1, 0.05);
        assert!((f.x + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_pull_bands() {
        let rel = PullRelationship {
            target: ParticleId(2),
            min_dist: 10.0,
            max_dist: 20.0,
            mult: 0.5,
        };
        let target = Vec2::ZERO;
        assert!(pull(Vec2::new(30.0, 0.0), target, &rel).x < 0.0);
        assert!(pull(Vec2::new(5.0, 0.0), target, &rel).x > 0.0);
        assert_eq!(pull(Vec2::new(15.0, 0.0), target, &rel), Vec2::ZERO);
    }

    #[test]
    fn test_attract_at_rest_when_coincident() {
        let rel = PullRelationship::attract(ParticleId(2), 1.0);
        assert_eq!(pull(Vec2::ONE, Vec2::ONE, &rel), Vec2::ZERO);
    }
}
