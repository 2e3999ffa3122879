//! Vector paths, paints and the drawing surface contract

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::color::Color;

/// One path segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    MoveTo(Vec2),
    LineTo(Vec2),
    CubicTo { c1: Vec2, c2: Vec2, to: Vec2 },
    /// Circular arc; angles in radians, counter-clockwise when `end > start`
    Arc {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
    },
    Close,
}

/// Ordered list of segments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Vec2) -> &mut Self {
        self.segments.push(PathSegment::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Vec2) -> &mut Self {
        self.segments.push(PathSegment::LineTo(p));
        self
    }

    pub fn cubic_to(&mut self, c1: Vec2, c2: Vec2, to: Vec2) -> &mut Self {
        self.segments.push(PathSegment::CubicTo { c1, c2, to });
        self
    }

    pub fn arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32) -> &mut Self {
        self.segments.push(PathSegment::Arc {
            center,
            radius,
            start,
            end,
        });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.segments.push(PathSegment::Close);
        self
    }

    /// Every point the path touches (endpoints and control points)
    pub fn points(&self) -> Vec<Vec2> {
        let mut out = Vec::new();
        for seg in &self.segments {
            match *seg {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => out.push(p),
                PathSegment::CubicTo { c1, c2, to } => out.extend([c1, c2, to]),
                PathSegment::Arc {
                    center,
                    radius,
                    start,
                    end,
                } => {
                    out.push(center + Vec2::from_angle(start) * radius);
                    out.push(center + Vec2::from_angle(end) * radius);
                }
                PathSegment::Close => {}
            }
        }
        out
    }

    pub fn is_finite(&self) -> bool {
        self.points().iter().all(|p| p.is_finite())
    }
}

/// Gradient stop
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

/// Fill/stroke paint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    Solid(Color),
    LinearGradient {
        start: Vec2,
        end: Vec2,
        stops: Vec<GradientStop>,
    },
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

/// Immediate-mode 2D drawing target supplied by the host
pub trait Surface {
    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, paint: &Paint);
    fn fill_path(&mut self, path: &Path, paint: &Paint);
    fn stroke_path(&mut self, path: &Path, width: f32, paint: &Paint);
}

/// Surface that draws nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn fill_circle(&mut self, _: Vec2, _: f32, _: &Paint) {}
    fn stroke_circle(&mut self, _: Vec2, _: f32, _: f32, _: &Paint) {}
    fn fill_path(&mut self, _: &Path, _: &Paint) {}
    fn stroke_path(&mut self, _: &Path, _: f32, _: &Paint) {}
}
