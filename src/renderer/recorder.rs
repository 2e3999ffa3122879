//! Surface that records draw calls
//!
//! Used by tests and by the demo binary to dump frames as JSON.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::path::{Paint, Path, Surface};

/// One recorded draw call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    FillCircle {
        center: Vec2,
        radius: f32,
        paint: Paint,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        width: f32,
        paint: Paint,
    },
    FillPath {
        path: Path,
        paint: Paint,
    },
    StrokePath {
        path: Path,
        width: f32,
        paint: Paint,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recorder {
    pub commands: Vec<DrawCommand>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything recorded so far (call between frames)
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn filled_circles(&self) -> impl Iterator<Item = (Vec2, f32, &Paint)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillCircle {
                center,
                radius,
                paint,
            } => Some((*center, *radius, paint)),
            _ => None,
        })
    }

    pub fn filled_paths(&self) -> impl Iterator<Item = (&Path, &Paint)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillPath { path, paint } => Some((path, paint)),
            _ => None,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Surface for Recorder {
    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            paint: paint.clone(),
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, paint: &Paint) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            width,
            paint: paint.clone(),
        });
    }

    fn fill_path(&mut self, path: &Path, paint: &Paint) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            paint: paint.clone(),
        });
    }

    fn stroke_path(&mut self, path: &Path, width: f32, paint: &Paint) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            width,
            paint: paint.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Color;

    #[test]
    fn test_records_in_order_and_dumps_json() {
        let mut rec = Recorder::new();
        let paint = Paint::Solid(Color::RED);
        rec.fill_circle(Vec2::ZERO, 10.0, &paint);
        let mut path = Path::new();
        path.move_to(Vec2::ZERO).line_to(Vec2::X).close();
        rec.fill_path(&path, &paint);
        rec.stroke_circle(Vec2::ONE, 5.0, 2.0, &paint);

        assert_eq!(rec.commands.len(), 3);
        assert_eq!(rec.filled_circles().count(), 1);
        assert_eq!(rec.filled_paths().next().map(|(p, _)| p), Some(&path));

        let json = rec.to_json().unwrap();
        let back: Recorder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.commands, rec.commands);

        rec.clear();
        assert!(rec.commands.is_empty());
    }
}
