//! Rendering module
//!
//! Drawing goes through the [`Surface`] trait so the engine has no opinion on
//! the backend. [`Recorder`] captures draw calls for tests and JSON dumps.

pub mod color;
pub mod metaball;
pub mod path;
pub mod recorder;

pub use color::Color;
pub use metaball::Metaball;
pub use path::{GradientStop, NullSurface, Paint, Path, PathSegment, Surface};
pub use recorder::{DrawCommand, Recorder};
