//! Engine tunables
//!
//! Loaded from JSON or built from a motion preset.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;

/// How eagerly transitions play out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MotionPreset {
    Gentle,
    #[default]
    Normal,
    Snappy,
}

impl MotionPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionPreset::Gentle => "Gentle",
            MotionPreset::Normal => "Normal",
            MotionPreset::Snappy => "Snappy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gentle" | "slow" => Some(MotionPreset::Gentle),
            "normal" => Some(MotionPreset::Normal),
            "snappy" | "fast" => Some(MotionPreset::Snappy),
            _ => None,
        }
    }

    /// Multiplier applied to merge/split pull strengths
    pub fn pull_scale(&self) -> f32 {
        match self {
            MotionPreset::Gentle => 0.5,
            MotionPreset::Normal => 1.0,
            MotionPreset::Snappy => 2.0,
        }
    }

    /// Multiplier applied to motion friction
    pub fn friction_scale(&self) -> f32 {
        match self {
            MotionPreset::Gentle => 1.5,
            MotionPreset::Normal => 1.0,
            MotionPreset::Snappy => 0.75,
        }
    }
}

/// Per-simulator force constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimTunables {
    /// Velocity damping factor applied above `friction_velocity`
    pub friction: f32,
    /// Speed below which friction is not applied
    pub friction_velocity: f32,
    /// Speed clamp
    pub max_velocity: f32,
    /// Pairwise repulsion strength
    pub object_push: f32,
    /// Push radius for participants spawned without one
    pub default_child_radius: f32,
    /// Containment strength of the boundary
    pub boundary_force: f32,
}

impl Default for SimTunables {
    fn default() -> Self {
        Self {
            friction: FRICTION,
            friction_velocity: FRICTION_VELOCITY,
            max_velocity: MAX_VELOCITY,
            object_push: OBJECT_PUSH,
            default_child_radius: DEFAULT_CHILD_RADIUS,
            boundary_force: BOUNDARY_FORCE,
        }
    }
}

impl SimTunables {
    /// Tunables for the simulator that moves blob centers
    pub fn motion() -> Self {
        Self {
            friction: 0.15,
            friction_velocity: 0.01,
            max_velocity: 12.0,
            // Blob centers never push each other; only transition pulls move them
            object_push: 0.0,
            default_child_radius: DEFAULT_CHILD_RADIUS,
            boundary_force: 0.0,
        }
    }
}

/// Blob field behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobSettings {
    /// Exponent E of `radius = (Σ r^E)^(1/E)`
    pub radius_growth_exponent: f32,
    /// Gap between the two strokes of a double border
    pub double_border_gap: f32,
    /// Stroke width used for outlines
    pub stroke_width: f32,
    /// Fraction of the lens half-angle given to each bezier bridge
    pub bridge_spread: f32,
    /// Bezier handle length relative to the bridge chord
    pub bridge_handle: f32,
    /// Attraction strength between merging centers
    pub merge_pull: f32,
    /// Repulsion strength between splitting centers
    pub split_pull: f32,
    /// Extra distance past full separation the split pull aims for
    pub split_margin: f32,
}

impl Default for BlobSettings {
    fn default() -> Self {
        Self {
            radius_growth_exponent: RADIUS_GROWTH_EXPONENT,
            double_border_gap: 6.0,
            stroke_width: 2.0,
            bridge_spread: 0.35,
            bridge_handle: 0.4,
            merge_pull: 0.004,
            split_pull: 0.004,
            split_margin: 40.0,
        }
    }
}

/// Complete engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub preset: MotionPreset,
    /// Tunables for participant simulators (one per blob)
    pub simulator: SimTunables,
    /// Tunables for the blob-center simulator
    pub motion: SimTunables,
    pub blobs: BlobSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: MotionPreset::Normal,
            simulator: SimTunables::default(),
            motion: SimTunables::motion(),
            blobs: BlobSettings::default(),
        }
    }
}

impl Settings {
    /// Settings with preset-scaled pulls and motion friction
    pub fn from_preset(preset: MotionPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a preset on top of the base constants
    pub fn apply_preset(&mut self, preset: MotionPreset) {
        let base = BlobSettings::default();
        self.preset = preset;
        self.blobs.merge_pull = base.merge_pull * preset.pull_scale();
        self.blobs.split_pull = base.split_pull * preset.pull_scale();
        self.motion.friction = SimTunables::motion().friction * preset.friction_scale();
    }

    /// Parse settings; the preset then owns pull strengths and motion friction
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.apply_preset(settings.preset);
        log::debug!("Loaded settings from JSON ({} preset)", settings.preset.as_str());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{ "blobs": { "radius_growth_exponent": 3.0 } }"#).unwrap();
        assert_eq!(settings.blobs.radius_growth_exponent, 3.0);
        assert_eq!(settings.blobs.split_margin, BlobSettings::default().split_margin);
        assert_eq!(settings.simulator, SimTunables::default());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = Settings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn test_preset_scales_pulls() {
        let snappy = Settings::from_preset(MotionPreset::Snappy);
        let normal = Settings::from_preset(MotionPreset::Normal);
        assert!(snappy.blobs.merge_pull > normal.blobs.merge_pull);
        assert!(snappy.motion.friction < normal.motion.friction);
        assert_eq!(MotionPreset::parse("FAST"), Some(MotionPreset::Snappy));
    }

    #[test]
    fn test_json_preset_scales_pulls() {
        let settings = Settings::from_json(r#"{ "preset": "Snappy" }"#).unwrap();
        assert_eq!(settings, Settings::from_preset(MotionPreset::Snappy));
        assert!(settings.blobs.merge_pull > BlobSettings::default().merge_pull);
    }

    #[test]
    fn test_motion_centers_do_not_repel() {
        assert_eq!(SimTunables::motion().object_push, 0.0);
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = Settings::from_preset(MotionPreset::Gentle);
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }
}
