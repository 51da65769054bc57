//! Vision and movement tuning
//!
//! Loaded from JSON; every field falls back to the built-in default so a
//! settings file only needs to list what it changes.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::sim::agent::{DetectionRules, VisionParams};

/// Vision fan resolution preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Ray count multiplier for rendered vision fans
    ///
    /// Detection uses a direct line-of-sight ray, so this never changes
    /// gameplay.
    pub fn ray_multiplier(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 2.0,
        }
    }
}

/// Tuning values for agents and vision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityPreset,

    // === Player ===
    pub player_speed: f32,
    /// Degrees per millisecond of held turn input
    pub player_turn_rate: f32,
    pub player_fov_deg: f32,
    pub player_ray_count: usize,
    pub player_view_distance: f32,
    /// See through walls (debug)
    pub player_xray: bool,
    /// Compute shadow polygons from the player's eye each tick
    pub player_shadows: bool,

    // === Guards ===
    pub guard_fov_deg: f32,
    pub guard_ray_count: usize,
    pub guard_view_distance: f32,
    pub guard_rotate_step_deg: f32,
    pub detection_range: f32,
    pub point_blank_radius: f32,
    /// Editor panorama resolution for patrolling guards
    pub panorama_step_deg: f32,

    // === Bodies ===
    pub agent_radius: f32,
    pub guard_blocker_radius: f32,
    /// Let guard bodies stop sight rays (off: guards are see-through)
    pub guards_block_sight: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            player_speed: PLAYER_SPEED,
            player_turn_rate: PLAYER_TURN_DEG_PER_MS,
            player_fov_deg: PLAYER_FOV_DEG,
            player_ray_count: PLAYER_RAY_COUNT,
            player_view_distance: PLAYER_VIEW_DISTANCE,
            player_xray: false,
            player_shadows: true,

            guard_fov_deg: GUARD_FOV_DEG,
            guard_ray_count: GUARD_RAY_COUNT,
            guard_view_distance: GUARD_VIEW_DISTANCE,
            guard_rotate_step_deg: GUARD_ROTATE_STEP_DEG,
            detection_range: DETECTION_RANGE,
            point_blank_radius: POINT_BLANK_RADIUS,
            panorama_step_deg: 1.0,

            agent_radius: AGENT_RADIUS,
            guard_blocker_radius: GUARD_BLOCKER_RADIUS,
            guards_block_sight: false,
        }
    }
}

impl Settings {
    /// Settings with a quality preset applied
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse and validate settings JSON
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("player_speed", self.player_speed),
            ("player_view_distance", self.player_view_distance),
            ("guard_view_distance", self.guard_view_distance),
            ("detection_range", self.detection_range),
            ("panorama_step_deg", self.panorama_step_deg),
            ("agent_radius", self.agent_radius),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        for (field, fov) in [
            ("player_fov_deg", self.player_fov_deg),
            ("guard_fov_deg", self.guard_fov_deg),
        ] {
            if !(fov > 0.0 && fov <= 360.0) {
                return Err(SettingsError::Invalid {
                    field,
                    reason: format!("must be in (0, 360], got {fov}"),
                });
            }
        }
        for (field, count) in [
            ("player_ray_count", self.player_ray_count),
            ("guard_ray_count", self.guard_ray_count),
        ] {
            if count == 0 {
                return Err(SettingsError::Invalid {
                    field,
                    reason: "needs at least one ray".to_string(),
                });
            }
        }
        if !(self.point_blank_radius >= 0.0) {
            return Err(SettingsError::Invalid {
                field: "point_blank_radius",
                reason: format!("must not be negative, got {}", self.point_blank_radius),
            });
        }
        Ok(())
    }

    fn scaled_rays(&self, count: usize) -> usize {
        ((count as f32 * self.quality.ray_multiplier()).round() as usize).max(1)
    }

    /// Player vision fan parameters
    pub fn player_vision(&self) -> VisionParams {
        VisionParams {
            fov_deg: self.player_fov_deg,
            ray_count: self.scaled_rays(self.player_ray_count),
            max_distance: self.player_view_distance,
        }
    }

    /// Guard vision fan parameters
    pub fn guard_vision(&self) -> VisionParams {
        VisionParams {
            fov_deg: self.guard_fov_deg,
            ray_count: self.scaled_rays(self.guard_ray_count),
            max_distance: self.guard_view_distance,
        }
    }

    pub fn detection(&self) -> DetectionRules {
        DetectionRules::new(self.guard_fov_deg, self.detection_range, self.point_blank_radius)
    }

    /// Scale that maps the player's view distance onto half the viewport diagonal
    ///
    /// Presentation only: world-space results never depend on it.
    pub fn view_scale(&self, viewport: Vec2) -> f32 {
        (viewport.length() * 0.5) / self.player_view_distance
    }
}
