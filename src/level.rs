//! Level layout description
//!
//! Levels are plain JSON. [`LevelData::demo`] is the built-in layout used
//! when no file is given.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_GROUPS;
use crate::error::LevelError;
use crate::sim::geom::Polygon;

/// Axis-aligned rectangle as written in level files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectData {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl RectData {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    fn is_finite(&self) -> bool {
        [self.x, self.y, self.w, self.h].iter().all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorData {
    pub rect: RectData,
    /// Button group
    pub id: usize,
    #[serde(default)]
    pub horizontal: bool,
    #[serde(default)]
    pub flipped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardData {
    pub pos: Vec2,
    pub dir: Vec2,
    /// 0 = stationary
    #[serde(default)]
    pub rotate_period_ms: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonData {
    pub pos: Vec2,
    pub id: usize,
}

/// A complete level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub player_start: Vec2,
    #[serde(default)]
    pub walls: Vec<RectData>,
    /// Free-form occluders, one vertex list each
    #[serde(default)]
    pub polygons: Vec<Vec<Vec2>>,
    #[serde(default)]
    pub doors: Vec<DoorData>,
    #[serde(default)]
    pub guards: Vec<GuardData>,
    #[serde(default)]
    pub buttons: Vec<ButtonData>,
}

impl LevelData {
    /// Parse and validate level JSON
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        let level: LevelData = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Load a level from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let level = Self::from_json_str(&json)?;
        log::info!("Loaded level from {}", path.as_ref().display());
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if !self.player_start.is_finite() {
            return Err(LevelError::NonFinite {
                what: "player start".to_string(),
            });
        }

        for (index, wall) in self.walls.iter().enumerate() {
            if !wall.is_finite() {
                return Err(LevelError::NonFinite {
                    what: format!("wall {index}"),
                });
            }
            if wall.w < 0.0 || wall.h < 0.0 {
                return Err(LevelError::NegativeSize {
                    what: format!("wall {index}"),
                });
            }
        }

        for (index, verts) in self.polygons.iter().enumerate() {
            if !verts.iter().all(|v| v.is_finite()) {
                return Err(LevelError::NonFinite {
                    what: format!("polygon {index}"),
                });
            }
            let found = Polygon::new(verts.iter().copied()).len();
            if found < 3 {
                return Err(LevelError::DegeneratePolygon { index, found });
            }
        }

        for (index, door) in self.doors.iter().enumerate() {
            if !door.rect.is_finite() {
                return Err(LevelError::NonFinite {
                    what: format!("door {index}"),
                });
            }
            if door.rect.w < 0.0 || door.rect.h < 0.0 {
                return Err(LevelError::NegativeSize {
                    what: format!("door {index}"),
                });
            }
            check_group(format!("door {index}"), door.id)?;
        }

        for (index, button) in self.buttons.iter().enumerate() {
            if !button.pos.is_finite() {
                return Err(LevelError::NonFinite {
                    what: format!("button {index}"),
                });
            }
            check_group(format!("button {index}"), button.id)?;
        }

        for (index, guard) in self.guards.iter().enumerate() {
            if !(guard.pos.is_finite() && guard.dir.is_finite() && guard.rotate_period_ms.is_finite())
            {
                return Err(LevelError::NonFinite {
                    what: format!("guard {index}"),
                });
            }
        }
        Ok(())
    }

    /// Built-in layout: a corridor wall with two gated cells below it
    pub fn demo() -> Self {
        Self {
            player_start: Vec2::new(10.0, 10.0),
            walls: vec![
                RectData::new(140.0, 200.0, 400.0, 20.0),
                RectData::new(340.0, 240.0, 20.0, 100.0),
                RectData::new(440.0, 240.0, 20.0, 100.0),
                RectData::new(340.0, 320.0, 100.0, 20.0),
            ],
            polygons: Vec::new(),
            doors: vec![
                DoorData {
                    rect: RectData::new(345.0, 220.0, 10.0, 20.0),
                    id: 0,
                    horizontal: false,
                    flipped: true,
                },
                DoorData {
                    rect: RectData::new(445.0, 220.0, 10.0, 20.0),
                    id: 1,
                    horizontal: false,
                    flipped: true,
                },
            ],
            guards: vec![
                GuardData {
                    pos: Vec2::new(300.0, 300.0),
                    dir: Vec2::new(0.0, -1.0),
                    rotate_period_ms: 8.0,
                },
                GuardData {
                    pos: Vec2::new(550.0, 180.0),
                    dir: Vec2::new(0.0, 1.0),
                    rotate_period_ms: 0.0,
                },
            ],
            buttons: vec![
                ButtonData {
                    pos: Vec2::new(150.0, 230.0),
                    id: 1,
                },
                ButtonData {
                    pos: Vec2::new(370.0, 310.0),
                    id: 0,
                },
            ],
        }
    }
}

fn check_group(what: String, id: usize) -> Result<(), LevelError> {
    if id >= MAX_GROUPS {
        return Err(LevelError::GroupOutOfRange {
            what,
            id,
            max: MAX_GROUPS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_is_valid() {
        assert!(LevelData::demo().validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let demo = LevelData::demo();
        let back = LevelData::from_json_str(&demo.to_json().unwrap()).unwrap();
        assert_eq!(back, demo);
    }

    #[test]
    fn test_minimal_json() {
        let level = LevelData::from_json_str(r#"{ "player_start": [5.0, 6.0] }"#).unwrap();
        assert_eq!(level.player_start, Vec2::new(5.0, 6.0));
        assert!(level.walls.is_empty());
        assert!(level.guards.is_empty());
    }

    #[test]
    fn test_rejects_negative_wall() {
        let json = r#"{ "player_start": [0, 0], "walls": [{ "x": 0, "y": 0, "w": -1, "h": 5 }] }"#;
        let err = LevelData::from_json_str(json).unwrap_err();
        assert!(matches!(&err, LevelError::NegativeSize { what } if what == "wall 0"));
    }

    #[test]
    fn test_negative_door_is_named_as_door() {
        let json = r#"{
            "player_start": [0, 0],
            "walls": [{ "x": 0, "y": 0, "w": 5, "h": 5 }],
            "doors": [{ "rect": { "x": 10, "y": 0, "w": 10, "h": -20 }, "id": 0 }]
        }"#;
        let err = LevelData::from_json_str(json).unwrap_err();
        assert!(matches!(&err, LevelError::NegativeSize { what } if what == "door 0"));
        assert_eq!(err.to_string(), "door 0 has a negative size");
    }

    #[test]
    fn test_rejects_degenerate_polygon() {
        let json = r#"{ "player_start": [0, 0], "polygons": [[[0, 0], [1, 1], [1, 1], [0, 0]]] }"#;
        assert!(matches!(
            LevelData::from_json_str(json),
            Err(LevelError::DegeneratePolygon { index: 0, found: 2 })
        ));
    }

    #[test]
    fn test_rejects_group_out_of_range() {
        let mut level = LevelData::demo();
        level.buttons[0].id = MAX_GROUPS;
        assert!(matches!(
            level.validate(),
            Err(LevelError::GroupOutOfRange { id, .. }) if id == MAX_GROUPS
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut level = LevelData::demo();
        level.guards[1].pos.x = f32::NAN;
        assert!(matches!(level.validate(), Err(LevelError::NonFinite { .. })));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            LevelData::from_json_str("{"),
            Err(LevelError::Parse(_))
        ));
    }
}
