//! Read-only per-tick outputs for the presentation layer

use glam::Vec2;
use serde::Serialize;

use super::door::DoorMovement;
use super::geom::Rect;
use super::shadow::ShadowPolygon;
use super::state::{Mode, World};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardView {
    pub pos: Vec2,
    pub dir: Vec2,
    pub sees_player: bool,
    /// Fan polygon: position, then ray end points
    pub visibility: Vec<Vec2>,
    /// Edit mode, patrolling guards only
    pub panorama: Option<Vec<Vec2>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoorView {
    pub id: usize,
    pub rect: Rect,
    pub position: f32,
    pub movement: DoorMovement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonView {
    pub id: usize,
    pub pos: Vec2,
    pub status: bool,
}

/// Everything a renderer needs for one frame, in world space
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub mode: Mode,
    pub player_pos: Vec2,
    pub player_dir: Vec2,
    /// Clockwise from screen-up, for camera rotation
    pub player_heading_deg: f32,
    pub player_visibility: Vec<Vec2>,
    pub shadows: Vec<ShadowPolygon>,
    pub guards: Vec<GuardView>,
    pub doors: Vec<DoorView>,
    pub buttons: Vec<ButtonView>,
    /// Any guard sees the player
    pub seen: bool,
}

impl FrameSnapshot {
    pub fn capture(world: &World) -> Self {
        let settings = &world.settings;
        let guard_params = settings.guard_vision();
        let edit = world.mode == Mode::Edit;

        let guards = world
            .guards
            .iter()
            .map(|g| GuardView {
                pos: g.pos,
                dir: g.dir,
                sees_player: g.sees_player,
                visibility: g.visibility_polygon(&guard_params),
                panorama: (edit && g.is_patrolling())
                    .then(|| g.panorama_polygon(settings.panorama_step_deg)),
            })
            .collect();

        let doors = world
            .doors()
            .map(|d| DoorView {
                id: d.id,
                rect: d.current_rect(),
                position: d.position,
                movement: d.movement,
            })
            .collect();

        let buttons = world
            .buttons
            .iter()
            .map(|b| ButtonView {
                id: b.id,
                pos: b.pos,
                status: b.status,
            })
            .collect();

        Self {
            tick: world.time_ticks,
            mode: world.mode,
            player_pos: world.player.pos,
            player_dir: world.player.dir,
            player_heading_deg: world.player.heading_deg(),
            player_visibility: world.player.visibility_polygon(&settings.player_vision()),
            shadows: world.shadows.clone(),
            guards,
            doors,
            buttons,
            seen: world.seen,
        }
    }
}
