//! World state and core simulation types
//!
//! Everything the tick driver mutates lives here. Presentation reads it
//! through [`FrameSnapshot`](super::snapshot::FrameSnapshot).

use serde::{Deserialize, Serialize};

use super::agent::{Guard, Player};
use super::door::{Button, Door, GroupOverrides, Occluder};
use super::geom::{Circle, Polygon, Rect};
use super::scene::Scene;
use super::shadow::ShadowPolygon;
use crate::consts::MAX_GROUPS;
use crate::level::LevelData;
use crate::settings::Settings;

/// Top-level mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Play,
    /// Doors animate under manual overrides; agents are frozen
    Edit,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub mode: Mode,
    pub settings: Settings,
    pub player: Player,
    /// Stable order: level file order
    pub guards: Vec<Guard>,
    /// Walls, then polygons, then doors, each in level file order
    pub occluders: Vec<Occluder>,
    pub buttons: Vec<Button>,
    pub overrides: GroupOverrides,
    /// Guard bodies, rebuilt every tick after movement
    pub blockers: Vec<Circle>,
    /// Shadows cast from the player's eye this tick
    pub shadows: Vec<ShadowPolygon>,
    /// Some door changed geometry this tick
    pub door_changed: bool,
    /// Any guard sees the player
    pub seen: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl World {
    /// Empty world with a player at the origin
    pub fn new(settings: Settings) -> Self {
        Self {
            mode: Mode::Play,
            player: Player::new(glam::Vec2::ZERO, settings.player_speed),
            settings,
            guards: Vec::new(),
            occluders: Vec::new(),
            buttons: Vec::new(),
            overrides: [false; MAX_GROUPS],
            blockers: Vec::new(),
            shadows: Vec::new(),
            door_changed: false,
            seen: false,
            time_ticks: 0,
        }
    }

    /// Build a world from a validated level
    pub fn from_level(level: &LevelData, settings: Settings) -> Self {
        let mut world = Self::new(settings);
        world.player = Player::new(level.player_start, world.settings.player_speed);

        world.occluders.extend(
            level
                .walls
                .iter()
                .map(|w| Occluder::wall(Rect::new(w.x, w.y, w.w, w.h))),
        );
        world.occluders.extend(
            level
                .polygons
                .iter()
                .map(|verts| Occluder::polygon(Polygon::new(verts.iter().copied()))),
        );
        world.occluders.extend(level.doors.iter().map(|d| {
            let r = &d.rect;
            Occluder::door(Door::new(
                Rect::new(r.x, r.y, r.w, r.h),
                d.id,
                d.horizontal,
                d.flipped,
            ))
        }));

        world.buttons = level.buttons.iter().map(|b| Button::new(b.pos, b.id)).collect();
        world.guards = level
            .guards
            .iter()
            .map(|g| Guard::new(g.pos, g.dir, g.rotate_period_ms))
            .collect();
        world.rebuild_blockers();

        log::info!(
            "World built: {} occluders, {} guards, {} buttons",
            world.occluders.len(),
            world.guards.len(),
            world.buttons.len()
        );
        world
    }

    /// Switch modes. Entering play clears every override; entering edit
    /// clears detection and shadows, which only play mode computes.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        match mode {
            Mode::Play => self.overrides = [false; MAX_GROUPS],
            Mode::Edit => {
                self.seen = false;
                self.shadows.clear();
                for guard in &mut self.guards {
                    guard.sees_player = false;
                }
            }
        }
        log::info!("Mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) {
        let next = match self.mode {
            Mode::Play => Mode::Edit,
            Mode::Edit => Mode::Play,
        };
        self.set_mode(next);
    }

    /// Flip a group override. Out-of-range slots are ignored.
    pub fn toggle_override(&mut self, group: usize) -> bool {
        match self.overrides.get_mut(group) {
            Some(slot) => {
                *slot = !*slot;
                log::debug!("Override {} -> {}", group, *slot);
                true
            }
            None => false,
        }
    }

    pub fn rebuild_blockers(&mut self) {
        let radius = self.settings.guard_blocker_radius;
        self.blockers.clear();
        self.blockers.extend(self.guards.iter().map(|g| g.blocker(radius)));
    }

    /// Read-only view for ray queries
    pub fn scene(&self) -> Scene<'_> {
        Scene::new(&self.occluders, &self.blockers, self.settings.guards_block_sight)
    }

    pub fn doors(&self) -> impl Iterator<Item = &Door> {
        self.occluders.iter().filter_map(Occluder::as_door)
    }
}
