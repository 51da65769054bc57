//! Occluders, doors and the buttons that gate them
//!
//! Walls and doors share one tagged occluder type. A door is a wall whose
//! rectangle shrinks along one axis as it opens; all buttons sharing the
//! door's id must be pressed (or the group overridden) for it to open.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{Polygon, Rect, Shape};
use crate::consts::{BUTTON_REACH, DOOR_TRAVEL_MS, MAX_GROUPS};

/// Per-group manual override (editor/debug), indexed by group id
pub type GroupOverrides = [bool; MAX_GROUPS];

/// Snap tolerance so accumulated per-tick steps land exactly on a bound
const DOOR_SNAP_EPSILON: f32 = 1e-4;

/// A floor button
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Button {
    pub id: usize,
    pub pos: Vec2,
    /// Pressed state
    pub status: bool,
    /// Latched while the interact key is held in reach; toggles on release
    pub used: bool,
}

impl Button {
    pub fn new(pos: Vec2, id: usize) -> Self {
        Self {
            id,
            pos,
            status: false,
            used: false,
        }
    }

    /// Apply one tick of interaction. Returns true when `status` toggled.
    pub fn update(&mut self, player_pos: Vec2, interact_held: bool) -> bool {
        if player_pos.distance_squared(self.pos) > BUTTON_REACH * BUTTON_REACH {
            return false;
        }
        if !interact_held && self.used {
            self.status = !self.status;
            self.used = false;
            return true;
        }
        if interact_held {
            self.used = true;
        }
        false
    }
}

/// Door animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoorMovement {
    #[default]
    Static,
    Opening,
    Closing,
}

/// An animated door
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Door {
    /// Button group id
    pub id: usize,
    /// Fully closed rectangle
    pub base: Rect,
    /// Shrinks along x when true, along y otherwise
    pub horizontal: bool,
    /// Anchor the shrinking edge at the far side instead of the origin side
    pub flipped: bool,
    /// 0 = fully open, 1 = fully closed
    pub position: f32,
    pub movement: DoorMovement,
}

impl Door {
    pub fn new(base: Rect, id: usize, horizontal: bool, flipped: bool) -> Self {
        Self {
            id,
            base,
            horizontal,
            flipped,
            position: 1.0,
            movement: DoorMovement::Static,
        }
    }

    /// Every button in this door's group is pressed, or the group is overridden
    ///
    /// A door with no buttons counts as pressed.
    pub fn group_pressed(&self, buttons: &[Button], overrides: &GroupOverrides) -> bool {
        let overridden = overrides.get(self.id).copied().unwrap_or(false);
        buttons
            .iter()
            .filter(|b| b.id == self.id)
            .all(|b| b.status || overridden)
    }

    /// Advance one tick: pick a direction, then animate toward it
    pub fn update(&mut self, buttons: &[Button], delta_ms: f32, overrides: &GroupOverrides) {
        let before = self.movement;
        if self.group_pressed(buttons, overrides) {
            if self.movement != DoorMovement::Opening && self.position != 0.0 {
                self.movement = DoorMovement::Opening;
            }
        } else if self.movement != DoorMovement::Closing && self.position != 1.0 {
            self.movement = DoorMovement::Closing;
        }
        if before != self.movement {
            log::debug!("Door {} {:?} -> {:?}", self.id, before, self.movement);
        }

        let step = delta_ms.max(0.0) / DOOR_TRAVEL_MS;
        match self.movement {
            DoorMovement::Closing => {
                self.position += step;
                if self.position >= 1.0 - DOOR_SNAP_EPSILON {
                    self.position = 1.0;
                    self.movement = DoorMovement::Static;
                }
            }
            DoorMovement::Opening => {
                self.position -= step;
                if self.position <= DOOR_SNAP_EPSILON {
                    self.position = 0.0;
                    self.movement = DoorMovement::Static;
                }
            }
            DoorMovement::Static => {}
        }
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.movement != DoorMovement::Static
    }

    /// Collision rectangle at the current door position
    pub fn current_rect(&self) -> Rect {
        let mut rect = self.base;
        let p = self.position;
        if self.horizontal {
            rect.size.x = self.base.size.x * p;
            if self.flipped {
                rect.min.x = self.base.min.x + self.base.size.x * (1.0 - p);
            }
        } else {
            rect.size.y = self.base.size.y * p;
            if self.flipped {
                rect.min.y = self.base.min.y + self.base.size.y * (1.0 - p);
            }
        }
        rect
    }
}

/// Occluder variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OccluderKind {
    Plain,
    Door(Door),
}

/// Anything that blocks sight, light and movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occluder {
    shape: Shape,
    kind: OccluderKind,
}

impl Occluder {
    pub fn wall(rect: Rect) -> Self {
        Self {
            shape: Shape::Rect(rect),
            kind: OccluderKind::Plain,
        }
    }

    pub fn polygon(poly: Polygon) -> Self {
        Self {
            shape: Shape::Polygon(poly),
            kind: OccluderKind::Plain,
        }
    }

    pub fn door(door: Door) -> Self {
        Self {
            shape: Shape::Rect(door.current_rect()),
            kind: OccluderKind::Door(door),
        }
    }

    /// Current geometry
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn as_door(&self) -> Option<&Door> {
        match &self.kind {
            OccluderKind::Door(door) => Some(door),
            OccluderKind::Plain => None,
        }
    }

    /// Tick the occluder. Returns true when its geometry changed.
    pub fn update(&mut self, buttons: &[Button], delta_ms: f32, overrides: &GroupOverrides) -> bool {
        match &mut self.kind {
            OccluderKind::Plain => false,
            OccluderKind::Door(door) => {
                door.update(buttons, delta_ms, overrides);
                let rect = Shape::Rect(door.current_rect());
                let changed = rect != self.shape;
                self.shape = rect;
                changed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NO_OVERRIDES: GroupOverrides = [false; MAX_GROUPS];

    fn door() -> Door {
        Door::new(Rect::new(345.0, 220.0, 10.0, 20.0), 0, false, true)
    }

    #[test]
    fn test_button_toggles_on_release() {
        let mut b = Button::new(Vec2::new(10.0, 10.0), 0);
        assert!(!b.update(Vec2::new(12.0, 10.0), true));
        assert!(b.used);
        assert!(!b.status);
        assert!(b.update(Vec2::new(12.0, 10.0), false));
        assert!(b.status);
        assert!(!b.used);
        // Holding again then releasing toggles back
        b.update(Vec2::new(12.0, 10.0), true);
        b.update(Vec2::new(12.0, 10.0), false);
        assert!(!b.status);
    }

    #[test]
    fn test_button_out_of_reach_ignored() {
        let mut b = Button::new(Vec2::ZERO, 0);
        b.update(Vec2::new(20.0, 0.0), true);
        assert!(!b.used);
    }

    #[test]
    fn test_closed_door_stays_static_without_buttons_pressed() {
        let mut d = door();
        let buttons = [Button::new(Vec2::ZERO, 0), Button::new(Vec2::ONE, 0)];
        for _ in 0..10 {
            d.update(&buttons, 1.0, &NO_OVERRIDES);
        }
        assert_eq!(d.position, 1.0);
        assert_eq!(d.movement, DoorMovement::Static);
    }

    #[test]
    fn test_button_gated_door_opens_in_one_second() {
        let mut d = door();
        let mut buttons = [Button::new(Vec2::ZERO, 0), Button::new(Vec2::ONE, 0)];
        d.update(&buttons, 1.0, &NO_OVERRIDES);
        assert_eq!(d.movement, DoorMovement::Static);

        for b in &mut buttons {
            b.status = true;
        }
        let mut last = d.position;
        for i in 0..1000 {
            d.update(&buttons, 1.0, &NO_OVERRIDES);
            assert!(d.position <= last);
            last = d.position;
            if i == 0 {
                assert_eq!(d.movement, DoorMovement::Opening);
            }
        }
        assert_eq!(d.position, 0.0);
        assert_eq!(d.movement, DoorMovement::Static);
    }

    #[test]
    fn test_one_unpressed_button_keeps_door_closed() {
        let mut d = door();
        let mut buttons = [Button::new(Vec2::ZERO, 0), Button::new(Vec2::ONE, 0)];
        buttons[0].status = true;
        d.update(&buttons, 100.0, &NO_OVERRIDES);
        assert_eq!(d.position, 1.0);
    }

    #[test]
    fn test_override_opens_group() {
        let mut d = door();
        let buttons = [Button::new(Vec2::ZERO, 0)];
        let mut overrides = NO_OVERRIDES;
        overrides[0] = true;
        d.update(&buttons, 400.0, &overrides);
        assert!((d.position - 0.6).abs() < 1e-5);
        assert_eq!(d.movement, DoorMovement::Opening);
    }

    #[test]
    fn test_other_group_buttons_ignored() {
        let d = door();
        let buttons = [Button::new(Vec2::ZERO, 1)];
        // No buttons in group 0: vacuously pressed
        assert!(d.group_pressed(&buttons, &NO_OVERRIDES));
    }

    #[test]
    fn test_current_rect_shrinks_and_flips() {
        let mut d = Door::new(Rect::new(0.0, 0.0, 10.0, 20.0), 0, false, false);
        d.position = 0.5;
        let r = d.current_rect();
        assert_eq!(r.min, Vec2::ZERO);
        assert_eq!(r.size, Vec2::new(10.0, 10.0));

        d.flipped = true;
        let r = d.current_rect();
        assert_eq!(r.min, Vec2::new(0.0, 10.0));
        assert_eq!(r.bottom(), 20.0);

        d.horizontal = true;
        d.position = 0.25;
        let r = d.current_rect();
        assert!((r.min.x - 7.5).abs() < 1e-6);
        assert!((r.size.x - 2.5).abs() < 1e-6);
        assert_eq!(r.size.y, 20.0);
    }

    #[test]
    fn test_occluder_update_tracks_door_rect() {
        let mut occ = Occluder::door(door());
        let buttons: [Button; 0] = [];
        let changed = occ.update(&buttons, 500.0, &NO_OVERRIDES);
        assert!(changed);
        assert!(occ.as_door().is_some_and(Door::is_moving));
        match occ.shape() {
            Shape::Rect(r) => assert!((r.size.y - 10.0).abs() < 1e-4),
            Shape::Polygon(_) => panic!("door must stay rectangular"),
        }
        let mut wall = Occluder::wall(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert!(!wall.update(&buttons, 500.0, &NO_OVERRIDES));
    }

    proptest! {
        #[test]
        fn prop_door_position_stays_in_bounds(
            steps in proptest::collection::vec((any::<bool>(), 0.0f32..250.0), 1..200),
        ) {
            let mut d = door();
            let mut buttons = [Button::new(Vec2::ZERO, 0)];
            for (pressed, delta) in steps {
                buttons[0].status = pressed;
                d.update(&buttons, delta, &NO_OVERRIDES);
                prop_assert!((0.0..=1.0).contains(&d.position));
            }
        }

        #[test]
        fn prop_door_converges_to_target(pressed in any::<bool>(), delta in 1.0f32..50.0) {
            let mut d = door();
            d.position = 0.5;
            let mut buttons = [Button::new(Vec2::ZERO, 0)];
            buttons[0].status = pressed;
            for _ in 0..(2000.0 / delta) as usize + 2 {
                d.update(&buttons, delta, &NO_OVERRIDES);
            }
            prop_assert_eq!(d.position, if pressed { 0.0 } else { 1.0 });
            prop_assert_eq!(d.movement, DoorMovement::Static);
        }
    }
}
