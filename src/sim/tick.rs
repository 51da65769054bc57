//! Fixed timestep simulation tick
//!
//! Within a tick every agent moves and resolves collisions, then buttons and
//! doors update, and only then is vision sampled. Vision therefore always
//! reads post-collision positions and this tick's door geometry.

use super::door::{Button, GroupOverrides, Occluder};
use super::scene::Scene;
use super::shadow::cast_shadows;
use super::state::{Mode, World};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Interact key held (buttons toggle on release)
    pub interact: bool,
    /// Switch between play and edit mode
    pub toggle_mode: bool,
    /// Edit mode only: flip this door group override
    pub toggle_override: Option<usize>,
}

impl TickInput {
    /// Right minus left
    pub fn turn(&self) -> f32 {
        self.turn_right as i32 as f32 - self.turn_left as i32 as f32
    }

    /// Forward minus backward
    pub fn throttle(&self) -> f32 {
        self.forward as i32 as f32 - self.backward as i32 as f32
    }
}

/// Advance the world by one tick of `delta_ms` milliseconds
pub fn tick(world: &mut World, input: &TickInput, delta_ms: f32) {
    let delta_ms = delta_ms.max(0.0);
    if input.toggle_mode {
        world.toggle_mode();
    }
    world.time_ticks += 1;

    match world.mode {
        Mode::Play => tick_play(world, input, delta_ms),
        Mode::Edit => tick_edit(world, input, delta_ms),
    }
}

fn tick_play(world: &mut World, input: &TickInput, delta_ms: f32) {
    // Movement
    let settings = &world.settings;
    let result = world.player.update(
        input.turn(),
        input.throttle(),
        delta_ms,
        settings.player_turn_rate,
        settings.agent_radius,
        &world.occluders,
    );
    if result.blocked {
        log::trace!("Player blocked, corrected by {:?}", result.correction);
    }
    for guard in &mut world.guards {
        guard.advance(delta_ms, settings.guard_rotate_step_deg);
    }

    // Buttons, then the doors they gate
    let player_pos = world.player.pos;
    for button in &mut world.buttons {
        if button.update(player_pos, input.interact) {
            log::debug!("Button {} -> {}", button.id, button.status);
        }
    }
    world.door_changed = update_doors(&mut world.occluders, &world.buttons, delta_ms, &world.overrides);
    world.rebuild_blockers();

    // Detection and vision
    let settings = &world.settings;
    let scene = Scene::new(&world.occluders, &world.blockers, settings.guards_block_sight);
    let rules = settings.detection();
    let mut seen = false;
    for guard in &mut world.guards {
        seen |= guard.detect(player_pos, &scene, &rules);
    }
    if seen != world.seen {
        log::info!("Player {}", if seen { "seen" } else { "hidden" });
    }
    world.seen = seen;

    let force = world.door_changed;
    let guard_params = settings.guard_vision();
    for guard in &mut world.guards {
        guard.refresh_vision(&scene, &guard_params, force);
    }
    world
        .player
        .refresh_vision(&scene, &settings.player_vision(), settings.player_xray, force);

    if settings.player_shadows {
        world.shadows = cast_shadows(player_pos, &world.occluders);
    } else {
        world.shadows.clear();
    }
}

fn tick_edit(world: &mut World, input: &TickInput, delta_ms: f32) {
    if let Some(group) = input.toggle_override {
        world.toggle_override(group);
    }
    world.door_changed = update_doors(&mut world.occluders, &world.buttons, delta_ms, &world.overrides);

    let settings = &world.settings;
    let scene = Scene::new(&world.occluders, &world.blockers, settings.guards_block_sight);
    let force = world.door_changed;
    let guard_params = settings.guard_vision();
    for guard in &mut world.guards {
        if guard.is_patrolling() {
            guard.refresh_panorama(
                &scene,
                settings.panorama_step_deg,
                settings.guard_view_distance,
                force,
            );
        } else {
            guard.refresh_vision(&scene, &guard_params, force);
        }
    }
}

/// Tick every occluder. Returns true when any door changed geometry.
fn update_doors(
    occluders: &mut [Occluder],
    buttons: &[Button],
    delta_ms: f32,
    overrides: &GroupOverrides,
) -> bool {
    let mut changed = false;
    for occluder in occluders.iter_mut() {
        changed |= occluder.update(buttons, delta_ms, overrides);
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{ButtonData, DoorData, GuardData, LevelData, RectData};
    use crate::settings::Settings;
    use crate::sim::door::DoorMovement;
    use crate::sim::snapshot::FrameSnapshot;
    use glam::Vec2;

    fn empty_level() -> LevelData {
        LevelData {
            player_start: Vec2::ZERO,
            walls: Vec::new(),
            polygons: Vec::new(),
            doors: Vec::new(),
            guards: Vec::new(),
            buttons: Vec::new(),
        }
    }

    fn gated_door_level() -> LevelData {
        LevelData {
            doors: vec![DoorData {
                rect: RectData::new(100.0, 0.0, 10.0, 20.0),
                id: 0,
                horizontal: false,
                flipped: false,
            }],
            buttons: vec![
                ButtonData {
                    pos: Vec2::new(500.0, 500.0),
                    id: 0,
                },
                ButtonData {
                    pos: Vec2::new(600.0, 500.0),
                    id: 0,
                },
            ],
            ..empty_level()
        }
    }

    fn door_position(world: &World) -> f32 {
        world.doors().next().map(|d| d.position).unwrap_or(f32::NAN)
    }

    #[test]
    fn test_button_gated_door_opens_over_one_second() {
        let mut world = World::from_level(&gated_door_level(), Settings::default());
        let input = TickInput::default();

        // Closed and idle while the buttons are up
        tick(&mut world, &input, 1.0);
        assert_eq!(door_position(&world), 1.0);
        assert!(!world.door_changed);

        for button in &mut world.buttons {
            button.status = true;
        }
        let mut last = door_position(&world);
        for i in 0..1000 {
            tick(&mut world, &input, 1.0);
            let pos = door_position(&world);
            assert!(pos < last, "tick {i}: {pos} !< {last}");
            assert!(world.door_changed);
            last = pos;
        }
        assert_eq!(door_position(&world), 0.0);
        assert_eq!(
            world.doors().next().map(|d| d.movement),
            Some(DoorMovement::Static)
        );

        tick(&mut world, &input, 1.0);
        assert!(!world.door_changed);
    }

    #[test]
    fn test_one_button_up_keeps_door_closed() {
        let mut world = World::from_level(&gated_door_level(), Settings::default());
        world.buttons[0].status = true;
        for _ in 0..100 {
            tick(&mut world, &TickInput::default(), 10.0);
        }
        assert_eq!(door_position(&world), 1.0);
    }

    #[test]
    fn test_edit_mode_override_opens_and_freezes_agents() {
        let mut world = World::from_level(&gated_door_level(), Settings::default());
        tick(
            &mut world,
            &TickInput {
                toggle_mode: true,
                toggle_override: Some(0),
                ..Default::default()
            },
            1.0,
        );
        assert_eq!(world.mode, Mode::Edit);
        assert!(world.overrides[0]);

        let held = TickInput {
            forward: true,
            turn_left: true,
            ..Default::default()
        };
        for _ in 0..1100 {
            tick(&mut world, &held, 1.0);
        }
        assert_eq!(door_position(&world), 0.0);
        assert_eq!(world.player.pos, Vec2::ZERO);
        assert_eq!(world.player.dir, Vec2::new(0.0, -1.0));

        // Back to play: override cleared, door closes again
        tick(
            &mut world,
            &TickInput {
                toggle_mode: true,
                ..Default::default()
            },
            1.0,
        );
        assert_eq!(world.mode, Mode::Play);
        assert!(!world.overrides[0]);
        assert!(door_position(&world) > 0.0);
    }

    #[test]
    fn test_guard_detection_through_tick() {
        let mut level = empty_level();
        level.player_start = Vec2::new(50.0, 0.0);
        level.guards.push(GuardData {
            pos: Vec2::ZERO,
            dir: Vec2::X,
            rotate_period_ms: 0.0,
        });
        let mut world = World::from_level(&level, Settings::default());
        tick(&mut world, &TickInput::default(), 16.0);
        assert!(world.seen);
        assert!(world.guards[0].sees_player);

        // Edit mode does not report stale detection
        tick(
            &mut world,
            &TickInput {
                toggle_mode: true,
                ..Default::default()
            },
            16.0,
        );
        assert!(!world.seen);
        assert!(!FrameSnapshot::capture(&world).seen);

        level.walls.push(RectData::new(20.0, -10.0, 5.0, 20.0));
        let mut world = World::from_level(&level, Settings::default());
        tick(&mut world, &TickInput::default(), 16.0);
        assert!(!world.seen);
    }

    #[test]
    fn test_opening_door_refreshes_static_player_vision() {
        // A door with no buttons opens on its own
        let mut level = empty_level();
        level.doors.push(DoorData {
            rect: RectData::new(40.0, -10.0, 10.0, 20.0),
            id: 0,
            horizontal: false,
            flipped: false,
        });
        let mut world = World::from_level(&level, Settings::default());
        world.player.dir = Vec2::X;

        let input = TickInput::default();
        tick(&mut world, &input, 0.0);
        let center = world.player.vision.distances().len() / 2;
        assert!((world.player.vision.distances()[center] - 40.0).abs() < 1e-3);

        for _ in 0..1100 {
            tick(&mut world, &input, 1.0);
        }
        let view = world.settings.player_view_distance;
        assert!((world.player.vision.distances()[center] - view).abs() < 1e-3);
    }

    #[test]
    fn test_vision_reads_post_collision_position() {
        let mut world = World::from_level(&LevelData::demo(), Settings::default());
        let input = TickInput {
            forward: true,
            turn_right: true,
            ..Default::default()
        };
        for _ in 0..200 {
            tick(&mut world, &input, 16.0);
        }
        let params = world.settings.player_vision();
        let expected = world.scene().sample_fan(
            world.player.pos,
            world.player.dir,
            params.fov_deg,
            params.ray_count,
            params.max_distance,
        );
        assert_eq!(world.player.vision.distances(), expected.as_slice());
    }

    #[test]
    fn test_shadows_follow_setting() {
        let mut world = World::from_level(&LevelData::demo(), Settings::default());
        tick(&mut world, &TickInput::default(), 16.0);
        assert!(!world.shadows.is_empty());

        let mut settings = Settings::default();
        settings.player_shadows = false;
        let mut world = World::from_level(&LevelData::demo(), settings);
        tick(&mut world, &TickInput::default(), 16.0);
        assert!(world.shadows.is_empty());
    }

    #[test]
    fn test_determinism() {
        let mut a = World::from_level(&LevelData::demo(), Settings::default());
        let mut b = World::from_level(&LevelData::demo(), Settings::default());

        let inputs = [
            TickInput {
                forward: true,
                ..Default::default()
            },
            TickInput {
                forward: true,
                turn_right: true,
                ..Default::default()
            },
            TickInput {
                backward: true,
                turn_left: true,
                interact: true,
                ..Default::default()
            },
        ];
        for i in 0..600 {
            let input = &inputs[(i / 50) % inputs.len()];
            tick(&mut a, input, 16.0);
            tick(&mut b, input, 16.0);
        }

        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.player.dir, b.player.dir);
        assert_eq!(a.seen, b.seen);
        for (ga, gb) in a.guards.iter().zip(&b.guards) {
            assert_eq!(ga.dir, gb.dir);
            assert_eq!(ga.vision.distances(), gb.vision.distances());
        }
        assert_eq!(a.shadows, b.shadows);
    }
}
