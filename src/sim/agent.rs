//! Vision agents: the player and the guards
//!
//! Agents own a position, a unit heading and a memoized array of per-ray
//! visibility distances. The array is recomputed only when the agent's pose
//! changed or a door moved this tick.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{MoveResult, move_axis_separated};
use super::door::Occluder;
use super::geom::Circle;
use super::scene::{Scene, fan_polygon, panorama_polygon};
use crate::{angle_between_deg, rotate_deg};

/// Movement distance per millisecond per unit of agent speed
pub const SPEED_SCALE_PER_MS: f32 = 30.0 / 1000.0;

/// Fan of rays an agent samples each refresh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisionParams {
    pub fov_deg: f32,
    pub ray_count: usize,
    pub max_distance: f32,
}

/// Guard detection thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionRules {
    /// cos(FOV / 2)
    pub min_facing_cos: f32,
    pub range: f32,
    pub point_blank: f32,
}

impl DetectionRules {
    pub fn new(fov_deg: f32, range: f32, point_blank: f32) -> Self {
        Self {
            min_facing_cos: (fov_deg * 0.5).to_radians().cos(),
            range,
            point_blank,
        }
    }
}

/// Memoized vision distances keyed by the pose they were computed for
#[derive(Debug, Clone, Default)]
pub struct VisionCache {
    key: Option<u64>,
    distances: Vec<f32>,
}

impl VisionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash of everything the cached distances depend on besides the scene
    pub fn pose_key(pos: Vec2, dir: Vec2, params: &VisionParams, xray: bool) -> u64 {
        let mut h = DefaultHasher::new();
        for v in [pos.x, pos.y, dir.x, dir.y, params.fov_deg, params.max_distance] {
            v.to_bits().hash(&mut h);
        }
        params.ray_count.hash(&mut h);
        xray.hash(&mut h);
        h.finish()
    }

    /// Recompute when the key changed or when forced.
    /// Returns true when `compute` ran.
    pub fn refresh(&mut self, key: u64, force: bool, compute: impl FnOnce() -> Vec<f32>) -> bool {
        if !force && self.key == Some(key) {
            return false;
        }
        self.distances = compute();
        self.key = Some(key);
        true
    }

    #[inline]
    pub fn distances(&self) -> &[f32] {
        &self.distances
    }
}

/// The player
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Unit heading
    pub dir: Vec2,
    pub speed: f32,
    /// Pose changed during the last update
    pub moved: bool,
    pub vision: VisionCache,
}

impl Player {
    pub fn new(pos: Vec2, speed: f32) -> Self {
        Self {
            pos,
            dir: Vec2::new(0.0, -1.0),
            speed,
            moved: false,
            vision: VisionCache::new(),
        }
    }

    /// Turn and move for one tick
    ///
    /// `turn` is right minus left input, `throttle` forward minus backward.
    pub fn update(
        &mut self,
        turn: f32,
        throttle: f32,
        delta_ms: f32,
        turn_rate: f32,
        radius: f32,
        occluders: &[Occluder],
    ) -> MoveResult {
        if turn != 0.0 {
            self.dir = rotate_deg(self.dir, turn * delta_ms * turn_rate).normalize_or_zero();
        }
        let delta = self.dir * throttle * self.speed * (delta_ms * SPEED_SCALE_PER_MS);
        self.moved = turn != 0.0 || throttle != 0.0;
        move_axis_separated(&mut self.pos, delta, radius, occluders)
    }

    /// Refresh the memoized fan. `xray` sees through everything.
    pub fn refresh_vision(
        &mut self,
        scene: &Scene<'_>,
        params: &VisionParams,
        xray: bool,
        force: bool,
    ) -> bool {
        let key = VisionCache::pose_key(self.pos, self.dir, params, xray);
        let (pos, dir) = (self.pos, self.dir);
        self.vision.refresh(key, force, || {
            if xray {
                vec![params.max_distance; params.ray_count]
            } else {
                scene.sample_fan(pos, dir, params.fov_deg, params.ray_count, params.max_distance)
            }
        })
    }

    /// Fan polygon: position followed by each ray's end point
    pub fn visibility_polygon(&self, params: &VisionParams) -> Vec<Vec2> {
        fan_polygon(self.pos, self.dir, params.fov_deg, self.vision.distances())
    }

    /// Heading in degrees clockwise from screen-up, for camera rotation
    pub fn heading_deg(&self) -> f32 {
        angle_between_deg(Vec2::new(0.0, -1.0), self.dir)
    }
}

/// A guard
#[derive(Debug, Clone)]
pub struct Guard {
    pub pos: Vec2,
    /// Unit heading
    pub dir: Vec2,
    /// Heading at spawn
    pub start_dir: Vec2,
    /// Milliseconds between patrol rotation steps (0 = stationary)
    pub rotate_period_ms: f32,
    pub timer_ms: f32,
    pub sees_player: bool,
    pub vision: VisionCache,
    /// Full-circle sample for the editor (patrolling guards only)
    pub panorama: VisionCache,
}

impl Guard {
    pub fn new(pos: Vec2, dir: Vec2, rotate_period_ms: f32) -> Self {
        let dir = dir.normalize_or_zero();
        Self {
            pos,
            dir,
            start_dir: dir,
            rotate_period_ms,
            timer_ms: 0.0,
            sees_player: false,
            vision: VisionCache::new(),
            panorama: VisionCache::new(),
        }
    }

    #[inline]
    pub fn is_patrolling(&self) -> bool {
        self.rotate_period_ms != 0.0
    }

    /// Advance the patrol timer, stepping the heading when it elapses
    pub fn advance(&mut self, delta_ms: f32, step_deg: f32) {
        self.timer_ms += delta_ms;
        if self.timer_ms >= self.rotate_period_ms {
            if self.is_patrolling() {
                self.dir = rotate_deg(self.dir, step_deg).normalize_or_zero();
            }
            self.timer_ms = 0.0;
        }
    }

    /// Body circle other agents' rays may collide with
    pub fn blocker(&self, radius: f32) -> Circle {
        Circle::new(self.pos, radius)
    }

    /// Point-blank, or inside the cone, within range and unobstructed
    pub fn can_see(&self, target: Vec2, scene: &Scene<'_>, rules: &DetectionRules) -> bool {
        let dif = target - self.pos;
        let dist = dif.length();
        if dist <= rules.point_blank {
            return true;
        }
        let facing = self.dir.dot(dif / dist) >= rules.min_facing_cos;
        facing && dist <= rules.range && scene.line_of_sight(self.pos, target)
    }

    /// Re-evaluate `sees_player`
    pub fn detect(&mut self, player_pos: Vec2, scene: &Scene<'_>, rules: &DetectionRules) -> bool {
        let seen = self.can_see(player_pos, scene, rules);
        if seen != self.sees_player {
            log::debug!(
                "Guard at ({:.0}, {:.0}) {} the player",
                self.pos.x,
                self.pos.y,
                if seen { "spotted" } else { "lost" }
            );
        }
        self.sees_player = seen;
        seen
    }

    pub fn refresh_vision(&mut self, scene: &Scene<'_>, params: &VisionParams, force: bool) -> bool {
        let key = VisionCache::pose_key(self.pos, self.dir, params, false);
        let (pos, dir) = (self.pos, self.dir);
        self.vision.refresh(key, force, || {
            scene.sample_fan(pos, dir, params.fov_deg, params.ray_count, params.max_distance)
        })
    }

    /// Full-circle coverage from the spawn heading, for patrolling guards
    pub fn refresh_panorama(
        &mut self,
        scene: &Scene<'_>,
        step_deg: f32,
        max_distance: f32,
        force: bool,
    ) -> bool {
        let params = VisionParams {
            fov_deg: 360.0,
            ray_count: 0,
            max_distance,
        };
        let key = VisionCache::pose_key(self.pos, self.start_dir, &params, false) ^ step_deg.to_bits() as u64;
        let (pos, dir) = (self.pos, self.start_dir);
        self.panorama.refresh(key, force, || {
            scene.sample_panorama(pos, dir, step_deg, max_distance)
        })
    }

    pub fn visibility_polygon(&self, params: &VisionParams) -> Vec<Vec2> {
        fan_polygon(self.pos, self.dir, params.fov_deg, self.vision.distances())
    }

    pub fn panorama_polygon(&self, step_deg: f32) -> Vec<Vec2> {
        panorama_polygon(self.pos, self.start_dir, step_deg, self.panorama.distances())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::geom::Rect;

    fn rules() -> DetectionRules {
        DetectionRules::new(GUARD_FOV_DEG, DETECTION_RANGE, POINT_BLANK_RADIUS)
    }

    fn params() -> VisionParams {
        VisionParams {
            fov_deg: GUARD_FOV_DEG,
            ray_count: GUARD_RAY_COUNT,
            max_distance: GUARD_VIEW_DISTANCE,
        }
    }

    #[test]
    fn test_point_blank_detection_ignores_walls() {
        let walls = [Occluder::wall(Rect::new(2.0, -50.0, 1.0, 100.0))];
        let scene = Scene::walls(&walls);
        // Facing away from the player as well
        let mut guard = Guard::new(Vec2::ZERO, Vec2::new(-1.0, 0.0), 0.0);
        let rules = DetectionRules::new(GUARD_FOV_DEG, 10.0, 10.0);
        assert!(guard.detect(Vec2::new(5.0, 0.0), &scene, &rules));
        assert!(guard.sees_player);
    }

    #[test]
    fn test_occluded_guard_does_not_see() {
        let walls = [Occluder::wall(Rect::new(40.0, -50.0, 20.0, 100.0))];
        let scene = Scene::walls(&walls);
        let mut guard = Guard::new(Vec2::ZERO, Vec2::X, 0.0);
        assert!(!guard.detect(Vec2::new(100.0, 0.0), &scene, &rules()));
    }

    #[test]
    fn test_clear_line_detects() {
        let scene = Scene::walls(&[]);
        let guard = Guard::new(Vec2::ZERO, Vec2::X, 0.0);
        assert!(guard.can_see(Vec2::new(100.0, 0.0), &scene, &rules()));
        // Outside the cone
        assert!(!guard.can_see(Vec2::new(0.0, 100.0), &scene, &rules()));
        // Beyond range
        assert!(!guard.can_see(Vec2::new(151.0, 0.0), &scene, &rules()));
    }

    #[test]
    fn test_cone_edge_is_inclusive() {
        let scene = Scene::walls(&[]);
        let guard = Guard::new(Vec2::ZERO, Vec2::X, 0.0);
        let inside = rotate_deg(Vec2::X, 22.0) * 50.0;
        let outside = rotate_deg(Vec2::X, 23.0) * 50.0;
        assert!(guard.can_see(inside, &scene, &rules()));
        assert!(!guard.can_see(outside, &scene, &rules()));
    }

    #[test]
    fn test_patrol_rotation_steps_on_period() {
        let mut guard = Guard::new(Vec2::ZERO, Vec2::X, 8.0);
        for _ in 0..7 {
            guard.advance(1.0, 2.0);
        }
        assert_eq!(guard.dir, Vec2::X);
        guard.advance(1.0, 2.0);
        assert!((angle_between_deg(Vec2::X, guard.dir) - 2.0).abs() < 1e-3);
        assert_eq!(guard.timer_ms, 0.0);
    }

    #[test]
    fn test_stationary_guard_never_rotates() {
        let mut guard = Guard::new(Vec2::ZERO, Vec2::Y, 0.0);
        for _ in 0..100 {
            guard.advance(16.0, 2.0);
        }
        assert_eq!(guard.dir, Vec2::Y);
    }

    #[test]
    fn test_vision_cache_reuses_until_pose_changes() {
        let walls = [Occluder::wall(Rect::new(40.0, -50.0, 20.0, 100.0))];
        let scene = Scene::walls(&walls);
        let mut guard = Guard::new(Vec2::ZERO, Vec2::X, 0.0);
        assert!(guard.refresh_vision(&scene, &params(), false));
        assert_eq!(guard.vision.distances().len(), GUARD_RAY_COUNT);
        assert!(!guard.refresh_vision(&scene, &params(), false));
        // A door moving forces a refresh even without a pose change
        assert!(guard.refresh_vision(&scene, &params(), true));
        guard.pos.y += 1.0;
        assert!(guard.refresh_vision(&scene, &params(), false));
    }

    #[test]
    fn test_static_agent_misses_scene_change_without_force() {
        let mut guard = Guard::new(Vec2::ZERO, Vec2::X, 0.0);
        let empty: [Occluder; 0] = [];
        guard.refresh_vision(&Scene::walls(&empty), &params(), false);
        let walls = [Occluder::wall(Rect::new(40.0, -50.0, 20.0, 100.0))];
        guard.refresh_vision(&Scene::walls(&walls), &params(), false);
        assert!(guard.vision.distances().iter().all(|d| *d == GUARD_VIEW_DISTANCE));
        guard.refresh_vision(&Scene::walls(&walls), &params(), true);
        let center = guard.vision.distances()[GUARD_RAY_COUNT / 2];
        assert!((center - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_player_moves_and_turns() {
        let mut player = Player::new(Vec2::new(10.0, 10.0), PLAYER_SPEED);
        // 100 ms forward at speed 3: 3 * 100 * 0.03 = 9 units up
        player.update(0.0, 1.0, 100.0, PLAYER_TURN_DEG_PER_MS, AGENT_RADIUS, &[]);
        assert!((player.pos - Vec2::new(10.0, 1.0)).length() < 1e-4);
        assert!(player.moved);

        // 1800 ms of turning at 1/20 deg/ms: 90 degrees
        player.update(1.0, 0.0, 1800.0, PLAYER_TURN_DEG_PER_MS, AGENT_RADIUS, &[]);
        assert!((player.heading_deg() - 90.0).abs() < 1e-2);

        player.update(0.0, 0.0, 16.0, PLAYER_TURN_DEG_PER_MS, AGENT_RADIUS, &[]);
        assert!(!player.moved);
    }

    #[test]
    fn test_player_blocked_by_wall() {
        let walls = [Occluder::wall(Rect::new(0.0, -20.0, 20.0, 10.0))];
        let mut player = Player::new(Vec2::new(10.0, 0.0), PLAYER_SPEED);
        for _ in 0..50 {
            player.update(0.0, 1.0, 16.0, PLAYER_TURN_DEG_PER_MS, AGENT_RADIUS, &walls);
        }
        // Wall bottom at y = -10, radius 5
        assert!(player.pos.y >= -5.001);
        assert!(player.pos.y < -3.0);
    }

    #[test]
    fn test_player_xray_vision() {
        let walls = [Occluder::wall(Rect::new(0.0, -20.0, 20.0, 10.0))];
        let scene = Scene::walls(&walls);
        let params = VisionParams {
            fov_deg: PLAYER_FOV_DEG,
            ray_count: PLAYER_RAY_COUNT,
            max_distance: PLAYER_VIEW_DISTANCE,
        };
        let mut player = Player::new(Vec2::new(10.0, 0.0), PLAYER_SPEED);
        player.refresh_vision(&scene, &params, true, false);
        assert!(player.vision.distances().iter().all(|d| *d == PLAYER_VIEW_DISTANCE));

        player.refresh_vision(&scene, &params, false, true);
        let poly = player.visibility_polygon(&params);
        assert_eq!(poly.len(), PLAYER_RAY_COUNT + 1);
        assert_eq!(poly[0], player.pos);
        let center = player.vision.distances()[PLAYER_RAY_COUNT / 2];
        assert!((center - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_xray_toggle_refreshes_static_player() {
        let walls = [Occluder::wall(Rect::new(0.0, -20.0, 20.0, 10.0))];
        let scene = Scene::walls(&walls);
        let params = VisionParams {
            fov_deg: PLAYER_FOV_DEG,
            ray_count: PLAYER_RAY_COUNT,
            max_distance: PLAYER_VIEW_DISTANCE,
        };
        let mut player = Player::new(Vec2::new(10.0, 0.0), PLAYER_SPEED);
        let center = PLAYER_RAY_COUNT / 2;

        assert!(player.refresh_vision(&scene, &params, false, false));
        assert!((player.vision.distances()[center] - 10.0).abs() < 1e-3);

        // Same pose, x-ray switched on
        assert!(player.refresh_vision(&scene, &params, true, false));
        assert_eq!(player.vision.distances()[center], PLAYER_VIEW_DISTANCE);
        assert!(!player.refresh_vision(&scene, &params, true, false));

        assert!(player.refresh_vision(&scene, &params, false, false));
        assert!((player.vision.distances()[center] - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_panorama_covers_full_circle() {
        let mut guard = Guard::new(Vec2::ZERO, Vec2::X, 8.0);
        let scene = Scene::walls(&[]);
        guard.refresh_panorama(&scene, 1.0, 150.0, false);
        assert_eq!(guard.panorama.distances().len(), 360);
        assert_eq!(guard.panorama_polygon(1.0).len(), 360);
        // Patrol rotation doesn't invalidate the panorama
        guard.advance(8.0, 2.0);
        assert!(!guard.refresh_panorama(&scene, 1.0, 150.0, false));
    }
}
