//! Collision resolution for moving agents
//!
//! Agents are circles. Movement is applied one axis at a time; after each
//! axis the agent is stepped back one unit at a time (against the sign of the
//! motion) while any occluder still overlaps it. Thin walls cannot be
//! tunnelled through this way as long as per-tick motion stays below the wall
//! thickness plus the agent diameter.

use glam::Vec2;

use super::door::Occluder;
use super::sdf::circle_collides;
use crate::sign;

/// Upper bound on unit back-steps per occluder per axis
pub const MAX_CORRECTION_STEPS: u32 = 10_000;

/// Which axis a correction applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Outcome of a resolved move
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveResult {
    /// Total distance pushed back along x and y
    pub correction: Vec2,
    /// At least one axis hit an occluder
    pub blocked: bool,
}

/// True when the circle overlaps any occluder
pub fn collides_any(occluders: &[Occluder], center: Vec2, radius: f32) -> bool {
    occluders
        .iter()
        .any(|o| circle_collides(o.shape(), center, radius))
}

/// Push `pos` back along `axis` until it clears every occluder
///
/// Returns the signed correction applied.
pub fn resolve_axis(
    pos: &mut Vec2,
    axis: Axis,
    motion: f32,
    radius: f32,
    occluders: &[Occluder],
) -> f32 {
    let back = -sign(motion);
    let mut correction = 0.0;
    for occ in occluders {
        let mut steps = 0;
        while circle_collides(occ.shape(), *pos, radius) {
            if steps == MAX_CORRECTION_STEPS {
                log::warn!(
                    "Collision correction gave up after {} steps at ({:.1}, {:.1})",
                    steps,
                    pos.x,
                    pos.y
                );
                break;
            }
            match axis {
                Axis::X => pos.x += back,
                Axis::Y => pos.y += back,
            }
            correction += back;
            steps += 1;
        }
    }
    correction
}

/// Apply `delta` to `pos` axis by axis with collision correction after each
pub fn move_axis_separated(
    pos: &mut Vec2,
    delta: Vec2,
    radius: f32,
    occluders: &[Occluder],
) -> MoveResult {
    pos.x += delta.x;
    let cx = resolve_axis(pos, Axis::X, delta.x, radius, occluders);
    pos.y += delta.y;
    let cy = resolve_axis(pos, Axis::Y, delta.y, radius, occluders);

    MoveResult {
        correction: Vec2::new(cx, cy),
        blocked: cx != 0.0 || cy != 0.0,
    }
}
