//! Deterministic simulation module
//!
//! All visibility and gameplay logic lives here. This module must be pure
//! and deterministic:
//! - Caller-supplied tick deltas only
//! - Stable iteration order (level file order)
//! - No rendering or platform dependencies

pub mod agent;
pub mod collision;
pub mod door;
pub mod geom;
pub mod raycast;
pub mod scene;
pub mod sdf;
pub mod shadow;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use agent::{DetectionRules, Guard, Player, VisionCache, VisionParams};
pub use collision::{MoveResult, collides_any, move_axis_separated};
pub use door::{Button, Door, DoorMovement, GroupOverrides, Occluder, OccluderKind};
pub use geom::{Circle, Polygon, Ray, Rect, Shape};
pub use raycast::{ray_circle, ray_polygon, ray_rect, ray_segment, ray_shape};
pub use scene::Scene;
pub use sdf::{polygon_sdf, rect_sdf, scene_sdf, sd_circle, shape_sdf};
pub use shadow::{ShadowOutcome, ShadowPolygon, cast_shadow, cast_shadows};
pub use snapshot::FrameSnapshot;
pub use state::{Mode, World};
pub use tick::{TickInput, tick};
