//! Renderer-facing light and shadow masks
//!
//! The simulation produces world-space polygons; this module turns them into
//! triangle lists for a GPU backend or rasterizes them into a CPU buffer the
//! caller owns.

pub mod buffer;
pub mod shapes;
pub mod vertex;

pub use buffer::LightMask;
pub use shapes::{fan_triangles, light_vertices, polygon_triangles, shadow_vertices, triangulate};
pub use vertex::{MaskVertex, colors};
