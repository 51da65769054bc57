//! Triangle lists for visibility fans and shadow polygons

use glam::Vec2;

use super::vertex::{MaskVertex, colors};
use crate::sim::shadow::ShadowPolygon;
use crate::sim::snapshot::FrameSnapshot;

/// Area below which a corner counts as collinear
const COLLINEAR_EPSILON: f32 = 1e-6;

/// Triangles of a fan polygon: `fan[0]` is the apex, the rest the rim in order
pub fn fan_triangles(fan: &[Vec2], color: [f32; 4]) -> Vec<MaskVertex> {
    if fan.len() < 3 {
        return Vec::new();
    }
    let apex = fan[0];
    let mut vertices = Vec::with_capacity((fan.len() - 2) * 3);
    for pair in fan[1..].windows(2) {
        vertices.push(MaskVertex::at(apex, color));
        vertices.push(MaskVertex::at(pair[0], color));
        vertices.push(MaskVertex::at(pair[1], color));
    }
    vertices
}

/// Triangles of a closed ring around `center` (panorama outlines)
pub fn ring_triangles(center: Vec2, ring: &[Vec2], color: [f32; 4]) -> Vec<MaskVertex> {
    let n = ring.len();
    if n < 2 {
        return Vec::new();
    }
    let mut vertices = Vec::with_capacity(n * 3);
    for i in 0..n {
        vertices.push(MaskVertex::at(center, color));
        vertices.push(MaskVertex::at(ring[i], color));
        vertices.push(MaskVertex::at(ring[(i + 1) % n], color));
    }
    vertices
}

/// Twice the signed area of triangle abc
#[inline]
fn cross(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = cross(p, a, b);
    let d2 = cross(p, b, c);
    let d3 = cross(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

fn is_ear(points: &[Vec2], ring: &[usize], prev: usize, curr: usize, next: usize) -> bool {
    let (a, b, c) = (points[ring[prev]], points[ring[curr]], points[ring[next]]);
    if cross(a, b, c) <= COLLINEAR_EPSILON {
        return false;
    }
    ring.iter().enumerate().all(|(i, &idx)| {
        let p = points[idx];
        i == prev
            || i == curr
            || i == next
            || p == a
            || p == b
            || p == c
            || !point_in_triangle(p, a, b, c)
    })
}

/// Ear-clipping triangulation of a simple polygon of either winding
///
/// Returns index triples into `outline`. Collinear corners are dropped
/// without emitting a triangle. A polygon that stops yielding ears (self
/// intersecting input) returns the triangles found so far.
pub fn triangulate(outline: &[Vec2]) -> Vec<[usize; 3]> {
    let n = outline.len();
    if n < 3 {
        return Vec::new();
    }

    let area: f32 = (0..n)
        .map(|i| outline[i].perp_dot(outline[(i + 1) % n]))
        .sum();
    // Work counter-clockwise in the y-up sense
    let mut ring: Vec<usize> = if area < 0.0 {
        (0..n).rev().collect()
    } else {
        (0..n).collect()
    };

    let mut triangles = Vec::with_capacity(n - 2);
    while ring.len() > 3 {
        let m = ring.len();
        let mut clipped = false;
        for i in 0..m {
            let prev = (i + m - 1) % m;
            let next = (i + 1) % m;
            if is_ear(outline, &ring, prev, i, next) {
                triangles.push([ring[prev], ring[i], ring[next]]);
                ring.remove(i);
                clipped = true;
                break;
            }
        }
        if clipped {
            continue;
        }

        let collinear = (0..m).find(|&i| {
            let (a, b, c) = (
                outline[ring[(i + m - 1) % m]],
                outline[ring[i]],
                outline[ring[(i + 1) % m]],
            );
            cross(a, b, c).abs() <= COLLINEAR_EPSILON
        });
        match collinear {
            Some(i) => {
                ring.remove(i);
            }
            None => {
                log::warn!("Triangulation stalled with {} vertices left", m);
                return triangles;
            }
        }
    }

    if let [a, b, c] = ring[..] {
        if cross(outline[a], outline[b], outline[c]).abs() > COLLINEAR_EPSILON {
            triangles.push([a, b, c]);
        }
    }
    triangles
}

/// Triangle list for an arbitrary simple polygon
pub fn polygon_triangles(outline: &[Vec2], color: [f32; 4]) -> Vec<MaskVertex> {
    triangulate(outline)
        .into_iter()
        .flat_map(|tri| tri.map(|i| MaskVertex::at(outline[i], color)))
        .collect()
}

/// Triangle list for every shadow polygon
pub fn shadow_vertices(shadows: &[ShadowPolygon]) -> Vec<MaskVertex> {
    shadows
        .iter()
        .flat_map(|s| polygon_triangles(&s.vertices, colors::SHADOW))
        .collect()
}

/// Additive light geometry for one frame: the player fan, guard fans, and
/// in edit mode the patrol panoramas
pub fn light_vertices(snapshot: &FrameSnapshot) -> Vec<MaskVertex> {
    let mut vertices = fan_triangles(&snapshot.player_visibility, colors::PLAYER_LIGHT);
    for guard in &snapshot.guards {
        vertices.extend(fan_triangles(&guard.visibility, colors::GUARD_LIGHT));
        if let Some(ring) = &guard.panorama {
            vertices.extend(ring_triangles(guard.pos, ring, colors::PATROL_LIGHT));
        }
    }
    vertices
}
