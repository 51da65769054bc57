//! Shadow-volume computer
//!
//! For a point light and a set of polygonal occluders, builds the shadow
//! polygon behind each occluder. Edges whose outward normal faces the light
//! are lit; vertices on the unlit side are pushed far away along the ray from
//! the light, so the polygon covers the occluder plus everything it hides.
//!
//! Polygons are returned in traversal order; the renderer subtracts them from
//! the additive light buffer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::door::Occluder;
use super::geom::Polygon;
use crate::consts::SHADOW_PROJECTION_DISTANCE;

/// Shadow cast by one occluder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowPolygon {
    /// Index of the casting occluder in the scene
    pub occluder: usize,
    pub vertices: Vec<Vec2>,
}

/// Which side of the silhouette each vertex touches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexClasses {
    /// Touches at least one lit edge
    pub lit: Vec<bool>,
    /// Touches at least one unlit edge
    pub unlit: Vec<bool>,
}

impl VertexClasses {
    #[inline]
    pub fn is_boundary(&self, i: usize) -> bool {
        self.lit[i] && self.unlit[i]
    }

    pub fn first_lit(&self) -> Option<usize> {
        self.lit.iter().position(|l| *l)
    }
}

/// Per-edge lighting: edge `i` runs from vertex `i` to vertex `i + 1`
pub fn classify_edges(poly: &Polygon, light: Vec2) -> Vec<bool> {
    poly.edges()
        .map(|(a, b)| {
            let normal = poly.outward_normal(a, b);
            let mid = (a + b) * 0.5;
            normal.dot(light - mid) > 0.0
        })
        .collect()
}

/// Lit and unlit vertex sets derived from the edge classification
pub fn classify_vertices(edge_lit: &[bool]) -> VertexClasses {
    let n = edge_lit.len();
    let mut classes = VertexClasses {
        lit: vec![false; n],
        unlit: vec![false; n],
    };
    for (i, lit) in edge_lit.iter().enumerate() {
        let j = (i + 1) % n;
        let side = if *lit {
            &mut classes.lit
        } else {
            &mut classes.unlit
        };
        side[i] = true;
        side[j] = true;
    }
    classes
}

/// Push `v` far away from the light
#[inline]
pub fn project_from_light(v: Vec2, light: Vec2) -> Vec2 {
    v + (v - light).normalize_or_zero() * SHADOW_PROJECTION_DISTANCE
}

/// Walk the vertex cycle from `start`, emitting the shadow outline
///
/// Lit-only vertices keep their position, unlit-only vertices are projected,
/// and boundary vertices emit both; `in_shadow` decides which comes first and
/// flips at every boundary vertex.
fn trace_silhouette(
    vertices: &[Vec2],
    classes: &VertexClasses,
    start: usize,
    mut in_shadow: bool,
    light: Vec2,
) -> Vec<Vec2> {
    let n = vertices.len();
    let mut out = Vec::with_capacity(n * 2);
    for k in 0..n {
        let i = (start + k) % n;
        let v = vertices[i];
        if classes.is_boundary(i) {
            let far = project_from_light(v, light);
            if in_shadow {
                out.extend([far, v]);
            } else {
                out.extend([v, far]);
            }
            in_shadow = !in_shadow;
        } else if classes.lit[i] {
            out.push(v);
        } else {
            out.push(project_from_light(v, light));
        }
    }
    out
}

/// Proper crossing of segments `p1-p2` and `q1-q2` (shared endpoints don't count)
fn segments_cross(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d1 = (p2 - p1).perp_dot(q1 - p1);
    let d2 = (p2 - p1).perp_dot(q2 - p1);
    let d3 = (q2 - q1).perp_dot(p1 - q1);
    let d4 = (q2 - q1).perp_dot(p2 - q1);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// No two non-adjacent edges cross, wraparound edge included
pub fn is_simple(outline: &[Vec2]) -> bool {
    let n = outline.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let (a1, a2) = (outline[i], outline[(i + 1) % n]);
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b1, b2) = (outline[j], outline[(j + 1) % n]);
            if segments_cross(a1, a2, b1, b2) {
                return false;
            }
        }
    }
    true
}

/// Try both starting toggle states and keep the first simple outline
///
/// This is the one place that decides silhouette traversal; callers only see
/// the accepted outline (or `None` when neither traversal closes cleanly).
pub fn resolve_silhouette(
    vertices: &[Vec2],
    classes: &VertexClasses,
    light: Vec2,
) -> Option<Vec<Vec2>> {
    let start = classes.first_lit()?;
    [false, true]
        .into_iter()
        .map(|in_shadow| trace_silhouette(vertices, classes, start, in_shadow, light))
        .find(|outline| is_simple(outline))
}

/// One quad per lit edge; their union is the region hidden by the polygon
pub fn edge_shadow_quads(poly: &Polygon, edge_lit: &[bool], light: Vec2) -> Vec<Vec<Vec2>> {
    poly.edges()
        .zip(edge_lit)
        .filter(|(_, lit)| **lit)
        .map(|((a, b), _)| {
            vec![
                a,
                b,
                project_from_light(b, light),
                project_from_light(a, light),
            ]
        })
        .collect()
}

/// Result of casting one occluder's shadow
#[derive(Debug, Clone, PartialEq)]
pub enum ShadowOutcome {
    /// One outline covering occluder and umbra
    Silhouette(Vec<Vec2>),
    /// Traversal did not close; per-edge quads instead
    EdgeQuads(Vec<Vec<Vec2>>),
    /// Degenerate polygon or no edge faces the light
    None,
}

/// Shadow of a single polygon as seen from `light`
pub fn cast_shadow(poly: &Polygon, light: Vec2) -> ShadowOutcome {
    if !poly.is_valid() {
        return ShadowOutcome::None;
    }
    let edge_lit = classify_edges(poly, light);
    let classes = classify_vertices(&edge_lit);
    if classes.first_lit().is_none() {
        return ShadowOutcome::None;
    }
    match resolve_silhouette(poly.vertices(), &classes, light) {
        Some(outline) => ShadowOutcome::Silhouette(outline),
        None => ShadowOutcome::EdgeQuads(edge_shadow_quads(poly, &edge_lit, light)),
    }
}

/// Shadows of every occluder from one light position
pub fn cast_shadows(light: Vec2, occluders: &[Occluder]) -> Vec<ShadowPolygon> {
    let mut out = Vec::new();
    for (idx, occ) in occluders.iter().enumerate() {
        let poly = occ.shape().to_polygon();
        match cast_shadow(&poly, light) {
            ShadowOutcome::Silhouette(vertices) => out.push(ShadowPolygon {
                occluder: idx,
                vertices,
            }),
            ShadowOutcome::EdgeQuads(quads) => {
                log::debug!(
                    "Occluder {} silhouette did not close, using {} edge quads",
                    idx,
                    quads.len()
                );
                out.extend(quads.into_iter().map(|vertices| ShadowPolygon {
                    occluder: idx,
                    vertices,
                }));
            }
            ShadowOutcome::None => {}
        }
    }
    out
}
