//! SDF queries against occluder shapes
//!
//! Negative inside, positive outside. Used for the "is inside" sign test and
//! for circle-vs-shape collision (`sdf(center) < radius`).

use glam::Vec2;

use super::geom::{Polygon, Rect, Shape};

/// Signed distance to a circle
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Signed distance to an axis-aligned rectangle
///
/// Inside: negative distance to the nearest edge. Outside and level with a
/// side: distance to that side. Otherwise: distance to the nearest corner.
pub fn rect_sdf(rect: &Rect, p: Vec2) -> f32 {
    if rect.contains(p) {
        return -(p.x - rect.left())
            .abs()
            .min((p.x - rect.right()).abs())
            .min((p.y - rect.top()).abs())
            .min((p.y - rect.bottom()).abs());
    }
    if rect.left() < p.x && p.x < rect.right() {
        return (p.y - rect.top()).abs().min((p.y - rect.bottom()).abs());
    }
    if rect.top() < p.y && p.y < rect.bottom() {
        return (p.x - rect.left()).abs().min((p.x - rect.right()).abs());
    }
    rect.corners()
        .iter()
        .map(|c| p.distance_squared(*c))
        .fold(f32::INFINITY, f32::min)
        .sqrt()
}

/// Distance from `p` to the segment `a -> b`
pub fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Signed distance to a polygon (winding-number sign)
pub fn polygon_sdf(poly: &Polygon, p: Vec2) -> f32 {
    if !poly.is_valid() {
        return f32::INFINITY;
    }
    let dist = poly
        .edges()
        .map(|(a, b)| segment_distance(p, a, b))
        .fold(f32::INFINITY, f32::min);
    if poly.contains(p) { -dist } else { dist }
}

/// Signed distance to any occluder shape
pub fn shape_sdf(shape: &Shape, p: Vec2) -> f32 {
    match shape {
        Shape::Rect(rect) => rect_sdf(rect, p),
        Shape::Polygon(poly) => polygon_sdf(poly, p),
    }
}

/// Minimum signed distance over a set of shapes (infinity when empty)
pub fn scene_sdf<'a>(shapes: impl IntoIterator<Item = &'a Shape>, p: Vec2) -> f32 {
    shapes
        .into_iter()
        .map(|s| shape_sdf(s, p))
        .fold(f32::INFINITY, f32::min)
}

/// Circle overlaps the shape
#[inline]
pub fn circle_collides(shape: &Shape, center: Vec2, radius: f32) -> bool {
    shape_sdf(shape, center) < radius
}
