//! Ray intersection engine
//!
//! Every routine returns the hit distance along the ray, or `None` for a miss.
//! Degenerate inputs (zero-length segments, parallel rays, zero-direction rays)
//! are misses, never errors.

use glam::Vec2;

use super::geom::{Circle, Polygon, Rect, Ray, Shape};

/// Nearest non-negative hit of a ray against a circle
///
/// Solves `|O + tD - C|^2 = r^2`. When the origin is inside the circle the
/// exit point is returned.
pub fn ray_circle(ray: &Ray, circle: &Circle) -> Option<f32> {
    if ray.is_degenerate() {
        return None;
    }
    let oc = ray.origin() - circle.center;
    let b = 2.0 * oc.dot(ray.dir());
    let c = oc.length_squared() - circle.radius * circle.radius;

    let discriminant = b * b - 4.0 * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let t_near = (-b - root) * 0.5;
    let t_far = (-b + root) * 0.5;

    if t_near >= 0.0 {
        Some(t_near)
    } else if t_far >= 0.0 {
        Some(t_far)
    } else {
        None
    }
}

/// Ray against the segment `a -> b`, limited to `max_dist`
///
/// The segment is `Q + uS`; `u` and the ray parameter `t` come from 2D cross
/// product ratios. A hit needs `u` in `[0, 1]` and `t` in `[0, max_dist]`.
pub fn ray_segment(ray: &Ray, a: Vec2, b: Vec2, max_dist: f32) -> Option<f32> {
    if ray.is_degenerate() || a == b {
        return None;
    }
    let p = ray.origin();
    let r = ray.dir();

    // Both endpoints behind the origin: nothing ahead can be hit
    if (a - p).dot(r) < 0.0 && (b - p).dot(r) < 0.0 {
        return None;
    }

    let q = a;
    let s = b - a;
    let s_cross_r = s.perp_dot(r);
    if s_cross_r == 0.0 {
        return None;
    }
    let u = (p - q).perp_dot(r) / s_cross_r;
    let t = (q - p).perp_dot(s) / r.perp_dot(s);

    if !(0.0..=1.0).contains(&u) || t < 0.0 || t > max_dist {
        return None;
    }
    Some(t)
}

/// Nearest of several optional hits
fn nearest(hits: impl Iterator<Item = Option<f32>>) -> Option<f32> {
    hits.flatten().reduce(f32::min)
}

/// Ray against the four boundary segments of a rectangle
pub fn ray_rect(ray: &Ray, rect: &Rect, max_dist: f32) -> Option<f32> {
    // Whole rectangle behind the origin
    if (rect.center() - ray.origin()).dot(ray.dir()) < -rect.half_diagonal() {
        return None;
    }
    nearest(
        rect.edges()
            .iter()
            .map(|(a, b)| ray_segment(ray, *a, *b, max_dist)),
    )
}

/// Ray against every edge of a polygon
pub fn ray_polygon(ray: &Ray, poly: &Polygon, max_dist: f32) -> Option<f32> {
    nearest(poly.edges().map(|(a, b)| ray_segment(ray, a, b, max_dist)))
}

/// Ray against an occluder shape
pub fn ray_shape(ray: &Ray, shape: &Shape, max_dist: f32) -> Option<f32> {
    match shape {
        Shape::Rect(rect) => ray_rect(ray, rect, max_dist),
        Shape::Polygon(poly) => ray_polygon(ray, poly, max_dist),
    }
}
