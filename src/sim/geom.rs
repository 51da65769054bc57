//! Geometry primitives: rays, rectangles, polygons and circles
//!
//! All shapes live in world space. Rectangles are axis-aligned with `min` at the
//! top-left corner (y grows downward, matching the level layout).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A ray with a unit-length direction
///
/// The direction is normalized at construction and the ray is immutable
/// afterwards. A zero direction yields a zero-direction ray that never hits
/// anything (see [`Ray::is_degenerate`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Vec2,
    dir: Vec2,
}

impl Ray {
    pub fn new(origin: Vec2, dir: Vec2) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    /// Ray from `origin` toward `target`
    pub fn toward(origin: Vec2, target: Vec2) -> Self {
        Self::new(origin, target - origin)
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn dir(&self) -> Vec2 {
        self.dir
    }

    /// True when the ray was built from a zero-length direction
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.dir == Vec2::ZERO
    }

    /// Point at distance `t` along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec2 {
        self.origin + self.dir * t
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub min: Vec2,
    /// Width and height (never negative)
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w.max(0.0), h.max(0.0)),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Half the diagonal: radius of the circle enclosing the rectangle
    #[inline]
    pub fn half_diagonal(&self) -> f32 {
        self.size.length() * 0.5
    }

    /// Corners in traversal order: top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.right(), self.top()),
            self.max(),
            Vec2::new(self.left(), self.bottom()),
        ]
    }

    /// The four boundary segments (bottom, top, right, left)
    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        let [tl, tr, br, bl] = self.corners();
        [(bl, br), (tl, tr), (tr, br), (tl, bl)]
    }

    /// Half-open containment, matching the SDF's interior definition
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }
}

/// A circle, used for guard blockers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.distance_squared(self.center) <= self.radius * self.radius
    }
}

/// A simple (non self-intersecting) polygon
///
/// Winding may be either direction. Consecutive duplicate vertices are
/// dropped at construction so every stored edge has non-zero length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Vec2>,
}

impl Polygon {
    pub fn new(vertices: impl IntoIterator<Item = Vec2>) -> Self {
        let mut cleaned: Vec<Vec2> = Vec::new();
        for v in vertices {
            if cleaned.last() != Some(&v) {
                cleaned.push(v);
            }
        }
        while cleaned.len() > 1 && cleaned.first() == cleaned.last() {
            cleaned.pop();
        }
        Self { vertices: cleaned }
    }

    pub fn from_rect(rect: &Rect) -> Self {
        Self::new(rect.corners())
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// At least three distinct vertices
    pub fn is_valid(&self) -> bool {
        self.vertices.len() >= 3
    }

    /// Edges as (start, end) pairs, including the closing edge
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Shoelace signed area (positive for counterclockwise in y-up axes)
    pub fn signed_area(&self) -> f32 {
        self.edges().map(|(a, b)| a.perp_dot(b)).sum::<f32>() * 0.5
    }

    /// Outward normal of the edge `a -> b`, independent of winding
    pub fn outward_normal(&self, a: Vec2, b: Vec2) -> Vec2 {
        let d = b - a;
        let n = Vec2::new(d.y, -d.x);
        let n = if self.signed_area() >= 0.0 { n } else { -n };
        n.normalize_or_zero()
    }

    /// Winding-number containment test
    pub fn contains(&self, p: Vec2) -> bool {
        let mut winding = 0i32;
        for (v1, v2) in self.edges() {
            let is_left = (v2 - v1).perp_dot(p - v1);
            if v1.y <= p.y {
                if v2.y > p.y && is_left > 0.0 {
                    winding += 1;
                }
            } else if v2.y <= p.y && is_left < 0.0 {
                winding -= 1;
            }
        }
        winding != 0
    }
}

/// Occluder geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect(Rect),
    Polygon(Polygon),
}

impl Shape {
    /// Polygon view of the shape (rectangles become their 4 corners)
    pub fn to_polygon(&self) -> Polygon {
        match self {
            Shape::Rect(rect) => Polygon::from_rect(rect),
            Shape::Polygon(poly) => poly.clone(),
        }
    }
}
