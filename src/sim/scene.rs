//! Scene caster: nearest obstruction along a ray across all occluders
//!
//! A `Scene` is a borrowed, read-only view built fresh each tick from the
//! world's occluders and the guards' blocker circles.

use glam::Vec2;

use super::door::Occluder;
use super::geom::{Circle, Ray};
use super::raycast::{ray_circle, ray_shape};
use crate::rotate_deg;

/// Read-only view of everything that can stop a ray this tick
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub occluders: &'a [Occluder],
    /// Guards as small circles
    pub blockers: &'a [Circle],
    /// Fold blocker hits into the nearest distance. Blockers containing the
    /// ray origin (the caster's own body) are always ignored.
    pub blockers_occlude: bool,
}

impl<'a> Scene<'a> {
    pub fn new(occluders: &'a [Occluder], blockers: &'a [Circle], blockers_occlude: bool) -> Self {
        Self {
            occluders,
            blockers,
            blockers_occlude,
        }
    }

    /// Walls only, no blockers
    pub fn walls(occluders: &'a [Occluder]) -> Self {
        Self::new(occluders, &[], false)
    }

    /// Distance to the nearest obstruction along `ray`, clipped to `max_distance`
    ///
    /// Returns `max_distance` when nothing is hit.
    pub fn cast(&self, ray: &Ray, max_distance: f32) -> f32 {
        let mut dst = self
            .occluders
            .iter()
            .filter_map(|o| ray_shape(ray, o.shape(), max_distance))
            .fold(f32::INFINITY, f32::min);

        if self.blockers_occlude {
            let origin = ray.origin();
            let blocked = self
                .blockers
                .iter()
                .filter(|c| !c.contains(origin))
                .filter_map(|c| ray_circle(ray, c))
                .fold(f32::INFINITY, f32::min);
            dst = dst.min(blocked);
        }

        dst.min(max_distance)
    }

    /// Nothing blocks the straight line from `from` to `to`
    pub fn line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        let dist = from.distance(to);
        if dist == 0.0 {
            return true;
        }
        self.cast(&Ray::toward(from, to), dist) >= dist
    }

    /// Cast `count` evenly spaced rays across a `fov_deg` arc centered on `heading`
    pub fn sample_fan(
        &self,
        origin: Vec2,
        heading: Vec2,
        fov_deg: f32,
        count: usize,
        max_distance: f32,
    ) -> Vec<f32> {
        fan_directions(heading, fov_deg, count)
            .map(|dir| self.cast(&Ray::new(origin, dir), max_distance))
            .collect()
    }

    /// Full circle of rays, one per `step_deg`, starting at `heading`
    pub fn sample_panorama(
        &self,
        origin: Vec2,
        heading: Vec2,
        step_deg: f32,
        max_distance: f32,
    ) -> Vec<f32> {
        panorama_directions(heading, step_deg)
            .map(|dir| self.cast(&Ray::new(origin, dir), max_distance))
            .collect()
    }
}

/// Unit directions of a fan of `count` rays spanning `fov_deg` around `heading`
///
/// The first and last rays sit on the arc edges; a single ray points along
/// the heading.
pub fn fan_directions(heading: Vec2, fov_deg: f32, count: usize) -> impl Iterator<Item = Vec2> {
    let heading = heading.normalize_or_zero();
    let step = if count > 1 {
        fov_deg / (count - 1) as f32
    } else {
        0.0
    };
    let start = if count > 1 { -fov_deg * 0.5 } else { 0.0 };
    (0..count).map(move |i| rotate_deg(heading, start + step * i as f32))
}

/// Unit directions around the full circle in `step_deg` increments
pub fn panorama_directions(heading: Vec2, step_deg: f32) -> impl Iterator<Item = Vec2> {
    let heading = heading.normalize_or_zero();
    let step = step_deg.max(0.1);
    let count = (360.0 / step).floor() as usize;
    (0..count).map(move |i| rotate_deg(heading, step * i as f32))
}

/// Visibility fan polygon: the origin followed by each sampled end point
pub fn fan_polygon(origin: Vec2, heading: Vec2, fov_deg: f32, distances: &[f32]) -> Vec<Vec2> {
    std::iter::once(origin)
        .chain(
            fan_directions(heading, fov_deg, distances.len())
                .zip(distances)
                .map(|(dir, d)| origin + dir * *d),
        )
        .collect()
}

/// Closed outline from a panorama sample (no origin vertex)
pub fn panorama_polygon(origin: Vec2, heading: Vec2, step_deg: f32, distances: &[f32]) -> Vec<Vec2> {
    panorama_directions(heading, step_deg)
        .zip(distances)
        .map(|(dir, d)| origin + dir * *d)
        .collect()
}
