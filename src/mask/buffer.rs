//! CPU light mask
//!
//! A single-channel grid over a world-space window. Visibility polygons add
//! light, shadow polygons take it away. The caller owns the buffer and reuses
//! it across frames; nothing here allocates per frame after construction.

use glam::Vec2;

use crate::sim::snapshot::FrameSnapshot;

/// How a filled polygon combines with the existing cell value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Blend {
    Add,
    Subtract,
}

/// Scanline-filled light intensity grid
#[derive(Debug, Clone)]
pub struct LightMask {
    width: usize,
    height: usize,
    /// World position of the top-left corner of cell (0, 0)
    origin: Vec2,
    cell_size: f32,
    data: Vec<u8>,
    /// Scratch for edge crossings
    crossings: Vec<f32>,
}

impl LightMask {
    pub fn new(width: usize, height: usize, origin: Vec2, cell_size: f32) -> Self {
        Self {
            width,
            height,
            origin,
            cell_size: cell_size.max(f32::EPSILON),
            data: vec![0; width * height],
            crossings: Vec::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// Row-major intensities, one byte per cell
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }

    /// Intensity at a world position (0 outside the window)
    pub fn sample(&self, p: Vec2) -> u8 {
        let local = (p - self.origin) / self.cell_size;
        if local.x < 0.0 || local.y < 0.0 {
            return 0;
        }
        self.get(local.x as usize, local.y as usize).unwrap_or(0)
    }

    /// Saturating-add `value` to every cell whose center is inside `outline`
    pub fn add_polygon(&mut self, outline: &[Vec2], value: u8) {
        self.fill(outline, value, Blend::Add);
    }

    /// Saturating-subtract `value` from every cell whose center is inside `outline`
    pub fn subtract_polygon(&mut self, outline: &[Vec2], value: u8) {
        self.fill(outline, value, Blend::Subtract);
    }

    /// Even-odd scanline fill sampled at cell centers
    fn fill(&mut self, outline: &[Vec2], value: u8, blend: Blend) {
        let n = outline.len();
        if n < 3 || self.width == 0 || self.height == 0 {
            return;
        }

        let (min_y, max_y) = outline
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v.y), hi.max(v.y))
            });
        let first_row = (((min_y - self.origin.y) / self.cell_size - 0.5).ceil()).max(0.0) as usize;
        let last_row = ((max_y - self.origin.y) / self.cell_size - 0.5).floor();
        if last_row < 0.0 {
            return;
        }
        let last_row = (last_row as usize).min(self.height - 1);

        for row in first_row..=last_row {
            let y = self.origin.y + (row as f32 + 0.5) * self.cell_size;

            self.crossings.clear();
            for i in 0..n {
                let a = outline[i];
                let b = outline[(i + 1) % n];
                if (a.y <= y) != (b.y <= y) {
                    self.crossings.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            self.crossings.sort_by(|a, b| a.total_cmp(b));

            let row_start = row * self.width;
            for span in self.crossings.chunks_exact(2) {
                let column = |x: f32| {
                    ((x - self.origin.x) / self.cell_size - 0.5)
                        .ceil()
                        .clamp(0.0, self.width as f32) as usize
                };
                let (start, end) = (column(span[0]), column(span[1]));
                if start >= end {
                    continue;
                }
                let cells = &mut self.data[row_start + start..row_start + end];
                match blend {
                    Blend::Add => cells.iter_mut().for_each(|c| *c = c.saturating_add(value)),
                    Blend::Subtract => cells.iter_mut().for_each(|c| *c = c.saturating_sub(value)),
                }
            }
        }
    }

    /// Rasterize one frame: ambient level, then every visibility fan, then
    /// the player's shadows cut out
    pub fn compose(&mut self, snapshot: &FrameSnapshot, ambient: u8) {
        self.clear(ambient);
        self.add_polygon(&snapshot.player_visibility, u8::MAX);
        for guard in &snapshot.guards {
            self.add_polygon(&guard.visibility, u8::MAX);
            if let Some(ring) = &guard.panorama {
                self.add_polygon(ring, u8::MAX / 2);
            }
        }
        for shadow in &snapshot.shadows {
            self.subtract_polygon(&shadow.vertices, u8::MAX);
        }
    }
}
