use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Inclusive right edge coordinate (`x + w - 1`).
    pub fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
    /// Inclusive bottom edge coordinate (`y + h - 1`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    /// Returns true if `r` is fully inside `self` (inclusive edges).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        let (a_x2, a_y2) = (self.x as u64 + self.w as u64, self.y as u64 + self.h as u64);
        let (b_x2, b_y2) = (r.x as u64 + r.w as u64, r.y as u64 + r.h as u64);
        !(self.x as u64 >= b_x2 || r.x as u64 >= a_x2 || self.y as u64 >= b_y2 || r.y as u64 >= a_y2)
    }
}

/// One tile of the tile table.
///
/// `width`/`height` are supplied by the caller and never changed by packing. The remaining
/// fields are written by the packer and should be treated as read-only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Tile {
    pub width: u32,
    pub height: u32,
    /// Top-left position inside its canvas.
    pub x: u32,
    pub y: u32,
    pub packed: bool,
    /// True if the tile was rotated 90° to fit. `width`/`height` stay unchanged; on the
    /// canvas the tile occupies `height x width`.
    pub rotated: bool,
    /// Canvas the tile was packed into (0-based, in opening order).
    pub canvas_index: Option<usize>,
}

impl Tile {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Dimensions as placed on the canvas (post-rotation).
    pub fn placed_size(&self) -> (u32, u32) {
        if self.rotated {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Occupied rectangle on its canvas, if packed.
    pub fn placed_rect(&self) -> Option<Rect> {
        if !self.packed {
            return None;
        }
        let (w, h) = self.placed_size();
        Some(Rect::new(self.x, self.y, w, h))
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub(crate) fn clear_output(&mut self) {
        self.x = 0;
        self.y = 0;
        self.packed = false;
        self.rotated = false;
        self.canvas_index = None;
    }
}

/// Session-level results of the latest `pack()`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PackResult {
    /// Number of canvases holding tiles.
    pub canvases_used: usize,
    /// Canvas dimensions the pack ran with. Every canvas but the last has this size.
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Dimensions of the last canvas. Differs from `canvas_width`/`canvas_height` only when
    /// the last canvas was shrunk.
    pub last_canvas_width: u32,
    pub last_canvas_height: u32,
}

impl PackResult {
    /// Dimensions of canvas `index`.
    pub fn canvas_size(&self, index: usize) -> (u32, u32) {
        if index + 1 == self.canvases_used {
            (self.last_canvas_width, self.last_canvas_height)
        } else {
            (self.canvas_width, self.canvas_height)
        }
    }
}

/// Statistics about packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    /// Number of tiles in the table.
    pub num_tiles: usize,
    /// Number of tiles placed on some canvas.
    pub num_packed: usize,
    /// Number of rotated tiles.
    pub num_rotated: usize,
    /// Number of canvases holding tiles.
    pub num_canvases: usize,
    /// Total area of all canvases.
    pub total_canvas_area: u64,
    /// Total area covered by packed tiles.
    pub used_tile_area: u64,
    /// Occupancy ratio: used_tile_area / total_canvas_area (0.0 to 1.0).
    /// Higher is better (less wasted space).
    pub occupancy: f64,
}

impl PackStats {
    pub fn compute(tiles: &[Tile], result: &PackResult) -> Self {
        let mut num_packed = 0;
        let mut num_rotated = 0;
        let mut used_tile_area = 0u64;
        for t in tiles.iter().filter(|t| t.packed) {
            num_packed += 1;
            used_tile_area += t.area();
            if t.rotated {
                num_rotated += 1;
            }
        }
        let total_canvas_area: u64 = (0..result.canvases_used)
            .map(|i| {
                let (w, h) = result.canvas_size(i);
                w as u64 * h as u64
            })
            .sum();
        let occupancy = if total_canvas_area > 0 {
            used_tile_area as f64 / total_canvas_area as f64
        } else {
            0.0
        };
        PackStats {
            num_tiles: tiles.len(),
            num_packed,
            num_rotated,
            num_canvases: result.canvases_used,
            total_canvas_area,
            used_tile_area,
            occupancy,
        }
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Canvases: {}, Tiles: {}/{}, Occupancy: {:.2}%, Total Area: {} px², Used Area: {} px², Rotated: {}",
            self.num_canvases,
            self.num_packed,
            self.num_tiles,
            self.occupancy * 100.0,
            self.total_canvas_area,
            self.used_tile_area,
            self.num_rotated,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.total_canvas_area.saturating_sub(self.used_tile_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.total_canvas_area > 0 {
            (self.wasted_area() as f64 / self.total_canvas_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
