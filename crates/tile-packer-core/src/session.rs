use crate::config::{FailPolicy, PackerOptions};
use crate::error::{Result, TilePackerError};
use crate::model::{PackResult, PackStats, Rect, Tile};
use crate::packer::{FreeAreaPool, place_tile, rank_tiles};
use crate::shrink::shrink_canvas;
use tracing::{debug, instrument, trace};

/// A packing session: the tile table, the free-area arena and the results of the latest pack.
///
/// All storage is sized once in [`PackingSession::new`]; packing itself never allocates.
/// A session is plain owned data, so independent sessions can be packed on different threads.
#[derive(Debug)]
pub struct PackingSession {
    tiles: Vec<Tile>,
    ranked: Vec<usize>,
    pool: FreeAreaPool,
    options: PackerOptions,
    canvas_width: u32,
    canvas_height: u32,
    result: PackResult,
}

impl PackingSession {
    /// Creates a session for `tile_count` zero-sized tiles on `width x height` canvases.
    /// Fill in the tile sizes with [`Self::set_tile_size`] before packing.
    pub fn new(tile_count: usize, width: u32, height: u32) -> Result<Self> {
        if tile_count == 0 {
            return Err(TilePackerError::WrongParameters(
                "tile count must be at least 1".into(),
            ));
        }
        check_canvas(width, height)?;
        let capacity = tile_count
            .checked_add(1)
            .ok_or(TilePackerError::NoMemory)?;

        let mut tiles = Vec::new();
        tiles.try_reserve_exact(tile_count)?;
        tiles.resize(tile_count, Tile::default());
        let mut ranked = Vec::new();
        ranked.try_reserve_exact(tile_count)?;
        let pool = FreeAreaPool::with_capacity(capacity)?;

        Ok(Self {
            tiles,
            ranked,
            pool,
            options: PackerOptions::default(),
            canvas_width: width,
            canvas_height: height,
            result: PackResult {
                canvas_width: width,
                canvas_height: height,
                last_canvas_width: width,
                last_canvas_height: height,
                ..Default::default()
            },
        })
    }

    /// Creates a session holding one tile per `(width, height)` pair, in the given order.
    pub fn with_tiles<I>(sizes: I, width: u32, height: u32) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let sizes: Vec<(u32, u32)> = sizes.into_iter().collect();
        let mut session = Self::new(sizes.len(), width, height)?;
        for (tile, (w, h)) in session.tiles.iter_mut().zip(sizes) {
            *tile = Tile::new(w, h);
        }
        Ok(session)
    }

    pub fn options(&self) -> &PackerOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut PackerOptions {
        &mut self.options
    }

    pub fn set_options(&mut self, options: PackerOptions) {
        self.options = options;
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Result<&Tile> {
        self.tiles
            .get(index)
            .ok_or(TilePackerError::TileIndexOutOfRange {
                index,
                len: self.tiles.len(),
            })
    }

    /// Sets the input size of tile `index` and clears its packing results.
    pub fn set_tile_size(&mut self, index: usize, width: u32, height: u32) -> Result<()> {
        let len = self.tiles.len();
        let tile = self
            .tiles
            .get_mut(index)
            .ok_or(TilePackerError::TileIndexOutOfRange { index, len })?;
        *tile = Tile::new(width, height);
        Ok(())
    }

    /// Tile indices in the order the latest `pack()` processed them.
    pub fn ranked(&self) -> &[usize] {
        &self.ranked
    }

    /// Free rectangles left on the canvas packed last, smallest first.
    pub fn free_areas(&self) -> impl Iterator<Item = Rect> + '_ {
        self.pool.iter().map(|(_, a)| a.rect())
    }

    pub fn pool(&self) -> &FreeAreaPool {
        &self.pool
    }

    pub fn result(&self) -> &PackResult {
        &self.result
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    /// Changes the canvas size used by subsequent packs. Already packed tiles are not moved;
    /// enable `always_repack` to lay everything out again.
    pub fn resize_canvas(&mut self, width: u32, height: u32) {
        self.canvas_width = width;
        self.canvas_height = height;
    }

    pub fn stats(&self) -> PackStats {
        PackStats::compute(&self.tiles, &self.result)
    }

    /// Hands the tile table back, dropping the rest of the session.
    pub fn into_tiles(self) -> Vec<Tile> {
        self.tiles
    }

    fn validate(&self) -> Result<()> {
        check_canvas(self.canvas_width, self.canvas_height)?;
        if self.tiles.is_empty() || self.pool.capacity() != self.tiles.len() + 1 {
            return Err(TilePackerError::WrongParameters(format!(
                "free area arena holds {} slots for {} tiles",
                self.pool.capacity(),
                self.tiles.len()
            )));
        }
        if let Some(i) = self.tiles.iter().position(|t| t.width == 0 || t.height == 0) {
            return Err(TilePackerError::WrongParameters(format!(
                "tile {} has a zero dimension ({}x{})",
                i, self.tiles[i].width, self.tiles[i].height
            )));
        }
        Ok(())
    }

    /// Rank position of the first tile a pass would try to place.
    fn first_pending(&self, repack: bool) -> Option<usize> {
        self.ranked
            .iter()
            .position(|&i| repack || !self.tiles[i].packed)
    }

    /// Whether a pass over an empty `width x height` canvas places at least one tile.
    /// A pass that would place nothing must not reset the pool of the canvas packed last.
    fn pass_places_tile(&self, repack: bool, width: u32, height: u32) -> bool {
        let allow_rotation = self.options.allow_rotation;
        let fits = |&i: &usize| {
            let t = &self.tiles[i];
            (t.width <= width && t.height <= height)
                || (allow_rotation && t.height <= width && t.width <= height)
        };
        let mut pending = self
            .ranked
            .iter()
            .filter(|&&i| repack || !self.tiles[i].packed);
        match self.options.fail_policy {
            FailPolicy::Continue => pending.any(fits),
            FailPolicy::Stop | FailPolicy::NewCanvas => pending.next().is_some_and(fits),
        }
    }

    #[instrument(skip_all, fields(tiles = self.tiles.len()))]
    /// Packs the tiles onto canvases according to the session options.
    ///
    /// Returns the number of tiles packed by this call. With [`FailPolicy::Stop`] the first tile
    /// that does not fit ends the call, and the return value is instead the number of tiles
    /// processed before it in rank order. Tiles packed by an earlier call are skipped unless
    /// `always_repack` is set; new canvases continue the numbering of the earlier call.
    ///
    /// Notes:
    /// - Ranking is deterministic: ties keep the original tile order.
    /// - With [`FailPolicy::NewCanvas`] a tile that does not fit an empty canvas ends the call.
    /// - A call that cannot place any tile leaves the tiles, [`Self::result`] and
    ///   [`Self::free_areas`] exactly as the previous call left them.
    pub fn pack(&mut self) -> Result<usize> {
        self.validate()?;
        let opts = self.options;
        let (width, height) = (self.canvas_width, self.canvas_height);

        rank_tiles(&self.tiles, opts.sort_by, opts.tiles_presorted, &mut self.ranked);

        if !self.pass_places_tile(opts.always_repack, width, height) {
            let processed = match opts.fail_policy {
                FailPolicy::Stop => self.first_pending(opts.always_repack).unwrap_or(0),
                FailPolicy::Continue | FailPolicy::NewCanvas => 0,
            };
            debug!(processed, "no tile fits an empty canvas, layout left unchanged");
            return Ok(processed);
        }

        self.pool.set_metric(opts.sort_by);
        if opts.always_repack {
            self.result.canvases_used = 0;
        }
        self.result.canvas_width = width;
        self.result.canvas_height = height;
        self.result.last_canvas_width = width;
        self.result.last_canvas_height = height;

        let mut packed = 0usize;
        let mut first_pass = true;
        let last_canvas_area = loop {
            let canvas = self.result.canvases_used;
            self.pool.reset(width, height);
            let mut needs_new_canvas = false;
            let mut placed_here = 0usize;
            let mut area_here = 0u64;

            for pos in 0..self.ranked.len() {
                let index = self.ranked[pos];
                let tile = &mut self.tiles[index];
                if tile.packed && !(opts.always_repack && first_pass) {
                    continue;
                }
                tile.clear_output();

                if place_tile(&mut self.pool, tile, opts.allow_rotation) {
                    tile.canvas_index = Some(canvas);
                    area_here += tile.area();
                    placed_here += 1;
                    packed += 1;
                    continue;
                }

                match opts.fail_policy {
                    FailPolicy::Continue => {
                        trace!(tile = index, canvas, "tile does not fit, skipped");
                    }
                    FailPolicy::Stop => {
                        debug!(tile = index, canvas, processed = pos, "tile does not fit, stopping");
                        if placed_here > 0 {
                            self.result.canvases_used += 1;
                        }
                        return Ok(pos);
                    }
                    FailPolicy::NewCanvas => {
                        trace!(tile = index, canvas, "tile deferred to a new canvas");
                        needs_new_canvas = true;
                    }
                }
            }

            if placed_here > 0 {
                self.result.canvases_used += 1;
            }
            first_pass = false;
            debug!(canvas, placed = placed_here, "canvas pass complete");
            if !needs_new_canvas {
                break area_here;
            }
            if !self.pass_places_tile(false, width, height) {
                debug!(canvas, width, height, "deferred tile does not fit an empty canvas");
                break area_here;
            }
        };

        if opts.shrink_final_canvas && last_canvas_area > 0 {
            let (w, h) = shrink_canvas(
                &mut self.pool,
                &mut self.tiles,
                &self.ranked,
                self.result.canvases_used - 1,
                opts.allow_rotation,
                last_canvas_area,
                width,
                height,
            );
            self.result.last_canvas_width = w;
            self.result.last_canvas_height = h;
        }

        Ok(packed)
    }

    /// Offset of pixel `(local_x, local_y)` of tile `index` in its destination canvas buffer,
    /// laid out row-major as `[height][width]`.
    ///
    /// Rotated tiles are mapped as if turned 90° counter-clockwise: source columns become
    /// destination rows counted from the bottom of the placed tile.
    pub fn dst_offset(&self, index: usize, local_x: u32, local_y: u32) -> Result<usize> {
        let tile = self.tile(index)?;
        let canvas = match (tile.packed, tile.canvas_index) {
            (true, Some(c)) => c,
            _ => return Err(TilePackerError::TileNotPacked(index)),
        };
        if local_x >= tile.width || local_y >= tile.height {
            return Err(TilePackerError::WrongParameters(format!(
                "pixel ({}, {}) lies outside tile {} ({}x{})",
                local_x, local_y, index, tile.width, tile.height
            )));
        }
        let (dst_w, _) = self.result.canvas_size(canvas);
        let dst_w = dst_w as usize;
        let (x, y) = (tile.x as usize, tile.y as usize);
        let (lx, ly) = (local_x as usize, local_y as usize);
        let offset = if tile.rotated {
            (y + tile.width as usize - 1 - lx) * dst_w + x + ly
        } else {
            (y + ly) * dst_w + x + lx
        };
        Ok(offset)
    }
}

fn check_canvas(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(TilePackerError::WrongParameters(format!(
            "canvas dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }
    Ok(())
}
