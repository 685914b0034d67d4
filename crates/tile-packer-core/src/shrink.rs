use crate::model::Tile;
use crate::packer::{FreeAreaPool, place_tile};
use tracing::{debug, trace};

/// Once canvas area is within this many percent of the tile area, shrinking stops.
pub const TOLERABLE_AREA_DIFFERENCE_PERCENT: u64 = 2;

fn within_tolerance(width: u32, height: u32, tiles_area: u64) -> bool {
    (width as u128 * height as u128) * 100 / (tiles_area as u128)
        < 100 + TOLERABLE_AREA_DIFFERENCE_PERCENT as u128
}

/// Shrinks canvas `canvas` from `width x height` toward the `tiles_area` its tiles cover.
///
/// A hill-climb on both axes at once: the target keeps the canvas aspect ratio, the step starts
/// at half the distance to it and halves every iteration. After a successful repack the canvas
/// shrinks by the step, after a failed one it grows by it. Stops when both steps reach zero or a
/// successful size is within [`TOLERABLE_AREA_DIFFERENCE_PERCENT`].
///
/// Returns the smallest size that packed every tile of the canvas. On return `pool` and the
/// tiles hold the placement for exactly that size.
#[allow(clippy::too_many_arguments)]
pub fn shrink_canvas(
    pool: &mut FreeAreaPool,
    tiles: &mut [Tile],
    ranked: &[usize],
    canvas: usize,
    allow_rotation: bool,
    tiles_area: u64,
    width: u32,
    height: u32,
) -> (u32, u32) {
    if tiles_area == 0 || within_tolerance(width, height, tiles_area) {
        return (width, height);
    }

    let ratio = width as f64 / height as f64;
    let needed_w = (tiles_area as f64 * ratio).sqrt() as u32 + 1;
    let needed_h = (tiles_area as f64 / ratio).sqrt() as u32 + 1;
    let mut delta_w = width.saturating_sub(needed_w) / 2;
    let mut delta_h = height.saturating_sub(needed_h) / 2;

    let (mut cur_w, mut cur_h) = (width, height);
    let mut best = (width, height);
    let mut last_ok = true;

    while delta_w > 0 || delta_h > 0 {
        if last_ok {
            cur_w = cur_w.saturating_sub(delta_w).max(1);
            cur_h = cur_h.saturating_sub(delta_h).max(1);
        } else {
            cur_w += delta_w;
            cur_h += delta_h;
        }
        last_ok = repack_canvas(pool, tiles, ranked, canvas, allow_rotation, cur_w, cur_h);
        trace!(canvas, cur_w, cur_h, ok = last_ok, "shrink attempt");
        if last_ok {
            best = (cur_w, cur_h);
            if within_tolerance(cur_w, cur_h, tiles_area) {
                break;
            }
        }
        delta_w /= 2;
        delta_h /= 2;
    }

    if !last_ok {
        repack_canvas(pool, tiles, ranked, canvas, allow_rotation, best.0, best.1);
    }
    debug!(canvas, width = best.0, height = best.1, "canvas shrunk");
    best
}

/// Re-places every tile of `canvas` on an empty `width x height` canvas, in rank order.
/// Stops at the first tile that does not fit.
fn repack_canvas(
    pool: &mut FreeAreaPool,
    tiles: &mut [Tile],
    ranked: &[usize],
    canvas: usize,
    allow_rotation: bool,
    width: u32,
    height: u32,
) -> bool {
    pool.reset(width, height);
    for &i in ranked {
        let tile = &mut tiles[i];
        if tile.canvas_index != Some(canvas) {
            continue;
        }
        if !place_tile(pool, tile, allow_rotation) {
            return false;
        }
    }
    true
}
