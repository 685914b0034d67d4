use crate::model::{Rect, Tile};

pub mod free_area;
pub mod rank;

pub use free_area::{FreeArea, FreeAreaPool};
pub use rank::rank_tiles;

/// Places `tile` in the smallest free area of `pool` that can hold it.
///
/// The tile is tried in its original orientation first; only if no area fits and
/// `allow_rotation` is set, it is tried once more rotated by 90°. On success the tile's
/// position, `rotated` flag and `packed` flag are written and `true` is returned. On failure
/// the tile is left unpacked and unrotated. `canvas_index` is the caller's business.
pub fn place_tile(pool: &mut FreeAreaPool, tile: &mut Tile, allow_rotation: bool) -> bool {
    let attempts: &[bool] = if allow_rotation {
        &[false, true]
    } else {
        &[false]
    };
    for &rotated in attempts {
        let (w, h) = if rotated {
            (tile.height, tile.width)
        } else {
            (tile.width, tile.height)
        };
        let Some(idx) = pool.find_fit(w, h) else {
            continue;
        };
        let area = pool.get(idx).rect();
        occupy(pool, idx, area, w, h);
        tile.x = area.x;
        tile.y = area.y;
        tile.rotated = rotated;
        tile.packed = true;
        return true;
    }
    tile.rotated = false;
    tile.packed = false;
    false
}

/// Claims the top-left `w x h` corner of free area `idx`.
fn occupy(pool: &mut FreeAreaPool, idx: usize, area: Rect, w: u32, h: u32) {
    if w == area.w && h == area.h {
        pool.remove(idx);
    } else if h == area.h {
        pool.shrink(idx, Rect::new(area.x + w, area.y, area.w - w, area.h));
    } else if w == area.w {
        pool.shrink(idx, Rect::new(area.x, area.y + h, area.w, area.h - h));
    } else {
        pool.split(idx, w, h);
    }
}
