use crate::config::SortMetric;
use crate::model::Tile;

/// Fills `order` with tile indices ranked by `metric`, largest first.
///
/// The tile table itself is never reordered. Equal keys keep their original index order,
/// so repeated runs over the same input always rank identically. With `presorted` the
/// caller's order is kept unchanged.
pub fn rank_tiles(tiles: &[Tile], metric: SortMetric, presorted: bool, order: &mut Vec<usize>) {
    order.clear();
    order.extend(0..tiles.len());
    if presorted {
        return;
    }
    order.sort_unstable_by(|&a, &b| {
        let ka = metric.key(tiles[a].width, tiles[a].height);
        let kb = metric.key(tiles[b].width, tiles[b].height);
        kb.cmp(&ka).then_with(|| a.cmp(&b))
    });
}
