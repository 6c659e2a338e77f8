//! Leaf-to-raster reconstruction.

use common::Buffer2;

use crate::color::Rgba8;
use crate::region::Region;
use crate::tree::Leaf;

/// Paint the leaf set into a raster sized to `root`.
///
/// The raster starts filled with `background` and leaves paint in
/// area-descending order: where two regions overlap, the smaller leaf wins.
/// A leaf set produced by the exact split rule never overlaps and covers the
/// root completely, leaving neither fill nor ordering observable.
pub fn render(root: Region, leaves: &[Leaf], background: Rgba8) -> Buffer2<Rgba8> {
    let mut raster = Buffer2::new_filled(
        root.width() as usize,
        root.height() as usize,
        background,
    );

    let mut ordered: Vec<&Leaf> = leaves.iter().collect();
    ordered.sort_by(|lhs, rhs| rhs.region.area().cmp(&lhs.region.area()));

    for leaf in ordered {
        debug_assert!(
            leaf.region.min_x >= root.min_x && leaf.region.max_x <= root.max_x,
            "leaf {:?} outside root {root:?}",
            leaf.region
        );
        for y in leaf.region.min_y..leaf.region.max_y {
            let row = (y - root.min_y) as usize;
            for x in leaf.region.min_x..leaf.region.max_x {
                raster[((x - root.min_x) as usize, row)] = leaf.color;
            }
        }
    }

    raster
}
