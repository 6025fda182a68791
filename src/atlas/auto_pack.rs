use tracing::{info, warn};

use crate::config::AtlasConfig;
use crate::types::Shape;

use super::uv_mapper::recompute_uv;

/// Summary of a shelf packing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackSummary {
    pub placed: usize,
    pub rows: usize,
    /// Bottom edge of the lowest island.
    pub used_height: u32,
    /// Whether any island ended up below the atlas edge.
    pub overflowed: bool,
}

/// Reposition every island with a shelf (row) packer and refresh UVs.
///
/// Islands are sorted by height, tallest first; the sort is stable so ties
/// keep their incoming order. Island sizes never change. When the shapes
/// need more room than the atlas has, rows simply continue past the bottom
/// edge.
pub fn auto_pack<'a, I>(shapes: I, config: &AtlasConfig) -> PackSummary
where
    I: IntoIterator<Item = &'a mut Shape>,
{
    let mut shapes: Vec<&mut Shape> = shapes.into_iter().collect();
    shapes.sort_by(|a, b| b.island.height.cmp(&a.island.height));

    let padding = config.padding;
    let mut x = padding;
    let mut y = padding;
    let mut row_height = 0u32;
    let mut rows = usize::from(!shapes.is_empty());
    let mut used_height = 0u32;

    for shape in shapes.iter_mut() {
        let (width, height) = (shape.island.width, shape.island.height);

        if x.saturating_add(width).saturating_add(padding) > config.size {
            x = padding;
            y = y.saturating_add(row_height).saturating_add(padding);
            row_height = 0;
            rows += 1;
        }

        shape.island.x = x;
        shape.island.y = y;

        x = x.saturating_add(width).saturating_add(padding);
        row_height = row_height.max(height);
        used_height = used_height.max(y.saturating_add(height));

        recompute_uv(shape, config.size);
    }

    let overflowed = used_height > config.size;
    if overflowed {
        warn!(used_height, atlas = config.size, "Packed islands run past the atlas edge");
    }
    info!(placed = shapes.len(), rows, used_height, "Auto-pack complete");

    PackSummary {
        placed: shapes.len(),
        rows,
        used_height,
        overflowed,
    }
}
