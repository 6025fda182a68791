use tracing::{debug, warn};

use crate::config::{AllocationPolicy, AtlasConfig};
use crate::error::{AtlasError, Result};
use crate::types::Island;

/// Find the first free `width x height` slot, scanning row-major.
///
/// Returns `None` when every candidate collides with an existing island.
///
/// The first candidate on each axis is `padding`; after that the scan
/// jumps to successive multiples of `grid_step`, so placed islands line up
/// with the grid the editor snaps to. A candidate must keep `padding` pixels
/// to the atlas edge and to every existing island.
pub fn try_find_space<'a, I>(width: u32, height: u32, existing: I, config: &AtlasConfig) -> Option<Island>
where
    I: IntoIterator<Item = &'a Island>,
{
    let existing: Vec<&Island> = existing.into_iter().collect();
    let padding = config.padding;
    let step = config.grid_step.max(1);

    for y in candidates(height, config.size, padding, step) {
        for x in candidates(width, config.size, padding, step) {
            let blocked = existing
                .iter()
                .any(|b| b.padded_overlaps(x, y, width, height, padding));
            if !blocked {
                debug!(x, y, width, height, "Allocated island");
                return Some(Island::new(x, y, width, height));
            }
        }
    }

    None
}

/// Like [`try_find_space`], but never fails: an exhausted atlas yields
/// `(padding, padding)` and the caller lives with the overlap.
pub fn find_space<'a, I>(width: u32, height: u32, existing: I, config: &AtlasConfig) -> Island
where
    I: IntoIterator<Item = &'a Island>,
{
    try_find_space(width, height, existing, config).unwrap_or_else(|| {
        warn!(width, height, "Atlas exhausted, placing island with overlap");
        fallback(width, height, config)
    })
}

/// Allocate according to `config.policy`.
pub fn allocate<'a, I>(width: u32, height: u32, existing: I, config: &AtlasConfig) -> Result<Island>
where
    I: IntoIterator<Item = &'a Island>,
{
    match config.policy {
        AllocationPolicy::BestEffort => Ok(find_space(width, height, existing, config)),
        AllocationPolicy::Reject => try_find_space(width, height, existing, config)
            .ok_or(AtlasError::AtlasFull { width, height }),
    }
}

/// Placement used when the atlas has no room left.
pub fn fallback(width: u32, height: u32, config: &AtlasConfig) -> Island {
    Island::new(config.padding, config.padding, width, height)
}

/// Candidate positions along one axis.
fn candidates(dimension: u32, size: u32, padding: u32, step: u32) -> impl Iterator<Item = u32> {
    let limit = size as i64 - dimension as i64 - padding as i64;
    std::iter::successors(Some(padding), move |&pos| Some((pos / step + 1) * step))
        .take_while(move |&pos| (pos as i64) < limit)
}
