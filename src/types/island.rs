use serde::{Deserialize, Serialize};

/// Rectangular atlas region owned by exactly one shape, in raster pixels.
///
/// `x`/`y` is the top-left corner with Y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Island {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Island {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge, saturating at `u32::MAX`.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `u32::MAX`.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Inclusive point test: the far edges count as inside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (x, y) = (x as i64, y as i64);
        let (left, top) = (self.x as i64, self.y as i64);
        x >= left && x <= left + self.width as i64 && y >= top && y <= top + self.height as i64
    }

    /// Whether a `width x height` rectangle at `(x, y)` comes closer than
    /// `padding` pixels to this island.
    ///
    /// Equivalent to growing both rectangles by `padding / 2` on every side
    /// and testing the grown rectangles for a non-empty intersection.
    pub fn padded_overlaps(&self, x: u32, y: u32, width: u32, height: u32, padding: u32) -> bool {
        let (x, y, w, h, p) = (
            x as i64,
            y as i64,
            width as i64,
            height as i64,
            padding as i64,
        );
        let (bx, by, bw, bh) = (
            self.x as i64,
            self.y as i64,
            self.width as i64,
            self.height as i64,
        );

        x < bx + bw + p && x + w + p > bx && y < by + bh + p && y + h + p > by
    }

    /// Padded overlap between two islands.
    pub fn conflicts_with(&self, other: &Island, padding: u32) -> bool {
        self.padded_overlaps(other.x, other.y, other.width, other.height, padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_and_area() {
        let island = Island::new(8, 16, 32, 48);
        assert_eq!(island.right(), 40);
        assert_eq!(island.bottom(), 64);
        assert_eq!(island.area(), 32 * 48);
    }

    #[test]
    fn contains_is_inclusive() {
        let island = Island::new(8, 8, 32, 32);
        assert!(island.contains(8, 8));
        assert!(island.contains(40, 40)); // far corner
        assert!(island.contains(20, 30));
        assert!(!island.contains(7, 20));
        assert!(!island.contains(41, 20));
        assert!(!island.contains(-5, -5));
    }

    #[test]
    fn huge_islands_do_not_overflow() {
        let island = Island::new(8, 8, u32::MAX, u32::MAX);
        assert_eq!(island.right(), u32::MAX);
        assert_eq!(island.bottom(), u32::MAX);
        assert!(island.contains(10, 10));
        assert!(island.contains(i32::MAX, i32::MAX));
        assert!(!island.contains(7, 10));
    }

    #[test]
    fn padded_overlap_requires_full_gap() {
        let island = Island::new(8, 8, 40, 40);
        // Gap of exactly 8 px is clear
        assert!(!island.padded_overlaps(56, 8, 40, 40, 8));
        // Gap of 7 px is too close
        assert!(island.padded_overlaps(55, 8, 40, 40, 8));
        // Left side
        assert!(!island.padded_overlaps(0, 100, 10, 10, 8));
        assert!(island.padded_overlaps(0, 8, 10, 10, 8));
    }

    #[test]
    fn conflicts_is_symmetric() {
        let a = Island::new(8, 8, 40, 40);
        let b = Island::new(50, 20, 16, 16);
        assert_eq!(a.conflicts_with(&b, 8), b.conflicts_with(&a, 8));
        assert!(a.conflicts_with(&b, 8));

        let c = Island::new(64, 8, 40, 40);
        assert!(!a.conflicts_with(&c, 8));
        assert!(!c.conflicts_with(&a, 8));
    }
}
