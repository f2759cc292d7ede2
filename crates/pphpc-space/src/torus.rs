//! 2D torus with a von-Neumann radius-1 neighbourhood.

use crate::error::SpaceError;
use crate::space::{Neighbourhood, Space};
use smallvec::{smallvec, SmallVec};

/// A two-dimensional square grid whose edges wrap in both axes.
///
/// Cell `(x, y)` has linear index `y * width + x`, so a row is `width`
/// consecutive indices. Every cell has exactly four cardinal neighbours:
///
/// - up: `idx - width`, wrapping to the last row
/// - right: `idx + 1`, wrapping to the start of the same row
/// - down: `idx + width`, wrapping to the first row
/// - left: `idx - 1`, wrapping to the end of the same row
///
/// Horizontal wrap stays inside the row: the right neighbour of a row's
/// last cell is that row's first cell, not the first cell of the next
/// row. A plain linear `idx ± 1 (mod cell_count)` wrap would step into
/// the adjacent row at row ends and make the grid a helix rather than a
/// torus. The two rules agree everywhere except at row ends.
///
/// # Examples
///
/// ```
/// use pphpc_space::{Space, Torus2D};
///
/// let t = Torus2D::new(4, 3).unwrap();
/// assert_eq!(t.cell_count(), 12);
/// // Top-left corner: up wraps to the bottom row, left to the row end.
/// assert_eq!(t.neighbourhood(0), [0, 8, 1, 4, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Torus2D {
    width: u32,
    height: u32,
}

impl Torus2D {
    /// Largest accepted extent per axis; keeps `width * height` in `u32`.
    pub const MAX_DIM: u32 = u16::MAX as u32;

    /// Create a `width x height` torus.
    ///
    /// Returns `Err(SpaceError::EmptySpace)` if either dimension is 0, or
    /// `Err(SpaceError::DimensionTooLarge)` if either exceeds [`MAX_DIM`](Self::MAX_DIM).
    pub fn new(width: u32, height: u32) -> Result<Self, SpaceError> {
        if width == 0 || height == 0 {
            return Err(SpaceError::EmptySpace);
        }
        if width > Self::MAX_DIM {
            return Err(SpaceError::DimensionTooLarge {
                name: "width",
                value: width,
                max: Self::MAX_DIM,
            });
        }
        if height > Self::MAX_DIM {
            return Err(SpaceError::DimensionTooLarge {
                name: "height",
                value: height,
                max: Self::MAX_DIM,
            });
        }
        Ok(Self { width, height })
    }

    /// Cells per row.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(x, y)` of a linear index.
    pub fn coords(&self, index: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    /// Linear index of `(x, y)`.
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl Space for Torus2D {
    fn ndim(&self) -> usize {
        2
    }

    fn dims(&self) -> SmallVec<[usize; 4]> {
        smallvec![self.width as usize, self.height as usize]
    }

    fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn neighbourhood_radius(&self) -> usize {
        1
    }

    fn neighbourhood(&self, index: usize) -> Neighbourhood {
        let size = self.cell_count();
        let w = self.width as usize;
        debug_assert!(index < size, "cell index {index} out of range 0..{size}");

        let up = if index >= w { index - w } else { index + size - w };
        let down = if index + w < size { index + w } else { index + w - size };
        let x = index % w;
        let right = if x + 1 < w { index + 1 } else { index + 1 - w };
        let left = if x > 0 { index - 1 } else { index + w - 1 };

        [index, up, right, down, left]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance;
    use proptest::prelude::*;

    // ── Construction ────────────────────────────────────────────

    #[test]
    fn new_rejects_empty() {
        assert_eq!(Torus2D::new(0, 5), Err(SpaceError::EmptySpace));
        assert_eq!(Torus2D::new(5, 0), Err(SpaceError::EmptySpace));
    }

    #[test]
    fn new_rejects_oversized_axis() {
        match Torus2D::new(Torus2D::MAX_DIM + 1, 1) {
            Err(SpaceError::DimensionTooLarge { name: "width", .. }) => {}
            other => panic!("expected DimensionTooLarge(width), got {other:?}"),
        }
    }

    #[test]
    fn row_structure_follows_width() {
        let t = Torus2D::new(10, 7).unwrap();
        assert_eq!(t.row_size(), 10);
        assert_eq!(t.row_count(), 7);
        assert_eq!(t.coords(23), (3, 2));
        assert_eq!(t.index(3, 2), 23);
    }

    // ── Neighbourhood tests ─────────────────────────────────────

    #[test]
    fn interior_neighbourhood() {
        let t = Torus2D::new(5, 5).unwrap();
        // (2, 2) = 12
        assert_eq!(t.neighbourhood(12), [12, 7, 13, 17, 11]);
    }

    #[test]
    fn corners_wrap_both_axes() {
        let t = Torus2D::new(5, 4).unwrap();
        // bottom-right (4, 3) = 19
        assert_eq!(t.neighbourhood(19), [19, 14, 15, 4, 18]);
        // top-right (4, 0) = 4
        assert_eq!(t.neighbourhood(4), [4, 19, 0, 9, 3]);
    }

    #[test]
    fn row_end_wraps_within_row() {
        let t = Torus2D::new(4, 3).unwrap();
        // Last cell of row 0: right is 0, not 4 on the next row.
        assert_eq!(t.neighbourhood(3)[2], 0);
        // First cell of row 1: left is 7, not 3 on the previous row.
        assert_eq!(t.neighbourhood(4)[4], 7);
        for y in 0..3 {
            for x in 0..4 {
                let n = t.neighbourhood(t.index(x, y));
                assert_eq!(t.coords(n[2]).1, y);
                assert_eq!(t.coords(n[4]).1, y);
            }
        }
    }

    #[test]
    fn single_column_right_and_left_are_self() {
        let t = Torus2D::new(1, 3).unwrap();
        assert_eq!(t.neighbourhood(1), [1, 0, 1, 2, 1]);
    }

    #[test]
    fn full_compliance_small_grids() {
        for (w, h) in [(1, 1), (2, 3), (5, 5), (10, 4)] {
            compliance::run_full_compliance(&Torus2D::new(w, h).unwrap());
        }
    }

    proptest! {
        #[test]
        fn neighbourhood_in_bounds_and_symmetric(w in 1u32..40, h in 1u32..40, seed in any::<usize>()) {
            let t = Torus2D::new(w, h).unwrap();
            let idx = seed % t.cell_count();
            let n = t.neighbourhood(idx);
            prop_assert_eq!(n[0], idx);
            for &nb in &n {
                prop_assert!(nb < t.cell_count());
                prop_assert!(t.neighbourhood(nb).contains(&idx));
            }
        }
    }
}
