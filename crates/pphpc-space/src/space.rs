//! The core `Space` trait.

use smallvec::SmallVec;

/// Number of entries in a von-Neumann radius-1 neighbourhood, self included.
pub const NEIGHBOURHOOD_SIZE: usize = 5;

/// Linear indices of a cell's neighbourhood.
///
/// Entry 0 is the cell itself; entries 1..=4 are up, right, down, left.
pub type Neighbourhood = [usize; NEIGHBOURHOOD_SIZE];

/// Spatial topology of the simulation grid.
///
/// Cells are addressed by a linear index in `0..cell_count()`. The engine
/// only relies on the neighbourhood function and on the row structure
/// used by the row-synchronized work providers.
///
/// # Thread Safety
///
/// `Sync` is required because every worker thread queries the same space
/// while installing cell neighbourhoods.
pub trait Space: Send + Sync + 'static {
    /// Number of spatial dimensions.
    fn ndim(&self) -> usize;

    /// Extent of each dimension, fastest-varying first.
    fn dims(&self) -> SmallVec<[usize; 4]>;

    /// Total number of cells.
    fn cell_count(&self) -> usize;

    /// Neighbourhood radius, in cells.
    fn neighbourhood_radius(&self) -> usize;

    /// The neighbourhood of `index`, in the order documented on
    /// [`Neighbourhood`]. Pure and deterministic.
    fn neighbourhood(&self, index: usize) -> Neighbourhood;

    /// Cells per row: the product of every dimension except the last.
    fn row_size(&self) -> usize {
        let dims = self.dims();
        dims[..dims.len().saturating_sub(1)].iter().product()
    }

    /// Number of rows: extent of the last dimension.
    fn row_count(&self) -> usize {
        self.cell_count() / self.row_size().max(1)
    }
}
