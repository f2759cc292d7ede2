//! Space trait compliance test helpers.
//!
//! These functions verify that a Space implementation satisfies the
//! invariants the engine relies on: in-range neighbourhoods, self in
//! slot 0, symmetry, and a row structure that tiles the grid.

use crate::space::Space;
use indexmap::IndexSet;

/// Assert that every neighbourhood entry is a valid cell index.
pub fn assert_neighbourhood_in_bounds(space: &dyn Space) {
    let n = space.cell_count();
    for idx in 0..n {
        for nb in space.neighbourhood(idx) {
            assert!(nb < n, "neighbourhood({idx}) contains {nb}, out of 0..{n}");
        }
    }
}

/// Assert that slot 0 of every neighbourhood is the cell itself.
pub fn assert_self_first(space: &dyn Space) {
    for idx in 0..space.cell_count() {
        let nb = space.neighbourhood(idx);
        assert_eq!(nb[0], idx, "neighbourhood({idx})[0] = {}", nb[0]);
    }
}

/// Assert that `b in neighbourhood(a)` implies `a in neighbourhood(b)`.
pub fn assert_neighbourhood_symmetric(space: &dyn Space) {
    for idx in 0..space.cell_count() {
        for nb in space.neighbourhood(idx) {
            assert!(
                space.neighbourhood(nb).contains(&idx),
                "neighbour symmetry violated: {nb} in N({idx}) but {idx} not in N({nb})"
            );
        }
    }
}

/// Assert that two calls to `neighbourhood` return the same result.
pub fn assert_neighbourhood_deterministic(space: &dyn Space) {
    for idx in 0..space.cell_count() {
        assert_eq!(
            space.neighbourhood(idx),
            space.neighbourhood(idx),
            "neighbourhood({idx}) is non-deterministic"
        );
    }
}

/// Assert that `row_size * row_count == cell_count` and that every cell
/// is reachable as somebody's neighbour.
pub fn assert_rows_tile_grid(space: &dyn Space) {
    assert_eq!(
        space.row_size() * space.row_count(),
        space.cell_count(),
        "rows ({} x {}) do not tile {} cells",
        space.row_size(),
        space.row_count(),
        space.cell_count()
    );
    let reached: IndexSet<usize> = (0..space.cell_count())
        .flat_map(|idx| space.neighbourhood(idx))
        .collect();
    assert_eq!(reached.len(), space.cell_count(), "some cells are unreachable");
}

/// Run every compliance check on a space.
pub fn run_full_compliance(space: &dyn Space) {
    assert_neighbourhood_in_bounds(space);
    assert_self_first(space);
    assert_neighbourhood_symmetric(space);
    assert_neighbourhood_deterministic(space);
    assert_rows_tile_grid(space);
}
