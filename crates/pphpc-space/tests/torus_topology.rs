//! Torus topology checks through the public `Space` trait object.
//!
//! The engine only ever sees `dyn Space`, so these tests exercise the
//! torus exclusively through that interface.

use pphpc_space::{Space, SpaceError, Torus2D, NEIGHBOURHOOD_SIZE};

fn boxed(w: u32, h: u32) -> Box<dyn Space> {
    Box::new(Torus2D::new(w, h).unwrap())
}

#[test]
fn every_cell_is_a_neighbour_of_exactly_five_slots() {
    // Each cell appears once as itself and once in each of the four
    // cardinal slots of its neighbours.
    let space = boxed(7, 6);
    let mut hits = vec![0usize; space.cell_count()];
    for idx in 0..space.cell_count() {
        for nb in space.neighbourhood(idx) {
            hits[nb] += 1;
        }
    }
    assert!(hits.iter().all(|&h| h == NEIGHBOURHOOD_SIZE), "{hits:?}");
}

#[test]
fn up_then_down_returns_home() {
    let space = boxed(9, 4);
    for idx in 0..space.cell_count() {
        let up = space.neighbourhood(idx)[1];
        assert_eq!(space.neighbourhood(up)[3], idx);
        let right = space.neighbourhood(idx)[2];
        assert_eq!(space.neighbourhood(right)[4], idx);
    }
}

#[test]
fn walking_right_cycles_through_one_row() {
    let space = boxed(6, 3);
    let start = 6; // row 1, column 0
    let mut idx = start;
    for step in 1..=6 {
        idx = space.neighbourhood(idx)[2];
        assert_eq!(idx / 6, 1, "left row 1 after {step} steps");
    }
    assert_eq!(idx, start);
}

#[test]
fn dims_and_rows() {
    let space = boxed(12, 5);
    assert_eq!(space.ndim(), 2);
    assert_eq!(space.dims().as_slice(), &[12, 5]);
    assert_eq!(space.row_size(), 12);
    assert_eq!(space.row_count(), 5);
    assert_eq!(space.neighbourhood_radius(), 1);
}

#[test]
fn construction_errors_display() {
    let err = Torus2D::new(0, 3).unwrap_err();
    assert_eq!(err, SpaceError::EmptySpace);
    assert_eq!(err.to_string(), "space must have at least one cell");
}
