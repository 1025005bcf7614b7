//! Integration tests for ragged and blocked connectivity tables.

use proptest::prelude::*;

use mesh_remap::prelude::*;

#[test]
fn ragged_table_grows_and_splices() {
    let mut c = IrregularConnectivity::new("cells");
    c.add_values(2, 3, &[0, 1, 2, 1, 3, 2]).unwrap();
    c.add_ragged(&[4, 2]).unwrap();
    assert_eq!(c.rows(), 4);
    assert_eq!(c.maxcols(), 4);
    assert_eq!(c.mincols(), 2);
    assert_eq!(c.displs(), &[0, 3, 6, 10, 12]);

    c.insert_values(2, 1, 2, &[8, 9]).unwrap();
    assert_eq!(c.rows(), 5);
    assert_eq!(c.row(2), &[8, 9]);
    assert_eq!(c.row(3), &[-1, -1, -1, -1]);
    assert_eq!(c.displs(), &[0, 3, 6, 8, 12, 14]);
    c.validate_invariants().unwrap();
}

#[test]
fn wrapped_table_reads_but_never_mutates() {
    let values = vec![0, 1, 2, 2, 3];
    let displs = vec![0, 3, 5];
    let counts = vec![3, 2];
    let mut c = IrregularConnectivity::wrap("adopted", values, displs, counts).unwrap();
    assert!(!c.owns());
    assert_eq!(c.row(1), &[2, 3]);
    assert!(matches!(
        c.add_uniform(1, 3).unwrap_err(),
        MeshRemapError::NotOwned(_)
    ));
    assert!(matches!(
        c.insert_ragged(0, &[2]).unwrap_err(),
        MeshRemapError::NotOwned(_)
    ));
}

#[test]
fn multiblock_views_follow_mutation() {
    let mut c = MultiBlockConnectivity::new("cells");
    c.add_values(2, 3, &[0, 1, 2, 1, 3, 2]).unwrap();
    c.add_values(2, 4, &[2, 3, 5, 4, 3, 6, 7, 5]).unwrap();
    assert_eq!(c.blocks(), 2);

    c.insert_values(4, 1, 4, &[9, 9, 9, 9]).unwrap();
    let quads = c.block(1);
    assert_eq!(quads.rows(), 3);
    assert_eq!(quads.row(2), &[9, 9, 9, 9]);

    let total: usize = (0..c.blocks()).map(|b| c.block(b).rows()).sum();
    assert_eq!(total, c.rows());
    c.as_irregular().validate_invariants().unwrap();
}

#[test]
fn block_view_linearizes_into_ragged_table() {
    let mut mb = MultiBlockConnectivity::new("cells");
    mb.add_values(2, 3, &[0, 1, 2, 3, 4, 5]).unwrap();
    let owned = mb.block(0).to_owned_block();

    let mut flat = IrregularConnectivity::new("copy");
    flat.add_block(&owned).unwrap();
    assert_eq!(flat.rows(), 2);
    assert_eq!(flat.row(1), &[3, 4, 5]);
}

#[test]
fn device_sync_round_trip() {
    let mut c = IrregularConnectivity::new("cells");
    c.add_uniform(3, 2).unwrap();
    c.clone_to_device();
    assert!(c.valid());
    c.add_uniform(1, 2).unwrap();
    assert!(c.device_needs_update());
    c.sync_host_device();
    assert!(!c.device_needs_update());
    assert!(c.valid());
}

proptest! {
    /// Whatever mix of appends is applied, the displacement array stays a
    /// prefix sum of the counts.
    #[test]
    fn displs_is_prefix_sum_of_counts(ops in prop::collection::vec((1usize..5, 1usize..6), 0..12)) {
        let mut c = IrregularConnectivity::new("cells");
        for (rows, cols) in ops {
            c.add_uniform(rows, cols).unwrap();
        }
        prop_assert!(c.validate_invariants().is_ok());
        let displs = c.displs();
        prop_assert_eq!(displs[0], 0);
        for r in 0..c.rows() {
            prop_assert_eq!(displs[r + 1] - displs[r], c.counts()[r]);
            prop_assert_eq!(c.cols(r), c.counts()[r] as usize);
        }
        prop_assert!(c.values().len() >= displs[c.rows()] as usize);
    }

    /// Splicing at any valid position preserves the invariants and the
    /// surrounding rows.
    #[test]
    fn insert_preserves_surrounding_rows(pos in 0usize..4, rows in 1usize..4, cols in 1usize..5) {
        let mut c = IrregularConnectivity::new("cells");
        c.add_values(3, 2, &[0, 1, 2, 3, 4, 5]).unwrap();
        let before: Vec<Vec<Idx>> = (0..3).map(|r| c.row(r).to_vec()).collect();

        c.insert_uniform(pos.min(3), rows, cols).unwrap();
        prop_assert!(c.validate_invariants().is_ok());
        prop_assert_eq!(c.rows(), 3 + rows);

        let mut old = before.iter();
        for r in 0..c.rows() {
            if r >= pos.min(3) && r < pos.min(3) + rows {
                prop_assert!(c.row(r).iter().all(|&v| v == c.missing_value()));
            } else {
                prop_assert_eq!(c.row(r), old.next().unwrap().as_slice());
            }
        }
    }
}
