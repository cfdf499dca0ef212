#![allow(dead_code)]
use std::collections::BTreeSet;

use sparse_halo::prelude::*;

/// Every rank of a stencil problem on an `npx × npy × npz` process grid,
/// with halo set up under `config`.
pub fn stencil_ranks(
    procs: (usize, usize, usize),
    local: (usize, usize, usize),
    config: &HaloConfig,
) -> Vec<(Geometry, SparseMatrix)> {
    let size = procs.0 * procs.1 * procs.2;
    (0..size)
        .map(|rank| {
            let geom = Geometry::new(size, rank, local, procs).unwrap();
            let mut a = generate_stencil_matrix(&geom).unwrap();
            setup_halo(&geom, &mut a, config).unwrap();
            (geom, a)
        })
        .collect()
}

/// Global adjacency rows `0..n` with a diagonal and both directions of
/// every edge, columns ascending.
pub fn symmetric_rows(n: u64, edges: &[(u64, u64)]) -> Vec<Vec<u64>> {
    let mut rows: Vec<BTreeSet<u64>> = (0..n).map(|i| BTreeSet::from([i])).collect();
    for &(a, b) in edges {
        rows[a as usize].insert(b);
        rows[b as usize].insert(a);
    }
    rows.into_iter().map(|r| r.into_iter().collect()).collect()
}

/// Split global `rows` into per-rank matrices along `offsets`.
pub fn block_matrices(rows: &[Vec<u64>], offsets: &[u64]) -> Vec<(RowBlocks, SparseMatrix)> {
    (0..offsets.len() - 1)
        .map(|rank| {
            let blocks = RowBlocks::new(offsets.to_vec(), rank).unwrap();
            let owned: Vec<u64> = blocks.owned_rows().collect();
            let local_rows = owned.iter().map(|&g| rows[g as usize].clone()).collect();
            let a = SparseMatrix::from_rows(owned, local_rows).unwrap();
            (blocks, a)
        })
        .collect()
}

/// Local columns resolve back to the global columns they came from.
pub fn assert_round_trip(a: &SparseMatrix) {
    let nrows = a.local_number_of_rows();
    let ext = a.external_map().expect("halo set up");
    for i in 0..nrows {
        for (&g, &j) in a.global_row(i).iter().zip(a.local_row(i)) {
            if j < nrows {
                assert_eq!(a.local_to_global()[j], g, "row {i}: owned column");
            } else {
                assert_eq!(ext.global_of(j), Some(g), "row {i}: external column");
                assert_eq!(ext.get(g), Some(j));
            }
        }
    }
}

/// External indices used by the matrix are exactly the external block.
pub fn assert_dense_external_block(a: &SparseMatrix) {
    let nrows = a.local_number_of_rows();
    let used: BTreeSet<usize> = (0..nrows)
        .flat_map(|i| a.local_row(i).iter().copied())
        .filter(|&j| j >= nrows)
        .collect();
    let expected: BTreeSet<usize> = (nrows..a.local_number_of_columns()).collect();
    assert_eq!(used, expected);
    assert_eq!(
        a.local_number_of_columns(),
        nrows + a.number_of_external_values()
    );
}

/// Per-neighbor send/receive counts agree on every rank.
pub fn assert_symmetric_plan(plan: &HaloPlan) {
    assert_eq!(plan.send_length(), plan.receive_length());
    let sent: usize = plan.send_length().iter().sum();
    let received: usize = plan.receive_length().iter().sum();
    assert_eq!(sent, received);
    assert_eq!(sent, plan.total_to_be_sent());
}

/// What rank `a` sends to rank `b` is, in order, what `b` expects from `a`.
pub fn assert_cross_rank_consistent(mats: &[&SparseMatrix]) {
    for (a, ma) in mats.iter().enumerate() {
        let plan_a = ma.halo().unwrap();
        for link in plan_a.links() {
            let b = link.rank;
            let mb = mats[b];
            let back = mb
                .halo()
                .unwrap()
                .links()
                .find(|l| l.rank == a)
                .unwrap_or_else(|| panic!("rank {b} does not list rank {a} as a neighbor"));

            let sent: Vec<u64> = link
                .send
                .iter()
                .map(|&row| ma.local_to_global()[row])
                .collect();
            let ext_b = mb.external_map().unwrap();
            let expected: Vec<u64> = back
                .receive
                .clone()
                .map(|j| ext_b.global_of(j).unwrap())
                .collect();
            assert_eq!(sent, expected, "rank {a} -> rank {b}");
        }
    }
}
